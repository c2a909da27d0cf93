//! Declared state of a resource module run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::modules::ModuleError;

/// What the operator asks the module to do with `config`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    /// Add or update the declared attributes, never remove anything
    #[default]
    Merged,
    /// Make each declared object exactly match its declaration
    Replaced,
    /// Make the whole resource exactly match the declaration
    Overridden,
    /// Remove attributes of the listed objects (all objects if none listed)
    Deleted,
    /// Remove the listed objects entirely (all objects if none listed)
    Purged,
    /// Return the device's current facts
    Gathered,
    /// Return the commands for `config` without touching a device
    Rendered,
    /// Parse `running_config` text without touching a device
    Parsed,
}

impl ResourceState {
    pub const ALL: [ResourceState; 8] = [
        ResourceState::Merged,
        ResourceState::Replaced,
        ResourceState::Overridden,
        ResourceState::Deleted,
        ResourceState::Purged,
        ResourceState::Gathered,
        ResourceState::Rendered,
        ResourceState::Parsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Merged => "merged",
            ResourceState::Replaced => "replaced",
            ResourceState::Overridden => "overridden",
            ResourceState::Deleted => "deleted",
            ResourceState::Purged => "purged",
            ResourceState::Gathered => "gathered",
            ResourceState::Rendered => "rendered",
            ResourceState::Parsed => "parsed",
        }
    }

    /// States in which entries present only on the device are removed
    pub fn prunes(&self) -> bool {
        matches!(
            self,
            ResourceState::Replaced
                | ResourceState::Overridden
                | ResourceState::Deleted
                | ResourceState::Purged
        )
    }

    /// States that cannot run without `config`
    pub fn requires_config(&self) -> bool {
        matches!(
            self,
            ResourceState::Merged
                | ResourceState::Replaced
                | ResourceState::Overridden
                | ResourceState::Rendered
        )
    }

    /// States that never send commands to a device
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ResourceState::Gathered | ResourceState::Rendered | ResourceState::Parsed
        )
    }

    /// States that never contact a device at all
    pub fn is_offline(&self) -> bool {
        matches!(self, ResourceState::Rendered | ResourceState::Parsed)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceState {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceState::ALL
            .into_iter()
            .find(|state| state.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                ModuleError::InvalidParameter(format!(
                    "Invalid state '{}'. Valid states: {}",
                    s,
                    ResourceState::ALL.map(|st| st.as_str()).join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_str() {
        assert_eq!("merged".parse::<ResourceState>().unwrap(), ResourceState::Merged);
        assert_eq!("Purged".parse::<ResourceState>().unwrap(), ResourceState::Purged);
        assert!(matches!(
            "bogus".parse::<ResourceState>(),
            Err(ModuleError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_state_display_round_trip() {
        for state in ResourceState::ALL {
            assert_eq!(state.to_string().parse::<ResourceState>().unwrap(), state);
        }
    }

    #[test]
    fn test_state_predicates() {
        assert!(!ResourceState::Merged.prunes());
        assert!(!ResourceState::Rendered.prunes());
        assert!(ResourceState::Replaced.prunes());
        assert!(ResourceState::Rendered.requires_config());
        assert!(!ResourceState::Deleted.requires_config());
        assert!(ResourceState::Gathered.is_read_only());
        assert!(!ResourceState::Gathered.is_offline());
        assert!(ResourceState::Parsed.is_offline());
    }

    #[test]
    fn test_state_serde() {
        let state: ResourceState = serde_json::from_str("\"overridden\"").unwrap();
        assert_eq!(state, ResourceState::Overridden);
        assert_eq!(serde_json::to_string(&ResourceState::Gathered).unwrap(), "\"gathered\"");
    }
}
