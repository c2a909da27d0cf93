//! Cisco IOS hostname resource
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Set the device hostname
//!   ios_hostname:
//!     config:
//!       hostname: core-sw-01
//!     state: merged
//!
//! - name: Remove the configured hostname
//!   ios_hostname:
//!     state: deleted
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::modules::network::resource::{Field, Layout, NetworkTemplate, ParserTemplate, Resource};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct HostnameConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 63))]
    pub hostname: Option<String>,
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![ParserTemplate::new("hostname")
        .getval(r"hostname\s+(?P<name>\S+)$")
        .setval("hostname {{ hostname }}")
        .result(json!({"hostname": "{{ name }}"}))])
    .expect("Invalid hostname parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Single {
    fields: vec![Field::Scalar("hostname")],
});

/// `ios_hostname`
#[derive(Debug, Clone, Copy, Default)]
pub struct HostnameResource;

impl Resource for HostnameResource {
    const MODULE: &'static str = "ios_hostname";
    const DESCRIPTION: &'static str = "Manage the hostname of Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | include ^hostname";

    type Config = HostnameConfig;

    fn template() -> &'static NetworkTemplate {
        &TEMPLATE
    }

    fn layout() -> &'static Layout {
        &LAYOUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::network::resource::{populate_facts, Reconciler, ResourceState};
    use serde_json::Value;

    fn commands(state: ResourceState, want: Value, have: Value) -> Vec<String> {
        Reconciler::new(HostnameResource::template(), state)
            .reconcile(HostnameResource::layout(), &want, &have)
            .unwrap()
    }

    #[test]
    fn test_parse_hostname() {
        let facts = populate_facts::<HostnameResource>("hostname testname\n").unwrap();
        assert_eq!(facts, json!({"hostname": "testname"}));
    }

    #[test]
    fn test_parse_empty() {
        let facts = populate_facts::<HostnameResource>("").unwrap();
        assert_eq!(facts, json!({}));
    }

    #[test]
    fn test_merged_new_hostname() {
        let cmds = commands(
            ResourceState::Merged,
            json!({"hostname": "testnameNew"}),
            json!({"hostname": "testname"}),
        );
        assert_eq!(cmds, vec!["hostname testnameNew"]);
    }

    #[test]
    fn test_merged_same_hostname_idempotent() {
        let cmds = commands(
            ResourceState::Merged,
            json!({"hostname": "testname"}),
            json!({"hostname": "testname"}),
        );
        assert!(cmds.is_empty());
    }

    #[test]
    fn test_deleted_hostname() {
        let cmds = commands(ResourceState::Deleted, json!({}), json!({"hostname": "testname"}));
        assert_eq!(cmds, vec!["no hostname testname"]);
    }

    #[test]
    fn test_round_trip() {
        let rendered = TEMPLATE
            .render(&json!({"hostname": "edge-1"}), "hostname", false)
            .unwrap()
            .unwrap()
            .into_lines();
        let parsed = TEMPLATE.parse(rendered.iter().map(String::as_str));
        assert_eq!(parsed, json!({"hostname": "edge-1"}));
    }

    #[test]
    fn test_schema_rejects_unknown_keys() {
        let err = crate::modules::network::resource::validate_config::<HostnameResource>(&json!({
            "hostname": "r1",
            "domain": "lab"
        }))
        .unwrap_err();
        assert!(matches!(err, crate::modules::ModuleError::Validation(_)));
    }
}
