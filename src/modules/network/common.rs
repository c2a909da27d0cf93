//! Common network device utilities and types
//!
//! This module provides shared functionality for network resource modules:
//! - Device platform identification
//! - The [`NetworkDevice`] seam through which configuration is read and applied
//! - An in-memory [`StaticDevice`] for offline runs and tests
//! - Configuration input cleanup and diff generation

use crate::modules::{Diff, ModuleError, ModuleResult};
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use tracing::debug;

// ============================================================================
// Device Platform Types
// ============================================================================

/// Supported network device platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkPlatform {
    /// Cisco IOS/IOS-XE
    #[default]
    CiscoIos,
    /// Cisco IOS-XR
    CiscoIosXr,
    /// Cisco NX-OS
    CiscoNxos,
    /// Arista EOS
    AristaEos,
    /// Juniper Junos
    JuniperJunos,
    /// Generic platform (best-effort)
    Generic,
}

impl std::fmt::Display for NetworkPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkPlatform::CiscoIos => write!(f, "cisco_ios"),
            NetworkPlatform::CiscoIosXr => write!(f, "cisco_iosxr"),
            NetworkPlatform::CiscoNxos => write!(f, "cisco_nxos"),
            NetworkPlatform::AristaEos => write!(f, "arista_eos"),
            NetworkPlatform::JuniperJunos => write!(f, "juniper_junos"),
            NetworkPlatform::Generic => write!(f, "generic"),
        }
    }
}

impl std::str::FromStr for NetworkPlatform {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "cisco_ios" | "ios" | "ios_xe" | "iosxe" => Ok(NetworkPlatform::CiscoIos),
            "cisco_iosxr" | "iosxr" | "ios_xr" => Ok(NetworkPlatform::CiscoIosXr),
            "cisco_nxos" | "nxos" | "nexus" => Ok(NetworkPlatform::CiscoNxos),
            "arista_eos" | "eos" | "arista" => Ok(NetworkPlatform::AristaEos),
            "juniper_junos" | "junos" | "juniper" => Ok(NetworkPlatform::JuniperJunos),
            "generic" | "auto" => Ok(NetworkPlatform::Generic),
            _ => Err(ModuleError::InvalidParameter(format!(
                "Unknown platform: {}. Valid options: cisco_ios, cisco_iosxr, cisco_nxos, arista_eos, juniper_junos, generic",
                s
            ))),
        }
    }
}

// ============================================================================
// Device Seam
// ============================================================================

/// A device the resource modules can read configuration from and send
/// configuration commands to.
///
/// Transport, authentication and prompt handling belong to implementations.
pub trait NetworkDevice: Send + Sync {
    /// Platform the device runs
    fn platform(&self) -> NetworkPlatform;

    /// Name used in logs
    fn hostname(&self) -> &str;

    /// Run a `show` command and return its text output
    fn get_config(&self, command: &str) -> ModuleResult<String>;

    /// Apply configuration commands in order, as one batch
    fn edit_config(&self, commands: &[String]) -> ModuleResult<()>;
}

/// In-memory device holding a fixed running configuration.
///
/// `show running-config` commands are answered from the stored text,
/// honoring `| include REGEX` and `| section REGEX` filters. Applied batches
/// are recorded but not interpreted; tests update the text with
/// [`StaticDevice::set_running_config`].
#[derive(Debug)]
pub struct StaticDevice {
    hostname: String,
    platform: NetworkPlatform,
    running: RwLock<String>,
    applied: Mutex<Vec<Vec<String>>>,
}

impl StaticDevice {
    pub fn new(running_config: impl Into<String>) -> Self {
        Self {
            hostname: "static".to_string(),
            platform: NetworkPlatform::CiscoIos,
            running: RwLock::new(running_config.into()),
            applied: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_platform(mut self, platform: NetworkPlatform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the stored running configuration
    pub fn set_running_config(&self, running_config: impl Into<String>) {
        *self.running.write() = running_config.into();
    }

    /// Batches passed to `edit_config`, oldest first
    pub fn applied(&self) -> Vec<Vec<String>> {
        self.applied.lock().clone()
    }
}

impl NetworkDevice for StaticDevice {
    fn platform(&self) -> NetworkPlatform {
        self.platform
    }

    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn get_config(&self, command: &str) -> ModuleResult<String> {
        let (base, filter) = match command.split_once('|') {
            Some((base, filter)) => (base.trim(), Some(filter.trim())),
            None => (command.trim(), None),
        };

        if !matches!(base, "show running-config" | "show run" | "show running") {
            return Err(ModuleError::Unsupported(format!(
                "Static device cannot answer '{}'",
                command
            )));
        }

        let running = self.running.read();
        match filter {
            None => Ok(running.clone()),
            Some(filter) => apply_output_filter(&running, filter),
        }
    }

    fn edit_config(&self, commands: &[String]) -> ModuleResult<()> {
        debug!(device = %self.hostname, count = commands.len(), "recording config batch");
        self.applied.lock().push(commands.to_vec());
        Ok(())
    }
}

/// Apply an IOS output filter (`include REGEX` or `section REGEX`).
///
/// `section` keeps each matching line together with the indented lines
/// that follow it.
pub fn apply_output_filter(text: &str, filter: &str) -> ModuleResult<String> {
    let (kind, pattern) = filter
        .split_once(char::is_whitespace)
        .map(|(k, p)| (k, p.trim()))
        .ok_or_else(|| ModuleError::InvalidParameter(format!("Invalid output filter: {}", filter)))?;

    let regex = Regex::new(pattern)
        .map_err(|e| ModuleError::InvalidParameter(format!("Invalid filter pattern '{}': {}", pattern, e)))?;

    let mut out = Vec::new();
    match kind {
        "include" | "i" | "inc" => {
            out.extend(text.lines().filter(|line| regex.is_match(line)));
        }
        "section" | "s" | "sec" => {
            let mut in_section = false;
            for line in text.lines() {
                let is_child = line.starts_with(' ') || line.starts_with('\t');
                if !is_child {
                    in_section = regex.is_match(line);
                }
                if in_section {
                    out.push(line);
                }
            }
        }
        other => {
            return Err(ModuleError::InvalidParameter(format!(
                "Unsupported output filter '{}'. Valid filters: include, section",
                other
            )))
        }
    }

    Ok(out.join("\n"))
}

// ============================================================================
// Configuration Input
// ============================================================================

/// Split configuration text into meaningful lines, dropping blanks and
/// comment lines (`!` and `#`).
pub fn parse_config_input(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim().starts_with('!'))
        .filter(|line| !line.trim().starts_with('#'))
        .collect()
}

// ============================================================================
// Configuration Diff
// ============================================================================

/// Generate a unified diff between two texts
pub fn generate_config_diff(before: &str, after: &str) -> Diff {
    let text_diff = TextDiff::from_lines(before, after);

    let mut details = String::new();
    let mut additions = 0;
    let mut deletions = 0;

    for change in text_diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => {
                deletions += 1;
                "-"
            }
            ChangeTag::Insert => {
                additions += 1;
                "+"
            }
            ChangeTag::Equal => " ",
        };
        details.push_str(&format!("{}{}", sign, change));
        if change.missing_newline() {
            details.push('\n');
        }
    }

    Diff {
        before: format!("{} lines", before.lines().count()),
        after: format!(
            "{} lines ({} additions, {} deletions)",
            after.lines().count(),
            additions,
            deletions
        ),
        details: Some(details),
    }
}
