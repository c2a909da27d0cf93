//! Cisco IOS VLANs resource
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Declare access VLANs
//!   ios_vlans:
//!     config:
//!       - vlan_id: 10
//!         name: web
//!       - vlan_id: 20
//!         name: db
//!         state: suspend
//!     state: overridden
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::modules::network::resource::{Field, Layout, NetworkTemplate, ParserTemplate, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VlanState {
    Active,
    Suspend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VlanConfig {
    #[validate(range(min = 1, max = 4094))]
    pub vlan_id: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 32))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<VlanState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1500, max = 18190))]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_span: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<bool>,
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![
        ParserTemplate::new("vlan")
            .getval(r"vlan\s+(?P<vlan_id>\d+)$")
            .setval("vlan {{ vlan_id }}")
            .result(json!({"{{ vlan_id }}": {"vlan_id": "{{ vlan_id|int }}"}}))
            .shared(),
        ParserTemplate::new("name")
            .getval(r"\s+name\s+(?P<name>\S+)$")
            .setval("name {{ name }}")
            .result(json!({"{{ vlan_id }}": {"name": "{{ name }}"}})),
        ParserTemplate::new("state")
            .getval(r"\s+state\s+(?P<state>active|suspend)$")
            .setval("state {{ state }}")
            .result(json!({"{{ vlan_id }}": {"state": "{{ state }}"}})),
        ParserTemplate::new("mtu")
            .getval(r"\s+mtu\s+(?P<mtu>\d+)$")
            .setval("mtu {{ mtu }}")
            .result(json!({"{{ vlan_id }}": {"mtu": "{{ mtu|int }}"}})),
        ParserTemplate::new("remote_span")
            .getval(r"\s+remote-span$")
            .setval("remote-span")
            .result(json!({"{{ vlan_id }}": {"remote_span": "{{ True }}"}})),
        ParserTemplate::new("shutdown")
            .getval(r"\s+(?P<negate>no\s+)?shutdown$")
            .setval("shutdown")
            .result(json!({"{{ vlan_id }}": {"shutdown": "{{ negate is not defined }}"}})),
    ])
    .expect("Invalid vlans parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Keyed {
    key: "vlan_id",
    header: "vlan",
    purge: Some("vlan"),
    delete_whole: true,
    identity: &[],
    fields: vec![
        Field::Scalar("name"),
        Field::Scalar("state"),
        Field::Scalar("mtu"),
        Field::Toggle {
            parser: "remote_span",
            default: false,
        },
        Field::Toggle {
            parser: "shutdown",
            default: false,
        },
    ],
});

/// `ios_vlans`
#[derive(Debug, Clone, Copy, Default)]
pub struct VlansResource;

impl Resource for VlansResource {
    const MODULE: &'static str = "ios_vlans";
    const DESCRIPTION: &'static str = "Manage VLANs on Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | section ^vlan";

    type Config = VlanConfig;

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
    use crate::modules::network::resource::{populate_facts, to_keyed, Reconciler, ResourceState};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const RUNNING: &str = "\
vlan 10
 name web
!
vlan 100
 name mirror
 remote-span
!
vlan 20
 name db
 state suspend
 shutdown
";

    fn commands(state: ResourceState, want: Value) -> Vec<String> {
        let have = populate_facts::<VlansResource>(RUNNING).unwrap();
        let (have, _) = to_keyed(&LAYOUT, &have);
        let (want, _) = to_keyed(&LAYOUT, &want);
        Reconciler::new(&TEMPLATE, state)
            .reconcile(&LAYOUT, &want, &have)
            .unwrap()
    }

    #[test]
    fn test_parse_vlans_sorted_numerically() {
        let facts = populate_facts::<VlansResource>(RUNNING).unwrap();
        assert_eq!(
            facts,
            json!([
                {"vlan_id": 10, "name": "web"},
                {"vlan_id": 20, "name": "db", "state": "suspend", "shutdown": true},
                {"vlan_id": 100, "name": "mirror", "remote_span": true}
            ])
        );
    }

    #[test]
    fn test_merged_new_bare_vlan_is_created() {
        let cmds = commands(ResourceState::Merged, json!([{"vlan_id": 30}]));
        assert_eq!(cmds, vec!["vlan 30"]);
    }

    #[test]
    fn test_merged_rename_and_unshut() {
        let cmds = commands(
            ResourceState::Merged,
            json!([{"vlan_id": 20, "name": "database", "shutdown": false}]),
        );
        assert_eq!(cmds, vec!["vlan 20", "name database", "no shutdown"]);
    }

    #[test]
    fn test_deleted_removes_whole_vlan() {
        let cmds = commands(ResourceState::Deleted, json!([{"vlan_id": 20}]));
        assert_eq!(cmds, vec!["no vlan 20"]);
    }

    #[test]
    fn test_purged_all() {
        let cmds = commands(ResourceState::Purged, json!([]));
        assert_eq!(cmds, vec!["no vlan 10", "no vlan 20", "no vlan 100"]);
    }

    #[test]
    fn test_overridden_removes_unlisted() {
        let cmds = commands(
            ResourceState::Overridden,
            json!([{"vlan_id": 10, "name": "web"}, {"vlan_id": 100, "name": "mirror"}]),
        );
        assert_eq!(cmds, vec!["no vlan 20", "vlan 100", "no remote-span"]);
    }

    #[test]
    fn test_replaced_keeps_siblings() {
        let cmds = commands(ResourceState::Replaced, json!([{"vlan_id": 20, "name": "db"}]));
        assert_eq!(cmds, vec!["vlan 20", "no state suspend", "no shutdown"]);
    }
}
