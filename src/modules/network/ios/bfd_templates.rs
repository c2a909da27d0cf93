//! Cisco IOS BFD templates resource
//!
//! Templates are identified by name; the hop type is part of the header
//! line and defaults to `single_hop` when omitted.
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Fast-failover template for core links
//!   ios_bfd_templates:
//!     config:
//!       - name: CORE
//!         hop: single_hop
//!         interval:
//!           min_tx: 50
//!           min_rx: 50
//!           multiplier: 3
//!         authentication:
//!           type: sha_1
//!           keychain: BFD_KEYS
//!         echo: true
//!     state: replaced
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::modules::network::resource::{Field, Layout, NetworkTemplate, ParserTemplate, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BfdHop {
    SingleHop,
    MultiHop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BfdAuthType {
    KeyedMd5,
    #[serde(rename = "keyed_sha_1")]
    KeyedSha1,
    MeticulousMd5,
    #[serde(rename = "meticulous_sha_1")]
    MeticulousSha1,
    Md5,
    #[serde(rename = "sha_1")]
    Sha1,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BfdTemplateInterval {
    #[validate(range(min = 50, max = 9999))]
    pub min_tx: u32,
    #[validate(range(min = 50, max = 9999))]
    pub min_rx: u32,
    #[validate(range(min = 3, max = 50))]
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BfdAuthentication {
    #[serde(rename = "type")]
    pub auth_type: BfdAuthType,
    #[validate(length(min = 1))]
    pub keychain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BfdDampening {
    #[validate(range(min = 1, max = 30))]
    pub half_life_period: u32,
    #[validate(range(min = 1, max = 20000))]
    pub reuse_threshold: u32,
    #[validate(range(min = 1, max = 20000))]
    pub suppress_threshold: u32,
    #[validate(range(min = 1, max = 255))]
    pub max_suppress_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BfdTemplateConfig {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop: Option<BfdHop>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub interval: Option<BfdTemplateInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub authentication: Option<BfdAuthentication>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub dampening: Option<BfdDampening>,
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![
        ParserTemplate::new("template")
            .getval(r"bfd-template\s+(?P<hop>single-hop|multi-hop)\s+(?P<name>\S+)$")
            .setval("bfd-template {{ hop|default('single_hop')|replace('_', '-') }} {{ name }}")
            .result(json!({"{{ name }}": {
                "name": "{{ name }}",
                "hop": "{{ hop|replace('-', '_') }}"
            }}))
            .shared(),
        ParserTemplate::new("interval")
            .getval(r"\s+interval\s+min-tx\s+(?P<min_tx>\d+)\s+min-rx\s+(?P<min_rx>\d+)\s+multiplier\s+(?P<multiplier>\d+)$")
            .setval("interval min-tx {{ interval.min_tx }} min-rx {{ interval.min_rx }} multiplier {{ interval.multiplier }}")
            .result(json!({"{{ name }}": {"interval": {
                "min_tx": "{{ min_tx|int }}",
                "min_rx": "{{ min_rx|int }}",
                "multiplier": "{{ multiplier|int }}"
            }}})),
        ParserTemplate::new("authentication")
            .getval(r"\s+authentication\s+(?P<type>\S+)\s+keychain\s+(?P<keychain>\S+)$")
            .setval("authentication {{ authentication.type|replace('_', '-') }} keychain {{ authentication.keychain }}")
            .result(json!({"{{ name }}": {"authentication": {
                "type": "{{ type|replace('-', '_') }}",
                "keychain": "{{ keychain }}"
            }}})),
        ParserTemplate::new("echo")
            .getval(r"\s+echo$")
            .setval("echo")
            .result(json!({"{{ name }}": {"echo": "{{ True }}"}})),
        ParserTemplate::new("dampening")
            .getval(r"\s+dampening\s+(?P<half_life>\d+)\s+(?P<reuse>\d+)\s+(?P<suppress>\d+)\s+(?P<max_suppress>\d+)$")
            .setval(
                "dampening {{ dampening.half_life_period }} {{ dampening.reuse_threshold }} \
                 {{ dampening.suppress_threshold }} {{ dampening.max_suppress_time }}",
            )
            .result(json!({"{{ name }}": {"dampening": {
                "half_life_period": "{{ half_life|int }}",
                "reuse_threshold": "{{ reuse|int }}",
                "suppress_threshold": "{{ suppress|int }}",
                "max_suppress_time": "{{ max_suppress|int }}"
            }}})),
    ])
    .expect("Invalid bfd_templates parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Keyed {
    key: "name",
    header: "template",
    purge: Some("template"),
    delete_whole: false,
    identity: &["hop"],
    fields: vec![
        Field::Scalar("interval"),
        Field::Scalar("authentication"),
        Field::Toggle {
            parser: "echo",
            default: false,
        },
        Field::Scalar("dampening"),
    ],
});

/// `ios_bfd_templates`
#[derive(Debug, Clone, Copy, Default)]
pub struct BfdTemplatesResource;

impl Resource for BfdTemplatesResource {
    const MODULE: &'static str = "ios_bfd_templates";
    const DESCRIPTION: &'static str = "Manage BFD templates on Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | section ^bfd-template";

    type Config = BfdTemplateConfig;

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
bfd-template single-hop T1
 interval min-tx 200 min-rx 200 multiplier 3
 authentication sha-1 keychain KC1
 echo
!
bfd-template multi-hop T2
 interval min-tx 500 min-rx 500 multiplier 5
 dampening 2 10 20 30
";

    /// Render `parser` from `record` under its header and parse the text back.
    fn round_trip(record: &Value, parser: &str) -> Value {
        let mut lines = TEMPLATE.render(record, "template", false).unwrap().unwrap().into_lines();
        if parser != "template" {
            let body = TEMPLATE.render(record, parser, false).unwrap().unwrap();
            lines.extend(body.into_lines().into_iter().map(|line| format!(" {}", line)));
        }
        populate_facts::<BfdTemplatesResource>(&lines.join("\n")).unwrap()
    }

    fn commands(state: ResourceState, want: Value) -> Vec<String> {
        let have = populate_facts::<BfdTemplatesResource>(RUNNING).unwrap();
        let (have, _) = to_keyed(&LAYOUT, &have);
        let (want, _) = to_keyed(&LAYOUT, &want);
        Reconciler::new(&TEMPLATE, state)
            .reconcile(&LAYOUT, &want, &have)
            .unwrap()
    }

    #[test]
    fn test_parse_templates() {
        let facts = populate_facts::<BfdTemplatesResource>(RUNNING).unwrap();
        assert_eq!(
            facts,
            json!([
                {
                    "name": "T1",
                    "hop": "single_hop",
                    "interval": {"min_tx": 200, "min_rx": 200, "multiplier": 3},
                    "authentication": {"type": "sha_1", "keychain": "KC1"},
                    "echo": true
                },
                {
                    "name": "T2",
                    "hop": "multi_hop",
                    "interval": {"min_tx": 500, "min_rx": 500, "multiplier": 5},
                    "dampening": {
                        "half_life_period": 2,
                        "reuse_threshold": 10,
                        "suppress_threshold": 20,
                        "max_suppress_time": 30
                    }
                }
            ])
        );
    }

    #[test]
    fn test_merged_replaces_authentication() {
        let cmds = commands(
            ResourceState::Merged,
            json!([{"name": "T1", "authentication": {"type": "md5", "keychain": "KC2"}}]),
        );
        assert_eq!(cmds, vec!["bfd-template single-hop T1", "authentication md5 keychain KC2"]);
    }

    #[test]
    fn test_merged_disables_echo() {
        let cmds = commands(ResourceState::Merged, json!([{"name": "T1", "echo": false}]));
        assert_eq!(cmds, vec!["bfd-template single-hop T1", "no echo"]);
    }

    #[test]
    fn test_replaced_drops_dampening() {
        let cmds = commands(
            ResourceState::Replaced,
            json!([{
                "name": "T2",
                "hop": "multi_hop",
                "interval": {"min_tx": 500, "min_rx": 500, "multiplier": 5}
            }]),
        );
        assert_eq!(cmds, vec!["bfd-template multi-hop T2", "no dampening 2 10 20 30"]);
    }

    #[test]
    fn test_replaced_without_hop_keeps_device_hop() {
        let cmds = commands(
            ResourceState::Replaced,
            json!([{
                "name": "T2",
                "interval": {"min_tx": 500, "min_rx": 500, "multiplier": 5}
            }]),
        );
        assert_eq!(cmds, vec!["bfd-template multi-hop T2", "no dampening 2 10 20 30"]);
    }

    #[test]
    fn test_hop_change_recreates_template() {
        let cmds = commands(
            ResourceState::Merged,
            json!([{"name": "T2", "hop": "single_hop"}]),
        );
        assert_eq!(
            cmds,
            vec![
                "no bfd-template multi-hop T2",
                "bfd-template single-hop T2",
                "interval min-tx 500 min-rx 500 multiplier 5",
                "dampening 2 10 20 30"
            ]
        );

        let cmds = commands(
            ResourceState::Replaced,
            json!([{"name": "T1", "hop": "multi_hop", "echo": true}]),
        );
        assert_eq!(
            cmds,
            vec!["no bfd-template single-hop T1", "bfd-template multi-hop T1", "echo"]
        );
    }

    #[test]
    fn test_overridden_purges_unlisted_template() {
        let facts = populate_facts::<BfdTemplatesResource>(RUNNING).unwrap();
        let cmds = commands(ResourceState::Overridden, json!([facts[0].clone()]));
        assert_eq!(cmds, vec!["no bfd-template multi-hop T2"]);
    }

    #[test]
    fn test_rendered_defaults_to_single_hop() {
        let want = json!([{
            "name": "T3",
            "interval": {"min_tx": 100, "min_rx": 100, "multiplier": 3}
        }]);
        let (want, _) = to_keyed(&LAYOUT, &want);
        let cmds = Reconciler::new(&TEMPLATE, ResourceState::Rendered)
            .reconcile(&LAYOUT, &want, &json!({}))
            .unwrap();
        assert_eq!(
            cmds,
            vec!["bfd-template single-hop T3", "interval min-tx 100 min-rx 100 multiplier 3"]
        );
    }

    #[test]
    fn test_schema_rejects_unknown_auth_type() {
        let err = crate::modules::network::resource::validate_config::<BfdTemplatesResource>(&json!([
            {"name": "T1", "authentication": {"type": "crc32", "keychain": "K"}}
        ]))
        .unwrap_err();
        assert!(matches!(err, crate::modules::ModuleError::Validation(_)));
    }

    #[test]
    fn test_every_parser_round_trips() {
        let cases = [
            ("template", json!({"name": "T9", "hop": "multi_hop"})),
            (
                "interval",
                json!({"name": "T9", "hop": "single_hop",
                       "interval": {"min_tx": 150, "min_rx": 250, "multiplier": 4}}),
            ),
            ("echo", json!({"name": "T9", "hop": "single_hop", "echo": true})),
            (
                "dampening",
                json!({"name": "T9", "hop": "multi_hop", "dampening": {
                    "half_life_period": 5,
                    "reuse_threshold": 100,
                    "suppress_threshold": 200,
                    "max_suppress_time": 60
                }}),
            ),
        ];
        for (parser, record) in cases {
            assert_eq!(round_trip(&record, parser), json!([record]), "parser {}", parser);
        }
    }

    #[test]
    fn test_authentication_types_round_trip() {
        for auth_type in ["keyed_md5", "keyed_sha_1", "meticulous_md5", "meticulous_sha_1", "md5", "sha_1"] {
            let record = json!({
                "name": "T9",
                "hop": "single_hop",
                "authentication": {"type": auth_type, "keychain": "BFD_KEYS"}
            });
            assert_eq!(round_trip(&record, "authentication"), json!([record]), "type {}", auth_type);
        }
    }
}
