//! Cisco IOS interfaces resource
//!
//! Manages interface attributes: description, administrative state, MTU,
//! speed, duplex and per-interface BFD settings.
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Configure uplinks
//!   ios_interfaces:
//!     config:
//!       - name: GigabitEthernet0/1
//!         description: Uplink to core
//!         mtu: 9000
//!         bfd:
//!           echo: false
//!           interval:
//!             min_tx: 100
//!             min_rx: 100
//!             multiplier: 3
//!       - name: GigabitEthernet0/2
//!         enabled: false
//!     state: replaced
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::modules::network::resource::{Field, Layout, NetworkTemplate, ParserTemplate, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duplex {
    Full,
    Half,
    Auto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BfdInterval {
    #[validate(range(min = 50, max = 9999))]
    pub min_tx: u32,
    #[validate(range(min = 50, max = 9999))]
    pub min_rx: u32,
    #[validate(range(min = 3, max = 50))]
    pub multiplier: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InterfaceBfd {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub interval: Option<BfdInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 240))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 64, max = 9216))]
    pub mtu: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplex: Option<Duplex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub bfd: Option<InterfaceBfd>,
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![
        ParserTemplate::new("interface")
            .getval(r"interface\s+(?P<name>\S+)$")
            .setval("interface {{ name }}")
            .result(json!({"{{ name }}": {"name": "{{ name }}", "enabled": true}}))
            .shared(),
        ParserTemplate::new("description")
            .getval(r"\s+description\s+(?P<description>.+)$")
            .setval("description {{ description }}")
            .result(json!({"{{ name }}": {"description": "{{ description }}"}})),
        ParserTemplate::new("enabled")
            .getval(r"\s+(?P<negate>no\s+)?shutdown$")
            .setval("no shutdown")
            .remval("shutdown")
            .result(json!({"{{ name }}": {"enabled": "{{ negate is defined }}"}})),
        ParserTemplate::new("mtu")
            .getval(r"\s+mtu\s+(?P<mtu>\d+)$")
            .setval("mtu {{ mtu }}")
            .result(json!({"{{ name }}": {"mtu": "{{ mtu|int }}"}})),
        ParserTemplate::new("speed")
            .getval(r"\s+speed\s+(?P<speed>\S+)$")
            .setval("speed {{ speed }}")
            .result(json!({"{{ name }}": {"speed": "{{ speed }}"}})),
        ParserTemplate::new("duplex")
            .getval(r"\s+duplex\s+(?P<duplex>full|half|auto)$")
            .setval("duplex {{ duplex }}")
            .result(json!({"{{ name }}": {"duplex": "{{ duplex }}"}})),
        ParserTemplate::new("bfd_echo")
            .getval(r"\s+(?P<negate>no\s+)?bfd\s+echo$")
            .setval("bfd echo")
            .compval("echo")
            .result(json!({"{{ name }}": {"bfd": {"echo": "{{ negate is not defined }}"}}})),
        ParserTemplate::new("bfd_interval")
            .getval(
                r"\s+bfd\s+interval\s+(?P<min_tx>\d+)\s+min_rx\s+(?P<min_rx>\d+)\s+multiplier\s+(?P<multiplier>\d+)$",
            )
            .setval("bfd interval {{ interval.min_tx }} min_rx {{ interval.min_rx }} multiplier {{ interval.multiplier }}")
            .compval("interval")
            .result(json!({"{{ name }}": {"bfd": {"interval": {
                "min_tx": "{{ min_tx|int }}",
                "min_rx": "{{ min_rx|int }}",
                "multiplier": "{{ multiplier|int }}"
            }}}})),
    ])
    .expect("Invalid interfaces parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Keyed {
    key: "name",
    header: "interface",
    purge: None,
    delete_whole: false,
    identity: &[],
    fields: vec![
        Field::Scalar("description"),
        Field::Toggle {
            parser: "enabled",
            default: true,
        },
        Field::Scalar("mtu"),
        Field::Scalar("speed"),
        Field::Scalar("duplex"),
        Field::Group {
            name: "bfd",
            fields: vec![
                Field::Toggle {
                    parser: "bfd_echo",
                    default: true,
                },
                Field::Scalar("bfd_interval"),
            ],
        },
    ],
});

/// `ios_interfaces`
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfacesResource;

impl Resource for InterfacesResource {
    const MODULE: &'static str = "ios_interfaces";
    const DESCRIPTION: &'static str = "Manage interface attributes on Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | section ^interface";

    type Config = InterfaceConfig;

    fn template() -> &'static NetworkTemplate {
        &TEMPLATE
    }

    fn layout() -> &'static Layout {
        &LAYOUT
    }
}
