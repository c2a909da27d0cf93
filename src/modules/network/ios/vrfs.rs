//! Cisco IOS VRF definitions resource
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Define customer VRFs
//!   ios_vrfs:
//!     config:
//!       - name: CUST_A
//!         description: Customer A
//!         rd: "65000:100"
//!         ipv4:
//!           multicast:
//!             multitopology: true
//!     state: merged
//!
//! - name: Remove a VRF entirely
//!   ios_vrfs:
//!     config:
//!       - name: CUST_B
//!     state: purged
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::modules::network::resource::{Field, Layout, NetworkTemplate, ParserTemplate, Resource};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VrfMulticast {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multitopology: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VrfIpv4 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicast: Option<VrfMulticast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct VrfConfig {
    #[validate(length(min = 1, max = 32))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 244))]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 2, max = 4094))]
    pub vnet_tag: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<VrfIpv4>,
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![
        ParserTemplate::new("vrf")
            .getval(r"vrf\s+definition\s+(?P<name>\S+)$")
            .setval("vrf definition {{ name }}")
            .result(json!({"{{ name }}": {"name": "{{ name }}"}}))
            .shared(),
        ParserTemplate::new("description")
            .getval(r"\s+description\s+(?P<description>.+)$")
            .setval("description {{ description }}")
            .result(json!({"{{ name }}": {"description": "{{ description }}"}})),
        ParserTemplate::new("rd")
            .getval(r"\s+rd\s+(?P<rd>\S+)$")
            .setval("rd {{ rd }}")
            .result(json!({"{{ name }}": {"rd": "{{ rd }}"}})),
        ParserTemplate::new("vnet_tag")
            .getval(r"\s+vnet\s+tag\s+(?P<vnet_tag>\d+)$")
            .setval("vnet tag {{ vnet_tag }}")
            .result(json!({"{{ name }}": {"vnet_tag": "{{ vnet_tag|int }}"}})),
        ParserTemplate::new("vpn_id")
            .getval(r"\s+vpn\s+id\s+(?P<vpn_id>\S+)$")
            .setval("vpn id {{ vpn_id }}")
            .result(json!({"{{ name }}": {"vpn_id": "{{ vpn_id }}"}})),
        ParserTemplate::new("ipv4_multicast_multitopology")
            .getval(r"\s+ipv4\s+multicast\s+multitopology$")
            .setval("ipv4 multicast multitopology")
            .compval("ipv4.multicast.multitopology")
            .result(json!({"{{ name }}": {"ipv4": {"multicast": {"multitopology": "{{ True }}"}}}})),
    ])
    .expect("Invalid vrfs parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Keyed {
    key: "name",
    header: "vrf",
    purge: Some("vrf"),
    delete_whole: false,
    identity: &[],
    fields: vec![
        Field::Scalar("description"),
        Field::Scalar("rd"),
        Field::Scalar("vnet_tag"),
        Field::Scalar("vpn_id"),
        Field::Scalar("ipv4_multicast_multitopology"),
    ],
});

/// `ios_vrfs`
#[derive(Debug, Clone, Copy, Default)]
pub struct VrfsResource;

impl Resource for VrfsResource {
    const MODULE: &'static str = "ios_vrfs";
    const DESCRIPTION: &'static str = "Manage VRF definitions on Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | section ^vrf";

    type Config = VrfConfig;

    fn template() -> &'static NetworkTemplate {
        &TEMPLATE
    }

    fn layout() -> &'static Layout {
        &LAYOUT
    }
}
