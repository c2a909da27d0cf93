//! Cisco IOS named access lists resource
//!
//! Each ACL is keyed by name and holds a list of entries (ACEs) keyed by
//! sequence number. An entry is compared as a whole: a modified entry is
//! removed by sequence and written again.
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Web server ACL
//!   ios_acls:
//!     config:
//!       - name: WEB
//!         acl_type: extended
//!         aces:
//!           - sequence: 10
//!             grant: permit
//!             protocol: tcp
//!             source:
//!               any: true
//!             destination:
//!               host: 10.0.0.1
//!             destination_port:
//!               eq: www
//!           - sequence: 20
//!             grant: deny
//!             protocol: ip
//!             source:
//!               any: true
//!             destination:
//!               any: true
//!             log: true
//!     state: replaced
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::{Validate, ValidationError};

use crate::modules::network::resource::utils::key_string;
use crate::modules::network::resource::{
    Entry, Field, Layout, NetworkTemplate, ParserTemplate, Rendered, Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclType {
    Standard,
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grant {
    Permit,
    Deny,
}

/// Source or destination of an entry: `any`, a host, or a wildcard match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_address"))]
pub struct AceAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard_bits: Option<String>,
}

fn validate_address(address: &AceAddress) -> Result<(), ValidationError> {
    let forms = [
        address.any == Some(true),
        address.host.is_some(),
        address.address.is_some(),
    ];
    if forms.iter().filter(|set| **set).count() != 1 {
        return Err(ValidationError::new("exactly one of any, host or address is required"));
    }
    if address.wildcard_bits.is_some() && address.address.is_none() {
        return Err(ValidationError::new("wildcard_bits requires address"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortRange {
    pub start: String,
    pub end: String,
}

/// Port match; ports are kept as text since IOS accepts names (`www`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AcePort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<PortRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AceConfig {
    #[validate(range(min = 1, max = 2147483647))]
    pub sequence: u32,
    pub grant: Grant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[validate(nested)]
    pub source: AceAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub source_port: Option<AcePort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub destination: Option<AceAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub destination_port: Option<AcePort>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AclConfig {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_type: Option<AclType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub aces: Option<Vec<AceConfig>>,
}

// ============================================================================
// Entry rendering
// ============================================================================

fn render_address(address: &Value) -> Option<String> {
    if address.get("any").and_then(Value::as_bool) == Some(true) {
        return Some("any".to_string());
    }
    if let Some(host) = address.get("host").and_then(Value::as_str) {
        return Some(format!("host {}", host));
    }
    let ip = address.get("address").and_then(Value::as_str)?;
    Some(match address.get("wildcard_bits").and_then(Value::as_str) {
        Some(wildcard) => format!("{} {}", ip, wildcard),
        None => ip.to_string(),
    })
}

fn render_port(port: &Value) -> Option<String> {
    if let Some(range) = port.get("range") {
        let start = range.get("start").and_then(key_string)?;
        let end = range.get("end").and_then(key_string)?;
        return Some(format!("range {} {}", start, end));
    }
    ["eq", "neq", "gt", "lt"].iter().find_map(|op| {
        port.get(*op)
            .and_then(key_string)
            .map(|value| format!("{} {}", op, value))
    })
}

/// Render one entry as `<seq> <grant> [proto] <src> [port] [<dst> [port]] [log]`.
fn render_ace(ace: &Value) -> Option<Rendered> {
    let mut parts = vec![
        ace.get("sequence").and_then(key_string)?,
        ace.get("grant").and_then(Value::as_str)?.to_string(),
    ];
    if let Some(protocol) = ace.get("protocol").and_then(key_string) {
        parts.push(protocol);
    }
    parts.push(render_address(ace.get("source")?)?);
    if let Some(port) = ace.get("source_port").and_then(render_port) {
        parts.push(port);
    }
    if let Some(destination) = ace.get("destination").and_then(render_address) {
        parts.push(destination);
        if let Some(port) = ace.get("destination_port").and_then(render_port) {
            parts.push(port);
        }
    }
    if ace.get("log").and_then(Value::as_bool) == Some(true) {
        parts.push("log".to_string());
    }
    Some(Rendered::Line(parts.join(" ")))
}

const ADDRESS: &str = r"(?:(?P<{p}_any>any)|host\s+(?P<{p}_host>\S+)|(?P<{p}_addr>\d+\.\d+\.\d+\.\d+)(?:\s+(?P<{p}_wild>\d+\.\d+\.\d+\.\d+))?)";
const PORT: &str = r"(?:(?P<{p}_op>eq|neq|gt|lt)\s+(?P<{p}_port>\S+)|range\s+(?P<{p}_start>\S+)\s+(?P<{p}_end>\S+))";

fn ace_pattern() -> String {
    let address = |p: &str| ADDRESS.replace("{p}", p);
    let port = |p: &str| PORT.replace("{p}", p);
    format!(
        r"\s+(?P<sequence>\d+)\s+(?P<grant>permit|deny)(?:\s+(?P<protocol>ip|tcp|udp|icmp|igmp|gre|esp|ahp|ospf|eigrp|pim|\d+))?\s+{}(?:\s+{})?(?:\s+{})?(?:\s+{})?(?P<log>\s+log)?$",
        address("src"),
        port("src"),
        address("dst"),
        port("dst"),
    )
}

fn address_result(p: &str) -> Value {
    json!({
        "any": format!("{{{{ True if {}_any is defined }}}}", p),
        "host": format!("{{{{ {}_host }}}}", p),
        "address": format!("{{{{ {}_addr }}}}", p),
        "wildcard_bits": format!("{{{{ {}_wild }}}}", p),
    })
}

fn port_result(p: &str) -> Value {
    let mut port = serde_json::Map::new();
    port.insert(format!("{{{{ {}_op }}}}", p), json!(format!("{{{{ {}_port }}}}", p)));
    port.insert(
        "range".to_string(),
        json!({
            "start": format!("{{{{ {}_start }}}}", p),
            "end": format!("{{{{ {}_end }}}}", p),
        }),
    );
    Value::Object(port)
}

static TEMPLATE: Lazy<NetworkTemplate> = Lazy::new(|| {
    NetworkTemplate::new(vec![
        ParserTemplate::new("acl")
            .getval(r"ip\s+access-list\s+(?P<acl_type>standard|extended)\s+(?P<name>\S+)$")
            .setval("ip access-list {{ acl_type|default('extended') }} {{ name }}")
            .result(json!({"{{ name }}": {"name": "{{ name }}", "acl_type": "{{ acl_type }}"}}))
            .shared(),
        ParserTemplate::new("ace")
            .getval(ace_pattern())
            .setval_fn(render_ace)
            .remval("no {{ sequence }}")
            .result(json!({"{{ name }}": {"aces": [{
                "sequence": "{{ sequence|int }}",
                "grant": "{{ grant }}",
                "protocol": "{{ protocol }}",
                "source": address_result("src"),
                "source_port": port_result("src"),
                "destination": address_result("dst"),
                "destination_port": port_result("dst"),
                "log": "{{ True if log is defined }}"
            }]}})),
    ])
    .expect("Invalid acls parsers")
});

static LAYOUT: Lazy<Layout> = Lazy::new(|| Layout::Keyed {
    key: "name",
    header: "acl",
    purge: Some("acl"),
    delete_whole: true,
    identity: &["acl_type"],
    fields: vec![Field::List {
        name: "aces",
        key: "sequence",
        entry: Entry::Whole("ace"),
    }],
});

/// `ios_acls`
#[derive(Debug, Clone, Copy, Default)]
pub struct AclsResource;

impl Resource for AclsResource {
    const MODULE: &'static str = "ios_acls";
    const DESCRIPTION: &'static str = "Manage named IP access lists on Cisco IOS devices";
    const GATHER_COMMAND: &'static str = "show running-config | section ^ip access-list";

    type Config = AclConfig;

    fn template() -> &'static NetworkTemplate {
        &TEMPLATE
    }

    fn layout() -> &'static Layout {
        &LAYOUT
    }
}
