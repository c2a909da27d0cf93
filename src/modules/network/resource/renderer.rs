//! Command rendering: structured data back to CLI lines.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use super::parser::NetworkTemplate;
use super::TemplateError;

/// Output of a command template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rendered {
    Line(String),
    Lines(Vec<String>),
}

impl Rendered {
    pub fn into_lines(self) -> Vec<String> {
        match self {
            Rendered::Line(line) => vec![line],
            Rendered::Lines(lines) => lines,
        }
    }

    fn map_lines(self, f: impl Fn(String) -> String) -> Self {
        match self {
            Rendered::Line(line) => Rendered::Line(f(line)),
            Rendered::Lines(lines) => Rendered::Lines(lines.into_iter().map(f).collect()),
        }
    }
}

/// Platform command prefixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefix {
    /// Prepended to every non-negated command when set
    pub set: Option<String>,
    /// Negation keyword
    pub remove: String,
}

impl Default for Prefix {
    fn default() -> Self {
        Self {
            set: None,
            remove: "no".to_string(),
        }
    }
}

impl NetworkTemplate {
    /// Render parser `name` against `data` using the catalog's prefixes.
    ///
    /// Returns `Ok(None)` when the template has nothing to print for this
    /// data, and [`TemplateError::UnknownParser`] for an unknown name.
    pub fn render(
        &self,
        data: &Value,
        name: &str,
        negate: bool,
    ) -> Result<Option<Rendered>, TemplateError> {
        self.render_with_prefix(data, name, negate, self.prefix())
    }

    /// Render parser `name` using an explicit prefix pair.
    pub fn render_with_prefix(
        &self,
        data: &Value,
        name: &str,
        negate: bool,
        prefix: &Prefix,
    ) -> Result<Option<Rendered>, TemplateError> {
        let parser = self.get_parser(name)?;

        let rendered = match (negate, parser.remval()) {
            (true, Some(remval)) => remval.render(data),
            (true, None) => parser
                .setval()
                .and_then(|setval| setval.render(data))
                .map(|r| r.map_lines(|line| format!("{} {}", prefix.remove, line))),
            (false, _) => {
                let rendered = parser.setval().and_then(|setval| setval.render(data));
                match &prefix.set {
                    Some(set) => rendered.map(|r| r.map_lines(|line| format!("{} {}", set, line))),
                    None => rendered,
                }
            }
        };

        trace!(parser = %name, negate, rendered = ?rendered, "rendered");
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::network::resource::parser::ParserTemplate;
    use serde_json::json;

    fn template() -> NetworkTemplate {
        NetworkTemplate::new(vec![
            ParserTemplate::new("hostname")
                .getval(r"hostname\s+(?P<name>\S+)$")
                .setval("hostname {{ hostname }}")
                .result(json!({"hostname": "{{ name }}"})),
            ParserTemplate::new("enabled")
                .getval(r"\s+(?P<negate>no\s+)?shutdown$")
                .setval("no shutdown")
                .remval("shutdown")
                .result(json!({"enabled": "{{ negate is defined }}"})),
            ParserTemplate::new("banner").setval(vec![
                "banner line1 {{ first }}",
                "banner line2 {{ second }}",
            ]),
            ParserTemplate::new("aaa").setval_fn(|data| {
                data.get("group")
                    .and_then(Value::as_str)
                    .map(|g| Rendered::Line(format!("aaa group {}", g)))
            }),
        ])
        .unwrap()
    }

    #[test]
    fn test_render_simple() {
        let t = template();
        let rendered = t.render(&json!({"hostname": "r1"}), "hostname", false).unwrap();
        assert_eq!(rendered, Some(Rendered::Line("hostname r1".to_string())));
    }

    #[test]
    fn test_render_negate_prefixes_no() {
        let t = template();
        let rendered = t.render(&json!({"hostname": "r1"}), "hostname", true).unwrap();
        assert_eq!(rendered, Some(Rendered::Line("no hostname r1".to_string())));
    }

    #[test]
    fn test_render_negate_uses_remval() {
        let t = template();
        let rendered = t.render(&json!({"enabled": true}), "enabled", true).unwrap();
        assert_eq!(rendered, Some(Rendered::Line("shutdown".to_string())));
        let rendered = t.render(&json!({"enabled": true}), "enabled", false).unwrap();
        assert_eq!(rendered, Some(Rendered::Line("no shutdown".to_string())));
    }

    #[test]
    fn test_render_lines_skip_missing() {
        let t = template();
        let rendered = t.render(&json!({"first": "a"}), "banner", false).unwrap();
        assert_eq!(rendered, Some(Rendered::Lines(vec!["banner line1 a".to_string()])));

        let rendered = t.render(&json!({"first": "a", "second": "b"}), "banner", true).unwrap();
        assert_eq!(
            rendered.unwrap().into_lines(),
            vec!["no banner line1 a", "no banner line2 b"]
        );
    }

    #[test]
    fn test_render_function_template() {
        let t = template();
        let rendered = t.render(&json!({"group": "tacacs"}), "aaa", false).unwrap();
        assert_eq!(rendered, Some(Rendered::Line("aaa group tacacs".to_string())));
        assert_eq!(t.render(&json!({}), "aaa", false).unwrap(), None);
    }

    #[test]
    fn test_render_missing_data_is_none() {
        let t = template();
        assert_eq!(t.render(&json!({}), "hostname", false).unwrap(), None);
    }

    #[test]
    fn test_render_unknown_parser() {
        let t = template();
        let err = t.render(&json!({}), "nope", false).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownParser(name) if name == "nope"));
    }

    #[test]
    fn test_render_with_prefixes() {
        let t = template();
        let prefix = Prefix {
            set: Some("set".to_string()),
            remove: "delete".to_string(),
        };
        let data = json!({"hostname": "r1"});
        assert_eq!(
            t.render_with_prefix(&data, "hostname", false, &prefix).unwrap(),
            Some(Rendered::Line("set hostname r1".to_string()))
        );
        assert_eq!(
            t.render_with_prefix(&data, "hostname", true, &prefix).unwrap(),
            Some(Rendered::Line("delete hostname r1".to_string()))
        );
    }

    #[test]
    fn test_prefix_deserialize_defaults() {
        let prefix: Prefix = serde_json::from_value(json!({})).unwrap();
        assert_eq!(prefix, Prefix::default());
        assert_eq!(prefix.remove, "no");
    }
}
