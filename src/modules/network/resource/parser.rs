//! Parser catalog: line patterns to structured facts.
//!
//! A [`NetworkTemplate`] is an ordered set of named parsers. Parsing folds
//! the configuration lines over a [`ParseState`]; for each line the first
//! parser whose pattern matches contributes its expanded result template to
//! the accumulated record.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::trace;

use super::renderer::{Prefix, Rendered};
use super::template::{is_template, Template};
use super::utils::dict_merge;
use super::TemplateError;

/// Function-valued command template for lines too irregular for text
pub type RenderFn = fn(&Value) -> Option<Rendered>;

/// Source form of a command template
#[derive(Debug, Clone)]
pub enum CommandTemplate {
    /// One text template producing one line
    Text(String),
    /// Several text templates, one line each; lines rendering to nothing are skipped
    Lines(Vec<String>),
    /// A plain function of the data
    Func(RenderFn),
}

impl From<&str> for CommandTemplate {
    fn from(s: &str) -> Self {
        CommandTemplate::Text(s.to_string())
    }
}

impl From<String> for CommandTemplate {
    fn from(s: String) -> Self {
        CommandTemplate::Text(s)
    }
}

impl From<Vec<&str>> for CommandTemplate {
    fn from(lines: Vec<&str>) -> Self {
        CommandTemplate::Lines(lines.into_iter().map(String::from).collect())
    }
}

/// Definition of one parser, built with chained setters.
///
/// ```ignore
/// ParserTemplate::new("description")
///     .getval(r"\s+description\s+(?P<description>.+)$")
///     .setval("description {{ description }}")
///     .result(json!({"{{ name }}": {"description": "{{ description }}"}}))
/// ```
#[derive(Debug, Clone)]
pub struct ParserTemplate {
    name: String,
    getval: Option<String>,
    setval: Option<CommandTemplate>,
    remval: Option<CommandTemplate>,
    result: Option<Value>,
    shared: bool,
    compval: Option<String>,
}

impl ParserTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getval: None,
            setval: None,
            remval: None,
            result: None,
            shared: false,
            compval: None,
        }
    }

    /// Line pattern with named capture groups, matched at line start
    pub fn getval(mut self, pattern: impl Into<String>) -> Self {
        self.getval = Some(pattern.into());
        self
    }

    pub fn setval(mut self, setval: impl Into<CommandTemplate>) -> Self {
        self.setval = Some(setval.into());
        self
    }

    pub fn setval_fn(mut self, f: RenderFn) -> Self {
        self.setval = Some(CommandTemplate::Func(f));
        self
    }

    /// Dedicated command used instead of prefixing `setval` when negating
    pub fn remval(mut self, remval: impl Into<CommandTemplate>) -> Self {
        self.remval = Some(remval.into());
        self
    }

    pub fn result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Mark as an anchor whose captures stay in scope for following lines
    pub fn shared(mut self) -> Self {
        self.shared = true;
        self
    }

    /// Dotted path compared instead of the parser name
    pub fn compval(mut self, path: impl Into<String>) -> Self {
        self.compval = Some(path.into());
        self
    }

    fn compile(self) -> Result<CompiledParser, TemplateError> {
        let regex = self
            .getval
            .as_deref()
            .map(|pattern| {
                Regex::new(&format!(r"\A(?:{})", pattern)).map_err(|source| {
                    TemplateError::InvalidPattern {
                        parser: self.name.clone(),
                        source,
                    }
                })
            })
            .transpose()?;

        Ok(CompiledParser {
            regex,
            setval: self.setval.map(CompiledCommand::compile).transpose()?,
            remval: self.remval.map(CompiledCommand::compile).transpose()?,
            result: self.result.as_ref().map(ResultTemplate::compile).transpose()?,
            shared: self.shared,
            compval: self.compval,
            name: self.name,
        })
    }
}

// ============================================================================
// Compiled forms
// ============================================================================

#[derive(Debug, Clone)]
pub(crate) enum CompiledCommand {
    Text(Template),
    Lines(Vec<Template>),
    Func(RenderFn),
}

impl CompiledCommand {
    fn compile(source: CommandTemplate) -> Result<Self, TemplateError> {
        Ok(match source {
            CommandTemplate::Text(text) => CompiledCommand::Text(Template::compile(text)?),
            CommandTemplate::Lines(lines) => CompiledCommand::Lines(
                lines
                    .into_iter()
                    .map(Template::compile)
                    .collect::<Result<_, _>>()?,
            ),
            CommandTemplate::Func(f) => CompiledCommand::Func(f),
        })
    }

    pub(crate) fn render(&self, data: &Value) -> Option<Rendered> {
        match self {
            CompiledCommand::Text(t) => t.render_string(data).map(Rendered::Line),
            CompiledCommand::Lines(templates) => {
                let lines: Vec<String> = templates
                    .iter()
                    .filter_map(|t| t.render_string(data))
                    .collect();
                if lines.is_empty() {
                    None
                } else {
                    Some(Rendered::Lines(lines))
                }
            }
            CompiledCommand::Func(f) => f(data),
        }
    }
}

#[derive(Debug, Clone)]
enum ResultKey {
    Static(String),
    Dynamic(Template),
}

/// A result template: JSON whose string keys and leaves may be templates
#[derive(Debug, Clone)]
enum ResultTemplate {
    Literal(Value),
    Expr(Template),
    List(Vec<ResultTemplate>),
    Map(Vec<(ResultKey, ResultTemplate)>),
}

impl ResultTemplate {
    fn compile(value: &Value) -> Result<Self, TemplateError> {
        Ok(match value {
            Value::String(s) if is_template(s) => ResultTemplate::Expr(Template::compile(s.as_str())?),
            Value::Array(items) => ResultTemplate::List(
                items
                    .iter()
                    .map(ResultTemplate::compile)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let key = if is_template(key) {
                        ResultKey::Dynamic(Template::compile(key.as_str())?)
                    } else {
                        ResultKey::Static(key.clone())
                    };
                    entries.push((key, ResultTemplate::compile(value)?));
                }
                ResultTemplate::Map(entries)
            }
            other => ResultTemplate::Literal(other.clone()),
        })
    }

    /// Expand against captured values. Keys or leaves evaluating to nothing
    /// are left out.
    fn expand(&self, ctx: &Value) -> Option<Value> {
        match self {
            ResultTemplate::Literal(v) => Some(v.clone()),
            ResultTemplate::Expr(t) => t.render(ctx),
            ResultTemplate::List(items) => Some(Value::Array(
                items.iter().filter_map(|item| item.expand(ctx)).collect(),
            )),
            ResultTemplate::Map(entries) => {
                let mut out = Map::new();
                for (key, template) in entries {
                    let key = match key {
                        ResultKey::Static(k) => k.clone(),
                        ResultKey::Dynamic(t) => match t.render_string(ctx) {
                            Some(k) => k,
                            None => continue,
                        },
                    };
                    if let Some(value) = template.expand(ctx) {
                        out.insert(key, value);
                    }
                }
                Some(Value::Object(out))
            }
        }
    }
}

/// A parser ready for matching and rendering
#[derive(Debug, Clone)]
pub struct CompiledParser {
    name: String,
    regex: Option<Regex>,
    setval: Option<CompiledCommand>,
    remval: Option<CompiledCommand>,
    result: Option<ResultTemplate>,
    shared: bool,
    compval: Option<String>,
}

impl CompiledParser {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path the reconciler compares: `compval` when set, else the name
    pub fn compval(&self) -> &str {
        self.compval.as_deref().unwrap_or(&self.name)
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub(crate) fn setval(&self) -> Option<&CompiledCommand> {
        self.setval.as_ref()
    }

    pub(crate) fn remval(&self) -> Option<&CompiledCommand> {
        self.remval.as_ref()
    }

    /// Named groups that participated in the match.
    fn captures(&self, line: &str) -> Option<Map<String, Value>> {
        let regex = self.regex.as_ref()?;
        let caps = regex.captures(line)?;
        Some(
            regex
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    caps.name(name)
                        .map(|m| (name.to_string(), Value::String(m.as_str().to_string())))
                })
                .collect(),
        )
    }
}

// ============================================================================
// Parse fold
// ============================================================================

/// Accumulator threaded through a parse.
#[derive(Debug, Clone)]
pub struct ParseState {
    /// Captures of the most recent shared (anchor) match
    pub shared: Map<String, Value>,
    /// Record built so far
    pub result: Value,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            shared: Map::new(),
            result: Value::Object(Map::new()),
        }
    }
}

/// Ordered parser catalog for one resource.
#[derive(Debug, Clone)]
pub struct NetworkTemplate {
    parsers: IndexMap<String, CompiledParser>,
    prefix: Prefix,
}

impl NetworkTemplate {
    /// Compile a catalog. Fails on bad syntax, bad patterns or duplicate names.
    pub fn new(parsers: Vec<ParserTemplate>) -> Result<Self, TemplateError> {
        let mut compiled = IndexMap::with_capacity(parsers.len());
        for parser in parsers {
            if compiled.contains_key(&parser.name) {
                return Err(TemplateError::DuplicateParser(parser.name));
            }
            let parser = parser.compile()?;
            compiled.insert(parser.name.clone(), parser);
        }
        Ok(Self {
            parsers: compiled,
            prefix: Prefix::default(),
        })
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = prefix;
        self
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    pub fn get_parser(&self, name: &str) -> Result<&CompiledParser, TemplateError> {
        self.parsers
            .get(name)
            .ok_or_else(|| TemplateError::UnknownParser(name.to_string()))
    }

    pub fn parser_names(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    /// Parse configuration lines into a structured record.
    pub fn parse<'a, I>(&self, lines: I) -> Value
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .fold(ParseState::default(), |state, line| self.parse_line(state, line))
            .result
    }

    /// Feed one line through the catalog.
    pub fn parse_line(&self, mut state: ParseState, line: &str) -> ParseState {
        let line = line.trim_end();

        let Some((parser, captures)) = self
            .parsers
            .values()
            .find_map(|p| p.captures(line).map(|caps| (p, caps)))
        else {
            return state;
        };

        trace!(parser = %parser.name, line = %line, "matched");

        if parser.shared {
            state.shared = captures.clone();
        }

        let mut context = captures;
        for (key, value) in &state.shared {
            if !context.contains_key(key) {
                context.insert(key.clone(), value.clone());
            }
        }

        if let Some(expanded) = parser
            .result
            .as_ref()
            .and_then(|r| r.expand(&Value::Object(context)))
        {
            state.result = dict_merge(&state.result, &expanded);
        }

        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn interfaces_template() -> NetworkTemplate {
        NetworkTemplate::new(vec![
            ParserTemplate::new("interface")
                .getval(r"interface\s+(?P<name>\S+)$")
                .setval("interface {{ name }}")
                .result(json!({"{{ name }}": {"name": "{{ name }}"}}))
                .shared(),
            ParserTemplate::new("description")
                .getval(r"\s+description\s+(?P<description>.+)$")
                .setval("description {{ description }}")
                .result(json!({"{{ name }}": {"description": "{{ description }}"}})),
            ParserTemplate::new("mtu")
                .getval(r"\s+mtu\s+(?P<mtu>\d+)$")
                .setval("mtu {{ mtu }}")
                .result(json!({"{{ name }}": {"mtu": "{{ mtu|int }}"}})),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_with_shared_anchor() {
        let template = interfaces_template();
        let config = "interface Gi0/1\n description uplink\n mtu 1500\ninterface Gi0/2\n description access";
        let parsed = template.parse(config.lines());

        assert_eq!(
            parsed,
            json!({
                "Gi0/1": {"name": "Gi0/1", "description": "uplink", "mtu": 1500},
                "Gi0/2": {"name": "Gi0/2", "description": "access"}
            })
        );
    }

    #[test]
    fn test_unmatched_lines_skipped() {
        let template = interfaces_template();
        let parsed = template.parse(vec!["interface Gi0/1", " ip address dhcp", " bogus"]);
        assert_eq!(parsed, json!({"Gi0/1": {"name": "Gi0/1"}}));
    }

    #[test]
    fn test_first_match_wins() {
        let template = NetworkTemplate::new(vec![
            ParserTemplate::new("specific")
                .getval(r"vlan\s+(?P<id>\d+)$")
                .result(json!({"kind": "specific"})),
            ParserTemplate::new("generic")
                .getval(r"vlan\s+(?P<id>\S+)$")
                .result(json!({"kind": "generic"})),
        ])
        .unwrap();

        assert_eq!(template.parse(vec!["vlan 10"]), json!({"kind": "specific"}));
        assert_eq!(template.parse(vec!["vlan abc"]), json!({"kind": "generic"}));
    }

    #[test]
    fn test_optional_group_dropped() {
        let template = NetworkTemplate::new(vec![ParserTemplate::new("shutdown")
            .getval(r"\s*(?P<negate>no\s+)?shutdown$")
            .result(json!({"enabled": "{{ negate is defined }}"}))])
        .unwrap();

        assert_eq!(template.parse(vec!["shutdown"]), json!({"enabled": false}));
        assert_eq!(template.parse(vec!["no shutdown"]), json!({"enabled": true}));
    }

    #[test]
    fn test_line_captures_shadow_shared() {
        let template = NetworkTemplate::new(vec![
            ParserTemplate::new("anchor")
                .getval(r"router\s+(?P<name>\S+)$")
                .result(json!({"{{ name }}": {}}))
                .shared(),
            ParserTemplate::new("alias")
                .getval(r"\s+alias\s+(?P<name>\S+)$")
                .result(json!({"alias": "{{ name }}"})),
        ])
        .unwrap();

        let parsed = template.parse(vec!["router r1", " alias r9"]);
        assert_eq!(parsed["alias"], json!("r9"));
    }

    #[test]
    fn test_dynamic_key_undefined_is_omitted() {
        let template = NetworkTemplate::new(vec![ParserTemplate::new("orphan")
            .getval(r"\s+description\s+(?P<description>.+)$")
            .result(json!({"{{ name }}": {"description": "{{ description }}"}}))])
        .unwrap();

        assert_eq!(template.parse(vec![" description x"]), json!({}));
    }

    #[test]
    fn test_duplicate_parser_rejected() {
        let err = NetworkTemplate::new(vec![
            ParserTemplate::new("mtu").getval(r"mtu"),
            ParserTemplate::new("mtu").getval(r"mtu\s+\d+"),
        ])
        .unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateParser(name) if name == "mtu"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = NetworkTemplate::new(vec![ParserTemplate::new("bad").getval(r"(?P<x>")]).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPattern { .. }));
    }

    #[test]
    fn test_bad_result_template_rejected() {
        let err = NetworkTemplate::new(vec![ParserTemplate::new("bad")
            .getval(r"x")
            .result(json!({"k": "{{ unclosed"}))])
        .unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_pattern_anchored_at_line_start() {
        let template = interfaces_template();
        // "mtu" appears mid-line but the pattern requires it after leading whitespace
        let parsed = template.parse(vec!["interface Gi0/1", " ip mtu 9000"]);
        assert_eq!(parsed, json!({"Gi0/1": {"name": "Gi0/1"}}));
    }

    #[test]
    fn test_get_parser() {
        let template = interfaces_template();
        assert_eq!(template.get_parser("mtu").unwrap().compval(), "mtu");
        assert!(matches!(
            template.get_parser("nope"),
            Err(TemplateError::UnknownParser(_))
        ));
        assert_eq!(
            template.parser_names().collect::<Vec<_>>(),
            vec!["interface", "description", "mtu"]
        );
    }
}
