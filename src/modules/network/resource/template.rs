//! Jinja2-style templates for result and command templates.
//!
//! Template syntax is checked once when a catalog is built, so syntax
//! errors surface as [`TemplateError::Syntax`] at that point. The checked
//! source is parsed again by the shared environment on every render, since
//! minijinja's compiled forms borrow their source. Evaluation never
//! fails: undefined references, failing filters and printing an undefined
//! or null value all collapse into `None`.

use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::trace;

use super::TemplateError;

static ENV: Lazy<Environment<'static>> = Lazy::new(build_environment);

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();

    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    // Attribute access on undefined stays undefined so `a.b.c` degrades
    env.set_undefined_behavior(UndefinedBehavior::Chainable);

    // Printing a missing value aborts the render instead of emitting ""
    env.set_formatter(|out, state, value| {
        if value.is_undefined() || value.is_none() {
            return Err(Error::new(
                ErrorKind::UndefinedError,
                "undefined value in output",
            ));
        }
        minijinja::escape_formatter(out, state, value)
    });

    env.add_filter(
        "default",
        |value: minijinja::Value, default: minijinja::Value| {
            if value.is_undefined() || value.is_none() {
                default
            } else {
                value
            }
        },
    );
    env.add_filter("d", |value: minijinja::Value, default: minijinja::Value| {
        if value.is_undefined() || value.is_none() {
            default
        } else {
            value
        }
    });

    env
}

/// Returns true if the string contains template markup.
pub fn is_template(s: &str) -> bool {
    s.contains("{{") || s.contains("{%")
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    /// Exactly one `{{ expr }}`; evaluates to a native JSON value
    Expression(String),
    /// Anything else; renders to text
    Text,
}

/// A syntax-checked template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    kind: Kind,
}

impl Template {
    /// Compile a template, validating its syntax.
    pub fn compile(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let syntax = |e: Error| TemplateError::Syntax {
            template: source.clone(),
            message: e.to_string(),
        };

        let kind = match single_expression(&source) {
            Some(expr) => {
                ENV.compile_expression(expr).map_err(syntax)?;
                Kind::Expression(expr.to_string())
            }
            None => {
                ENV.template_from_str(&source).map_err(syntax)?;
                Kind::Text
            }
        };

        Ok(Self { source, kind })
    }

    /// The template source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against `data`.
    ///
    /// Single-expression templates keep the expression's type (`{{ vid|int }}`
    /// is a number, `{{ True }}` a bool). Other templates produce a trimmed
    /// string. Null, undefined or empty results are `None`.
    pub fn render(&self, data: &Value) -> Option<Value> {
        match &self.kind {
            Kind::Expression(expr) => {
                let value = ENV
                    .compile_expression(expr)
                    .and_then(|compiled| compiled.eval(data))
                    .map_err(|e| trace!(template = %self.source, error = %e, "expression degraded"))
                    .ok()?;
                if value.is_undefined() || value.is_none() {
                    return None;
                }
                match serde_json::to_value(&value).ok()? {
                    Value::Null => None,
                    Value::String(s) if s.is_empty() => None,
                    other => Some(other),
                }
            }
            Kind::Text => self.render_string(data).map(Value::String),
        }
    }

    /// Render to text regardless of the template's shape.
    pub fn render_string(&self, data: &Value) -> Option<String> {
        let rendered = ENV
            .render_str(&self.source, data)
            .map_err(|e| trace!(template = %self.source, error = %e, "render degraded"))
            .ok()?;
        let trimmed = rendered.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Compile and render a one-off template to text.
pub fn render_str(source: &str, data: &Value) -> Result<Option<String>, TemplateError> {
    Ok(Template::compile(source)?.render_string(data))
}

/// Inner expression of a template made of one `{{ ... }}` block and nothing
/// else but surrounding whitespace.
fn single_expression(source: &str) -> Option<&str> {
    let inner = source
        .trim()
        .strip_prefix("{{")?
        .strip_suffix("}}")?;
    if inner.contains("{{") || inner.contains("}}") || inner.contains("{%") {
        return None;
    }
    Some(inner.trim())
}
