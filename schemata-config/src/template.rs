//! Template evaluation against a resolution scope
//!
//! A string counts as templated when it contains `{{`. Two forms are handled:
//!
//! - A string that is exactly one reference, such as `{{ env }}` or
//!   `{{ project.name }}`, evaluates to the bound value itself. An integer
//!   binding stays an integer, a list stays a list.
//! - Anything else is rendered with liquid and always yields a string.
//!
//! Unknown references are errors in both forms. Liquid refuses to render
//! undefined variables, and the direct form goes through
//! [`ResolutionContext::lookup`].

use crate::context::ResolutionContext;
use crate::error::{ConfigError, Result};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::trace;

static REFERENCE_REGEX: OnceLock<Regex> = OnceLock::new();
static PARSER: OnceLock<std::result::Result<liquid::Parser, String>> = OnceLock::new();

fn reference_regex() -> &'static Regex {
    REFERENCE_REGEX.get_or_init(|| {
        Regex::new(r"^\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*)\s*\}\}$")
            .expect("Invalid template reference regex")
    })
}

fn parser() -> Result<&'static liquid::Parser> {
    PARSER
        .get_or_init(|| {
            liquid::ParserBuilder::with_stdlib()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|message| ConfigError::template("", message.clone()))
}

/// Whether `raw` should be evaluated before coercion.
pub fn is_templated(raw: &str) -> bool {
    raw.contains("{{")
}

/// Evaluate a templated string against the context's scope.
///
/// Strings without `{{` come back unchanged as JSON strings.
pub fn evaluate(context: &ResolutionContext, raw: &str) -> Result<Value> {
    if !is_templated(raw) {
        return Ok(Value::String(raw.to_string()));
    }

    if let Some(captures) = reference_regex().captures(raw.trim()) {
        let name = &captures[1];
        trace!(reference = name, "evaluating direct template reference");
        return context
            .lookup(name)
            .cloned()
            .map_err(|_| ConfigError::template(raw, format!("unknown reference '{name}'")));
    }

    render(raw, context.scope()).map(Value::String)
}

/// Render `raw` with liquid against `scope`.
pub fn render(raw: &str, scope: &Map<String, Value>) -> Result<String> {
    let template = parser()?
        .parse(raw)
        .map_err(|e| ConfigError::template(raw, e.to_string()))?;
    template
        .render(&to_liquid_object(scope))
        .map_err(|e| ConfigError::template(raw, e.to_string()))
}

/// Convert scope bindings to a liquid object for rendering.
pub fn to_liquid_object(scope: &Map<String, Value>) -> liquid::Object {
    let mut object = liquid::Object::new();
    for (key, value) in scope {
        object.insert(
            key.clone().into(),
            liquid::model::to_value(value).unwrap_or(liquid::model::Value::Nil),
        );
    }
    object
}
