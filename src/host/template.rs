//! Minimal `{{ ... }}` template renderer for the built-in `tpl` extension.
//!
//! Supported expressions:
//!
//! | Expression                          | Result                               |
//! |-------------------------------------|--------------------------------------|
//! | `{{ title }}`, `{{ site.name }}`    | value from template data, or ""      |
//! | `{{ partial "header" }}`            | `partial("header")`                  |
//! | `{{ partial "card" {"t": "X"} }}`   | `partial("card", {"t": "X"})`        |
//!
//! Documents without the template extension are returned verbatim.

use super::{Document, RenderContext, Renderer, TemplateData};
use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{\s*(.*?)\s*\}\}").unwrap());

static PARTIAL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^partial\s+"([^"]+)"\s*(.*)$"#).unwrap());

/// Template evaluation errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid data for partial `{name}`")]
    InvalidArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("data for partial `{0}` must be a JSON object")]
    NotAnObject(String),

    #[error("partial `{0}` requested but no partial helper is installed")]
    NoHelper(String),
}

/// Renderer for documents carrying the template extension.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    extension: String,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new("tpl")
    }
}

impl TemplateRenderer {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// Expand every `{{ ... }}` expression in `source`.
    pub fn evaluate(&self, source: &str, context: &RenderContext) -> Result<String, TemplateError> {
        let mut output = String::with_capacity(source.len());
        let mut last = 0;

        for caps in EXPRESSION.captures_iter(source) {
            let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            output.push_str(&source[last..whole.start()]);
            output.push_str(&expand(expr.as_str(), context)?);
            last = whole.end();
        }

        output.push_str(&source[last..]);
        Ok(output)
    }
}

#[async_trait]
impl Renderer for TemplateRenderer {
    async fn render(&self, document: &Document, context: RenderContext) -> Result<String> {
        if !document.has_extension(&self.extension) {
            return Ok(document.content.clone());
        }
        Ok(self.evaluate(&document.content, &context)?)
    }
}

fn expand(expr: &str, context: &RenderContext) -> Result<String, TemplateError> {
    let Some(call) = PARTIAL_CALL.captures(expr) else {
        return Ok(lookup(&context.data, expr).map(display_value).unwrap_or_default());
    };

    let name = &call[1];
    let args = call[2].trim();
    let data = if args.is_empty() {
        None
    } else {
        let value: Value =
            serde_json::from_str(args).map_err(|source| TemplateError::InvalidArguments {
                name: name.to_owned(),
                source,
            })?;
        match value {
            Value::Object(map) => Some(map),
            _ => return Err(TemplateError::NotAnObject(name.to_owned())),
        }
    };

    let helper = context
        .helper
        .as_ref()
        .ok_or_else(|| TemplateError::NoHelper(name.to_owned()))?;
    Ok(helper.partial(name, data, &context.data))
}

/// Resolve a dotted path (`site.name`) against the template data.
fn lookup<'a>(data: &'a TemplateData, path: &str) -> Option<&'a Value> {
    let mut keys = path.split('.');
    let first = data.get(keys.next()?)?;
    keys.try_fold(first, |value, key| value.get(key))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
