//! Response Renderer
//!
//! Renders an [`Outcome`] into the JSON response body. The template is a JSON
//! document loaded once at startup; string values may contain the
//! `${status}` and `${message}` placeholders. Substitution happens on parsed
//! string values, so the message never needs manual escaping and can never
//! break the document structure.

use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::types::{Outcome, RenderedResponse};

const STATUS_PLACEHOLDER: &str = "${status}";
const MESSAGE_PLACEHOLDER: &str = "${message}";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Template is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template must reference {0}")]
    MissingPlaceholder(&'static str),
}

/// Parsed response template, shared read-only by all requests
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    document: Value,
}

impl ResponseTemplate {
    /// `{"status": "<code>", "message": "<text>"}`
    pub fn builtin() -> Self {
        Self {
            document: serde_json::json!({
                "status": STATUS_PLACEHOLDER,
                "message": MESSAGE_PLACEHOLDER,
            }),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let template = Self::parse(&content)?;
        tracing::info!(template = %path.display(), "Response template loaded");
        Ok(template)
    }

    pub fn parse(content: &str) -> Result<Self, TemplateError> {
        let document: Value = serde_json::from_str(content)?;
        for placeholder in [STATUS_PLACEHOLDER, MESSAGE_PLACEHOLDER] {
            if !references(&document, placeholder) {
                return Err(TemplateError::MissingPlaceholder(placeholder));
            }
        }
        Ok(Self { document })
    }

    pub fn render(&self, outcome: &Outcome) -> RenderedResponse {
        let status = outcome.status.to_string();
        let mut document = self.document.clone();
        substitute(&mut document, &status, &outcome.message);

        let body = serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string());
        RenderedResponse {
            body,
            http_status: outcome.http_status,
        }
    }
}

fn references(value: &Value, placeholder: &str) -> bool {
    match value {
        Value::String(s) => s.contains(placeholder),
        Value::Array(items) => items.iter().any(|v| references(v, placeholder)),
        Value::Object(map) => map.values().any(|v| references(v, placeholder)),
        _ => false,
    }
}

fn substitute(value: &mut Value, status: &str, message: &str) {
    match value {
        Value::String(s) => *s = fill(s, status, message),
        Value::Array(items) => items
            .iter_mut()
            .for_each(|v| substitute(v, status, message)),
        Value::Object(map) => map
            .values_mut()
            .for_each(|v| substitute(v, status, message)),
        _ => {}
    }
}

/// Message text is inserted last and never rescanned, so a message that
/// itself contains `${status}` is rendered literally.
fn fill(text: &str, status: &str, message: &str) -> String {
    text.split(MESSAGE_PLACEHOLDER)
        .map(|part| part.replace(STATUS_PLACEHOLDER, status))
        .collect::<Vec<_>>()
        .join(message)
}
