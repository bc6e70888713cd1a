//! Schema Validator
//!
//! Compiles the transaction JSON schema once at startup and checks raw
//! request bodies against it before any datastore work happens.

use jsonschema::{Draft, Validator};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::error::PipelineError;

/// Schema document could not be loaded or compiled
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    #[error("Failed to read schema {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid schema: {0}")]
    Compile(String),
}

pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    /// Load and compile a schema document from disk
    pub fn load(path: &Path) -> Result<Self, SchemaLoadError> {
        let content = fs::read_to_string(path).map_err(|source| SchemaLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let schema: Value =
            serde_json::from_str(&content).map_err(|source| SchemaLoadError::Json {
                path: path.display().to_string(),
                source,
            })?;
        let validator = Self::from_schema(&schema)?;
        tracing::info!(schema = %path.display(), "Transaction schema compiled");
        Ok(validator)
    }

    pub fn from_schema(schema: &Value) -> Result<Self, SchemaLoadError> {
        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(schema)
            .map_err(|err| SchemaLoadError::Compile(err.to_string()))?;
        Ok(Self { validator })
    }

    /// Parse `body` and check it against the schema.
    ///
    /// All violations are reported, joined with `"; "`.
    pub fn validate(&self, body: &[u8]) -> Result<Value, PipelineError> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| PipelineError::SchemaViolation(format!("Malformed JSON payload: {}", e)))?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&document)
            .map(|err| err.to_string())
            .collect();

        if violations.is_empty() {
            Ok(document)
        } else {
            Err(PipelineError::SchemaViolation(violations.join("; ")))
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Same constraints as `config/schema/transaction.schema.json`
    pub(crate) fn transaction_schema() -> Value {
        serde_json::json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["service", "name", "amount", "account", "reference"],
            "properties": {
                "service": { "type": "string", "minLength": 1, "maxLength": 64 },
                "name": { "type": "string", "minLength": 1, "maxLength": 255 },
                "amount": { "type": "number", "exclusiveMinimum": 0 },
                "account": { "type": "string", "minLength": 1, "maxLength": 64 },
                "reference": { "type": "string", "minLength": 1, "maxLength": 128 }
            },
            "additionalProperties": false
        })
    }

    pub(crate) fn validator() -> SchemaValidator {
        SchemaValidator::from_schema(&transaction_schema()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::validator;
    use super::*;

    #[test]
    fn test_valid_payload_passes() {
        let body = br#"{"service":"wire","name":"A","amount":100,"account":"123","reference":"R1"}"#;
        let doc = validator().validate(body).unwrap();
        assert_eq!(doc["reference"], "R1");
    }

    #[test]
    fn test_missing_amount_rejected() {
        let body = br#"{"service":"wire","name":"A","account":"123","reference":"R1"}"#;
        match validator().validate(body) {
            Err(PipelineError::SchemaViolation(msg)) => assert!(msg.contains("amount"), "{}", msg),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_rejected() {
        let body = br#"{"service":"wire","name":"A","amount":"lots","account":"123","reference":"R1"}"#;
        match validator().validate(body) {
            Err(PipelineError::SchemaViolation(msg)) => assert!(msg.contains("lots"), "{}", msg),
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[test]
    fn test_all_violations_joined() {
        let body = br#"{"service":"","name":"A","amount":-1,"account":"123","reference":"R1"}"#;
        let err = validator().validate(body).unwrap_err();
        let msg = err.to_string();
        assert_eq!(msg.split("; ").count(), 2, "{}", msg);
    }

    #[test]
    fn test_overlong_reference_rejected() {
        let body = format!(
            r#"{{"service":"wire","name":"A","amount":100,"account":"123","reference":"{}"}}"#,
            "R".repeat(129)
        );
        assert!(matches!(
            validator().validate(body.as_bytes()),
            Err(PipelineError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_fixture_matches_shipped_schema() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/schema/transaction.schema.json");
        let shipped: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        let fixture = super::fixtures::transaction_schema();
        assert_eq!(fixture["properties"], shipped["properties"]);
        assert_eq!(fixture["required"], shipped["required"]);
    }

    #[test]
    fn test_malformed_json_is_schema_violation() {
        let err = validator().validate(b"{not json").unwrap_err();
        assert!(matches!(err, PipelineError::SchemaViolation(ref m) if m.starts_with("Malformed JSON payload")));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = serde_json::json!({ "type": 42 });
        assert!(matches!(
            SchemaValidator::from_schema(&schema),
            Err(SchemaLoadError::Compile(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SchemaValidator::load(Path::new("missing/schema.json")),
            Err(SchemaLoadError::Read { .. })
        ));
    }

    #[test]
    fn test_load_shipped_schema() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/schema/transaction.schema.json");
        let validator = SchemaValidator::load(&path).unwrap();
        let body = br#"{"service":"wire","name":"A","amount":100,"account":"123","reference":"R1"}"#;
        assert!(validator.validate(body).is_ok());
        assert!(validator.validate(br#"{"service":"wire"}"#).is_err());
    }
}
