//! Pipeline Error Types
//!
//! Every failure the pipeline can observe, as a value. The classifier is a
//! pure function over these variants.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Payload is not JSON or does not conform to the transaction schema
    #[error("{0}")]
    SchemaViolation(String),

    /// Unique constraint on `reference` rejected the insert
    #[error("duplicate reference: {0}")]
    DuplicateKey(String),

    /// Any other datastore failure, driver message kept verbatim
    #[error("{0}")]
    Persistence(String),

    /// Catch-all (parse failures after validation, panics)
    #[error("{0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::SchemaViolation(_) => "SCHEMA_VIOLATION",
            PipelineError::DuplicateKey(_) => "DUPLICATE_KEY",
            PipelineError::Persistence(_) => "PERSISTENCE_ERROR",
            PipelineError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                PipelineError::DuplicateKey(db_err.message().to_string())
            }
            Some(db_err) => PipelineError::Persistence(db_err.message().to_string()),
            None => PipelineError::Persistence(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Unexpected(format!("Unable to read transaction: {}", e))
    }
}
