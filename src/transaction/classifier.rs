//! Error Classifier
//!
//! Maps a pipeline failure to its (status, message, HTTP code) outcome.
//!
//! | Error            | status | message                           | HTTP |
//! |------------------|--------|-----------------------------------|------|
//! | DuplicateKey     | 601    | fixed duplicate-reference text    | 500  |
//! | Persistence      | 601    | driver message                    | 500  |
//! | SchemaViolation  | 601    | validation detail                 | 500  |
//! | Unexpected       | 601    | underlying message                | 500  |
//!
//! A duplicate reference is client-caused and would conventionally be a 409.
//! The 500 is kept because existing clients depend on it.

use super::error::PipelineError;
use super::types::{DUPLICATE_REFERENCE_MESSAGE, Outcome};

pub fn classify(error: &PipelineError) -> Outcome {
    match error {
        PipelineError::DuplicateKey(_) => Outcome::failure(DUPLICATE_REFERENCE_MESSAGE),
        PipelineError::Persistence(msg)
        | PipelineError::SchemaViolation(msg)
        | PipelineError::Unexpected(msg) => Outcome::failure(msg.clone()),
    }
}
