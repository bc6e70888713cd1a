//! Fund-transfer intake pipeline
//!
//! Schema validation → transactional insert → error classification →
//! response rendering for `/v1/transactions`.
//!
//! # Modules
//!
//! - [`types`] - Request payload, outcome codes and rendered response
//! - [`error`] - Failure kinds flowing through the pipeline
//! - [`validator`] - JSON schema validation of raw bodies
//! - [`repository`] - Transactional insert behind a trait seam
//! - [`classifier`] - Failure → (status, message, HTTP code)
//! - [`template`] - JSON response template rendering
//! - [`pipeline`] - The per-request state machine

pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod repository;
pub mod template;
pub mod types;
pub mod validator;

pub use classifier::classify;
pub use error::PipelineError;
pub use pipeline::{PipelineStage, TransactionPipeline};
pub use repository::{PgTransactionRepository, TransactionRepository};
pub use template::{ResponseTemplate, TemplateError};
pub use types::{
    DUPLICATE_REFERENCE_MESSAGE, Outcome, OutcomeStatus, RenderedResponse, SUCCESS_MESSAGE,
    TransactionRequest,
};
pub use validator::{SchemaLoadError, SchemaValidator};
