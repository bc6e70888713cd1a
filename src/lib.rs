//! Fund Transfer API
//!
//! Accepts fund-transfer records on `/v1/transactions`, validates them against
//! a JSON schema, inserts them transactionally into PostgreSQL and answers
//! with a templated `{"status", "message"}` body.
//!
//! # Modules
//!
//! - [`config`] - YAML configuration (gateway, pipeline, database, logging)
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - PostgreSQL pool and table bootstrap
//! - [`transaction`] - Validation, repository, classification, rendering, pipeline
//! - [`gateway`] - axum router and server

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod transaction;

// Convenient re-exports at crate root
pub use config::{AppConfig, ConfigError, RouteMethod, TransactionMode};
pub use transaction::{
    Outcome, OutcomeStatus, PipelineError, RenderedResponse, ResponseTemplate, SchemaValidator,
    TransactionPipeline, TransactionRepository, TransactionRequest,
};
