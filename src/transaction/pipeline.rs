//! Transaction Pipeline
//!
//! ```text
//! Received ──▶ Validating ──▶ Inserting ──▶ Succeeded ──┐
//!                  │              │                      ├──▶ Rendered
//!                  └──────────────┴──────▶ Failed ───────┘
//! ```
//!
//! Every request ends in `Rendered`, exactly once. Errors and panics raised
//! while validating or inserting are turned into a `Failed` outcome here and
//! never reach the HTTP framework.

use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use uuid::Uuid;

use super::classifier::classify;
use super::error::PipelineError;
use super::repository::TransactionRepository;
use super::template::ResponseTemplate;
use super::types::{Outcome, RenderedResponse, TransactionRequest};
use super::validator::SchemaValidator;

/// Pipeline stages for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Received,
    Validating,
    Inserting,
    Succeeded,
    Failed,
    Rendered,
}

impl PipelineStage {
    pub fn can_transition_to(&self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        matches!(
            (*self, next),
            (Received, Validating)
                | (Validating, Inserting)
                | (Validating, Failed)
                | (Inserting, Succeeded)
                | (Inserting, Failed)
                | (Succeeded, Rendered)
                | (Failed, Rendered)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "RECEIVED",
            PipelineStage::Validating => "VALIDATING",
            PipelineStage::Inserting => "INSERTING",
            PipelineStage::Succeeded => "SUCCEEDED",
            PipelineStage::Failed => "FAILED",
            PipelineStage::Rendered => "RENDERED",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request stage tracker
struct StageTracker {
    request_id: Uuid,
    stage: PipelineStage,
}

impl StageTracker {
    fn new(request_id: Uuid) -> Self {
        Self {
            request_id,
            stage: PipelineStage::Received,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "invalid pipeline transition {} -> {}",
            self.stage,
            next
        );
        tracing::debug!(request_id = %self.request_id, "{} -> {}", self.stage, next);
        self.stage = next;
    }
}

/// Validate → insert → classify → render, for one request at a time.
///
/// Holds no per-request state; one instance is shared by all concurrent
/// requests behind an `Arc`.
pub struct TransactionPipeline {
    validator: Arc<SchemaValidator>,
    repository: Arc<dyn TransactionRepository>,
    template: Arc<ResponseTemplate>,
}

impl TransactionPipeline {
    pub fn new(
        validator: Arc<SchemaValidator>,
        repository: Arc<dyn TransactionRepository>,
        template: Arc<ResponseTemplate>,
    ) -> Self {
        Self {
            validator,
            repository,
            template,
        }
    }

    /// Run one request body through the pipeline. Never fails: every error
    /// is rendered into the response.
    pub async fn process(&self, body: &[u8]) -> RenderedResponse {
        let mut tracker = StageTracker::new(Uuid::new_v4());

        let result = AssertUnwindSafe(self.execute(body, &mut tracker))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                tracker.advance(PipelineStage::Succeeded);
                Outcome::success()
            }
            Ok(Err(err)) => {
                tracker.advance(PipelineStage::Failed);
                tracing::debug!(request_id = %tracker.request_id, kind = err.kind(), "Pipeline failed");
                classify(&err)
            }
            Err(panic) => {
                // A panic may leave the tracker mid-transition; force Failed
                tracker.stage = PipelineStage::Failed;
                classify(&PipelineError::Unexpected(panic_message(panic)))
            }
        };

        self.finish(tracker, outcome)
    }

    /// Render a request whose body never reached the validator, e.g. one
    /// the transport refused to buffer. Goes `Validating -> Failed`.
    pub fn reject(&self, err: PipelineError) -> RenderedResponse {
        let mut tracker = StageTracker::new(Uuid::new_v4());
        tracker.advance(PipelineStage::Validating);
        tracing::info!("Validating request - {}", tracker.request_id);

        tracker.advance(PipelineStage::Failed);
        tracing::debug!(request_id = %tracker.request_id, kind = err.kind(), "Request body rejected");
        let outcome = classify(&err);
        self.finish(tracker, outcome)
    }

    fn finish(&self, mut tracker: StageTracker, outcome: Outcome) -> RenderedResponse {
        let rendered = self.template.render(&outcome);
        tracker.advance(PipelineStage::Rendered);

        if outcome.status.is_success() {
            tracing::info!(request_id = %tracker.request_id, "Transaction stored");
        } else {
            tracing::error!(request_id = %tracker.request_id, "Error: {}", rendered.body);
        }
        rendered
    }

    async fn execute(&self, body: &[u8], tracker: &mut StageTracker) -> Result<(), PipelineError> {
        tracker.advance(PipelineStage::Validating);
        tracing::info!("Validating request - {}", tracker.request_id);
        let document = self.validator.validate(body)?;

        tracker.advance(PipelineStage::Inserting);
        let request: TransactionRequest = serde_json::from_value(document)?;
        tracing::info!(
            request_id = %tracker.request_id,
            repository = self.repository.name(),
            "Inserting new transaction: {}",
            request
        );
        self.repository.insert(&request).await
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Unexpected internal error".to_string()
    }
}
