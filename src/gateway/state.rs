use std::sync::Arc;

use crate::transaction::TransactionPipeline;

/// Gateway application state (shared across requests)
///
/// The pipeline is the only thing handlers need; the datastore pool lives
/// inside its repository.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TransactionPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<TransactionPipeline>) -> Self {
        Self { pipeline }
    }
}
