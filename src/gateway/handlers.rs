//! Transaction endpoint handler

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{State, rejection::BytesRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::state::AppState;
use crate::transaction::{PipelineError, RenderedResponse};

/// Submit a fund-transfer transaction
///
/// PUT (or POST, per config) /v1/transactions
///
/// The body is taken as raw bytes so that malformed JSON goes through the
/// pipeline's error path instead of an extractor rejection. A body axum
/// refuses to buffer (over the body limit, aborted upload) is rendered
/// through the same template.
pub async fn process_transaction(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match body {
        Ok(body) => state.pipeline.process(&body).await.into_response(),
        Err(rejection) => {
            tracing::warn!(
                status = %rejection.status(),
                "Request body rejected: {}",
                rejection.body_text()
            );
            state
                .pipeline
                .reject(PipelineError::SchemaViolation(format!(
                    "Unable to read request body: {}",
                    rejection.body_text()
                )))
                .into_response()
        }
    }
}

impl IntoResponse for RenderedResponse {
    /// Builds a fresh response: status, body and `Content-Type` only.
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        response.headers_mut().clear();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    }
}
