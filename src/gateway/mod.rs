pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{MethodRouter, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{GatewayConfig, RouteMethod};
use crate::transaction::TransactionPipeline;
use state::AppState;

pub const TRANSACTIONS_PATH: &str = "/v1/transactions";

fn transaction_route(method: RouteMethod) -> MethodRouter<Arc<AppState>> {
    match method {
        RouteMethod::Put => put(handlers::process_transaction),
        RouteMethod::Post => post(handlers::process_transaction),
    }
}

/// Build the router: one endpoint, one verb
pub fn router(pipeline: Arc<TransactionPipeline>, method: RouteMethod) -> Router {
    let state = Arc::new(AppState::new(pipeline));
    Router::new()
        .route(TRANSACTIONS_PATH, transaction_route(method))
        .with_state(state)
}

/// Start HTTP Gateway server
///
/// Returns only when the listener fails to bind or the server stops.
pub async fn run_server(
    config: &GatewayConfig,
    pipeline: Arc<TransactionPipeline>,
) -> std::io::Result<()> {
    let app = router(pipeline, config.method);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        );
        e
    })?;

    tracing::info!(
        "Gateway listening on http://{} ({:?} {})",
        addr,
        config.method,
        TRANSACTIONS_PATH
    );

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::repository::mock::MockRepository;
    use crate::transaction::validator::fixtures;
    use crate::transaction::ResponseTemplate;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    const VALID: &str =
        r#"{"service":"wire","name":"A","amount":100,"account":"123","reference":"R1"}"#;

    fn app(method: RouteMethod) -> (Router, Arc<MockRepository>) {
        let repo = Arc::new(MockRepository::new());
        let pipeline = Arc::new(TransactionPipeline::new(
            Arc::new(fixtures::validator()),
            repo.clone(),
            Arc::new(ResponseTemplate::builtin()),
        ));
        (router(pipeline, method), repo)
    }

    fn request(method: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(TRANSACTIONS_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-request-trace", "abc")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_clean_json_headers(response: &Response) {
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        for name in response.headers().keys() {
            assert!(
                name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH,
                "unexpected header leaked: {}",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_put_success_then_duplicate() {
        let (app, repo) = app(RouteMethod::Put);

        let first = app.clone().oneshot(request("PUT", VALID)).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_clean_json_headers(&first);
        let body = response_json(first).await;
        assert_eq!(body["status"], "600");
        assert_eq!(body["message"], "Transaction processed successfully.");

        let second = app.oneshot(request("PUT", VALID)).await.unwrap();
        assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_clean_json_headers(&second);
        let body = response_json(second).await;
        assert_eq!(body["status"], "601");
        assert_eq!(
            body["message"],
            "Duplicate reference received, try with another one."
        );
        assert_eq!(repo.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_json_500() {
        let (app, repo) = app(RouteMethod::Put);
        let response = app
            .oneshot(request("PUT", r#"{"service":"wire"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_clean_json_headers(&response);
        assert_eq!(response_json(response).await["status"], "601");
        assert_eq!(repo.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_json_500() {
        let (app, _) = app(RouteMethod::Put);
        let response = app.oneshot(request("PUT", "{{{")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_clean_json_headers(&response);
    }

    #[tokio::test]
    async fn test_oversized_body_is_json_500() {
        let (app, repo) = app(RouteMethod::Put);
        // Valid shape, but past axum's 2 MB default body limit
        let padding = "x".repeat(3 * 1024 * 1024);
        let body = format!(
            r#"{{"service":"wire","name":"{}","amount":100,"account":"123","reference":"R1"}}"#,
            padding
        );

        let response = app.oneshot(request("PUT", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_clean_json_headers(&response);
        let body = response_json(response).await;
        assert_eq!(body["status"], "601");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .starts_with("Unable to read request body"),
            "{}",
            body
        );
        assert_eq!(repo.insert_calls(), 0);
    }

    #[tokio::test]
    async fn test_only_configured_verb_mounted() {
        let (put_app, _) = app(RouteMethod::Put);
        let response = put_app.oneshot(request("POST", VALID)).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let (post_app, repo) = app(RouteMethod::Post);
        let response = post_app.oneshot(request("POST", VALID)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(repo.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let (app, _) = app(RouteMethod::Put);
        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/v1/accounts")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
