//! HTTP server mode: the fetch pipeline behind a handful of routes

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::FetchOutcome;
use crate::error::{Error, Result};
use crate::pagination::{PageFetcher, PageSource};
use crate::service::{FetchOverrides, FetchService};
use crate::stream::StreamTransport;

/// App state shared across handlers
pub struct AppState<S = PageFetcher> {
    service: FetchService<S>,
    transport: StreamTransport,
}

impl<S: PageSource> AppState<S> {
    /// Create handler state
    pub fn new(service: FetchService<S>, transport: StreamTransport) -> Self {
        Self { service, transport }
    }
}

/// Build the router
pub fn router<S: PageSource + 'static>(state: AppState<S>) -> Router {
    // Allow all origins, the browser client may be served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/patients/stream", get(stream_patients::<S>))
        .route("/patients/onechunk", get(one_chunk::<S>))
        .route("/patients/all", get(all_patients::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: AppConfig) -> Result<()> {
    let service = FetchService::from_config(&config)?;
    let transport = StreamTransport::new(config.server.chunk_buffer);
    let app = router(AppState::new(service, transport));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Other(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Stream every page as its own JSON array
async fn stream_patients<S: PageSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(overrides): Query<FetchOverrides>,
) -> Response {
    let (mut session, chunks) = state.transport.open();
    let session_id = session.id();
    info!(session = session_id, "Opened stream session");

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let outcome = task_state
            .service
            .fetch_streaming(&overrides, &mut session)
            .await;
        if let FetchOutcome::Failed(failure) = &outcome {
            // Headers are long gone; the client sees a truncated stream
            warn!(
                session = session_id,
                code = failure.code,
                "Stream ended early: {}",
                failure.details
            );
        }
        session.close();
    });

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(chunks),
    )
        .into_response()
}

/// First page only
async fn one_chunk<S: PageSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(overrides): Query<FetchOverrides>,
) -> Response {
    collected_response(state.service.fetch_one_page(&overrides).await)
}

/// Every page, collected into one array
async fn all_patients<S: PageSource + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(overrides): Query<FetchOverrides>,
) -> Response {
    collected_response(state.service.fetch_all(&overrides).await)
}

fn collected_response(outcome: FetchOutcome) -> Response {
    match outcome.into_result() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(failure) => (failure_status(failure.code), Json(failure)).into_response(),
    }
}

fn failure_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code)
        .ok()
        .filter(|status| status.is_client_error() || status.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{FetchConfig, Page, PageRequest};
    use async_trait::async_trait;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use test_case::test_case;
    use tower::ServiceExt;

    /// Numbered records, optionally failing at one offset
    struct FakeSource {
        total: u64,
        fail_at: Option<u64>,
    }

    #[async_trait]
    impl PageSource for FakeSource {
        async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>> {
            if self.fail_at == Some(request.offset) {
                return Err(Error::upstream(503, "Service Unavailable"));
            }
            let end = (request.offset + u64::from(request.limit)).min(self.total);
            let records = (request.offset..end).map(|i| json!({ "id": i })).collect();
            Ok(Some(Page::new(request.offset, request.limit, records)))
        }
    }

    fn app(total: u64, fail_at: Option<u64>) -> Router {
        let service = FetchService::new(
            FakeSource { total, fail_at },
            FetchConfig::new().with_page_size(10),
        );
        router(AppState::new(service, StreamTransport::new(2)))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, body.to_vec())
    }

    #[test_case(200, 502 ; "success status is not a failure")]
    #[test_case(301, 502 ; "redirect becomes bad gateway")]
    #[test_case(404, 404 ; "client error kept")]
    #[test_case(503, 503 ; "server error kept")]
    #[test_case(0, 502 ; "invalid code")]
    fn test_failure_status(code: u16, expected: u16) {
        assert_eq!(failure_status(code).as_u16(), expected);
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get(app(0, None), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"status": "ok"})
        );
    }

    #[tokio::test]
    async fn test_all_returns_every_record() {
        let (status, _, body) = get(app(25, None), "/patients/all").await;
        assert_eq!(status, StatusCode::OK);

        let records: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(records.len(), 25);
        assert_eq!(records[24], json!({"id": 24}));
    }

    #[tokio::test]
    async fn test_onechunk_returns_first_page() {
        let (status, _, body) = get(app(25, None), "/patients/onechunk").await;
        assert_eq!(status, StatusCode::OK);

        let records: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(records.len(), 10);
    }

    #[tokio::test]
    async fn test_query_overrides_apply() {
        let (_, _, body) = get(app(25, None), "/patients/onechunk?page_size=3").await;
        let records: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_collect_failure_uses_upstream_status() {
        let (status, _, body) = get(app(25, Some(10)), "/patients/all").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let failure: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(failure["error"], "upstream_error");
        assert_eq!(failure["message"], "Error status 503");
        assert_eq!(failure["code"], 503);
    }

    #[tokio::test]
    async fn test_invalid_override_is_bad_request() {
        let (status, _, body) = get(app(25, None), "/patients/all?page_size=0").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let failure: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(failure["code"], 400);
    }

    #[tokio::test]
    async fn test_stream_writes_one_array_per_page() {
        let (status, content_type, body) = get(app(25, None), "/patients/stream").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));

        let arrays: Vec<Vec<Value>> = serde_json::Deserializer::from_slice(&body)
            .into_iter()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        let sizes: Vec<usize> = arrays.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[tokio::test]
    async fn test_stream_failure_keeps_delivered_pages() {
        let (status, _, body) = get(app(25, Some(20)), "/patients/stream").await;
        assert_eq!(status, StatusCode::OK);

        let arrays: Vec<Vec<Value>> = serde_json::Deserializer::from_slice(&body)
            .into_iter()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[1][9], json!({"id": 19}));
    }
}
