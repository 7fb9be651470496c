//! Router construction and server host for the API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, MatchedPath, State},
    http::{Method, Request, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use rtgate_multicall::Rtorrent;
use rtgate_telemetry::{Metrics, build_sha};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::error::{ApiServerError, ApiServerResult};
use crate::http::errors::ApiError;
use crate::http::constants::{HEADER_REQUEST_ID, MAX_UPLOAD_BYTES};
use crate::http::handlers::{load, methods, ping, system, throttle, torrent_action, view};
use crate::http::health::{health, metrics};
use crate::http::telemetry::HttpMetricsLayer;
use crate::state::ApiState;

/// Default bound on a single request, upstream round trip included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for the HTTP host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// Bound on one request; exceeding it yields 408.
    pub request_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Axum router wrapper that hosts the bridge API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server around the rTorrent facade and the shared metrics registry.
    #[must_use]
    pub fn new(rtorrent: Rtorrent, telemetry: Metrics, options: ServerOptions) -> Self {
        let state = Arc::new(ApiState::new(rtorrent, telemetry));
        Self::with_state(state, options)
    }

    pub(crate) fn with_state(state: Arc<ApiState>, options: ServerOptions) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]);
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let route = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map_or_else(|| request.uri().path(), MatchedPath::as_str)
                    .to_string();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %route,
                    request_id = %request_id,
                    build_sha = %build_sha(),
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_request(|_request: &Request<_>, _span: &Span| {})
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    span.record("status_code", response.status().as_u16());
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );
        let layered = ServiceBuilder::new()
            .layer(rtgate_telemetry::set_request_id_layer())
            .layer(rtgate_telemetry::propagate_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(state.telemetry.clone()));

        let router = Self::build_router()
            .layer(middleware::from_fn_with_state(
                options.request_timeout,
                enforce_deadline,
            ))
            .layer(cors_layer)
            .route_layer(layered)
            .with_state(state);

        Self { router }
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .nest("/api", Self::api_routes())
            .route("/health", get(health))
            .route("/metrics", get(metrics))
    }

    fn api_routes() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/ping", get(ping))
            .route("/view/{view}", get(view))
            .route("/system", get(system))
            .route("/methods", get(methods))
            .route("/throttle", post(throttle))
            .route(
                "/load",
                post(load).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )
            .route(
                "/torrent/{hash}/{action}",
                get(torrent_action).post(torrent_action),
            )
    }

    /// Serve the API on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> ApiServerResult<()> {
        tracing::info!("Starting API on {}", addr);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ApiServerError::Bind { addr, source })?;
        axum::serve(listener, self.router.into_make_service())
            .await
            .map_err(|source| ApiServerError::Serve { source })
    }

    #[cfg(test)]
    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Answers 408 with the error envelope once `limit` elapses.
async fn enforce_deadline(
    State(limit): State<Duration>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(limit_ms = %limit.as_millis(), "request deadline exceeded");
            ApiError::request_timeout(limit).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::{FakeClient, state_with};
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use rtgate_multicall::RpcValue;
    use serde_json::Value;
    use tower::ServiceExt;

    fn server() -> (ApiServer, Arc<ApiState>) {
        let state = state_with(FakeClient::answering(RpcValue::Array(Vec::new())));
        (
            ApiServer::with_state(state.clone(), ServerOptions::default()),
            state,
        )
    }

    #[tokio::test]
    async fn ping_route_answers_and_is_counted() -> anyhow::Result<()> {
        let (server, state) = server();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(HEADER_REQUEST_ID));
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "pong");

        let rendered = state
            .telemetry
            .render()
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
        assert!(rendered.contains("route=\"/api/ping\""));
        Ok(())
    }

    #[tokio::test]
    async fn request_id_is_generated_when_absent() -> anyhow::Result<()> {
        let (server, _) = server();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/health").body(Body::empty())?)
            .await?;
        let generated = response
            .headers()
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(!generated.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn slow_requests_time_out_with_error_envelope() -> anyhow::Result<()> {
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(middleware::from_fn_with_state(
                Duration::from_millis(20),
                enforce_deadline,
            ));
        let response = app
            .oneshot(Request::builder().uri("/slow").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "request exceeded 20ms");
        Ok(())
    }

    #[tokio::test]
    async fn request_id_is_propagated() -> anyhow::Result<()> {
        let (server, _) = server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(HEADER_REQUEST_ID, "req-7")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response
                .headers()
                .get(HEADER_REQUEST_ID)
                .and_then(|value| value.to_str().ok()),
            Some("req-7")
        );
        Ok(())
    }

    #[tokio::test]
    async fn unknown_action_is_not_found_with_error_envelope() -> anyhow::Result<()> {
        let (server, _) = server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/torrent/HASH/explode")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
        assert_eq!(body["status"], "error");
        Ok(())
    }

    #[tokio::test]
    async fn view_route_returns_torrents() -> anyhow::Result<()> {
        let (server, _) = server();
        let response = server
            .router()
            .oneshot(Request::builder().uri("/api/view/main").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await?)?;
        assert_eq!(body["torrents"], Value::Array(Vec::new()));
        Ok(())
    }

    #[tokio::test]
    async fn cors_preflight_is_permitted() -> anyhow::Result<()> {
        let (server, _) = server();
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/throttle")
                    .header("origin", "http://ui.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );
        Ok(())
    }
}
