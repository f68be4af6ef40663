//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router (health endpoint + catch-all dispatch)
//! - Wire up middleware (tracing, request ID)
//! - Bind the server to a listener and drain it on shutdown
//! - Dispatch requests against the active routing generation
//! - Map forwarding failures to gateway status codes
//!
//! # Design Decisions
//! - Dispatch reads the active generation exactly once per request; a
//!   reload mid-request cannot split a lookup across two configs
//! - Route misses are 404, registry misses are 503, backend failures and
//!   deadline overruns are 502
//! - Per-route deadlines wrap the forward call; no global request timeout

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::config::schema::GatewayConfig;
use crate::http::generation::{GenerationError, RoutingGeneration};
use crate::http::reload::ReloadCoordinator;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::observability::metrics;
use crate::proxy::service::ProxyError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub active: Arc<ArcSwap<RoutingGeneration>>,
}

/// The reverse-proxy gateway.
pub struct Gateway {
    state: AppState,
}

impl Gateway {
    /// Build the initial routing generation from a validated config.
    ///
    /// A config that cannot be compiled is fatal here; once the gateway is
    /// serving, the same failure only rejects the offending reload.
    pub fn new(config: &GatewayConfig) -> Result<Self, GenerationError> {
        let generation = RoutingGeneration::build(&config.services)?;
        tracing::info!(
            services = generation.proxies.len(),
            routes = generation.table.len(),
            "Routing generation compiled"
        );

        Ok(Self {
            state: AppState {
                active: Arc::new(ArcSwap::from_pointee(generation)),
            },
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(self.state.clone())
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the gateway, accepting connections on the given listener.
    ///
    /// Config updates arriving on `config_updates` swap the active
    /// generation without interrupting traffic. The server drains in-flight
    /// connections once `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Gateway listening");

        let coordinator = ReloadCoordinator::new(self.state.active.clone());
        tokio::spawn(coordinator.run(config_updates, shutdown.resubscribe()));

        let app = self.build_router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}

/// Liveness endpoint, never proxied.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Main dispatch handler: match, resolve, forward.
async fn dispatch_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().unwrap_or("unknown").to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    // One consistent snapshot for the whole request.
    let generation = state.active.load_full();

    let Some(binding) = generation.table.match_route(&method, &path) else {
        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "No route matched"
        );
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    let Some(proxy) = generation.proxies.get(&binding.service) else {
        tracing::error!(
            request_id = %request_id,
            service = %binding.service,
            "Route bound to a service missing from the registry"
        );
        metrics::record_request(method.as_str(), 503, &binding.service, start_time);
        return (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable").into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        service = %binding.service,
        pattern = %binding.pattern,
        "Dispatching request"
    );

    let result = match binding.timeout {
        Some(limit) => {
            match tokio::time::timeout(limit, proxy.forward(request, binding.strip_path)).await {
                Ok(result) => result,
                Err(_) => Err(ProxyError::Timeout { limit }),
            }
        }
        None => proxy.forward(request, binding.strip_path).await,
    };

    match result {
        Ok(response) => {
            let status = response.status();
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                service = %binding.service,
                status = status.as_u16(),
                bytes = content_length(&response),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Request completed"
            );
            metrics::record_request(method.as_str(), status.as_u16(), &binding.service, start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                service = %binding.service,
                target = %proxy.target(),
                error = %e,
                "Proxy error"
            );
            metrics::record_request(method.as_str(), 502, &binding.service, start_time);
            (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
        }
    }
}

/// Body size advertised by the backend, for the completion log line.
fn content_length(response: &Response) -> u64 {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
