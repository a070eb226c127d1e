//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Assemble subsystems from config into shared `AppState`
//! - Build the Axum router with middleware (tracing, limits, request ID)
//! - Bind and serve with graceful shutdown

use std::time::{Duration, Instant};

use axum::extract::{DefaultBodyLimit, MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::extraction::ExtractionClient;
use crate::http::handlers;
use crate::observability::metrics;
use crate::settlement::{InFlightSettlements, Orchestrator};
use crate::store::ClaimStore;

/// Application state injected into handlers.
///
/// Subsystems that failed to initialize or were never configured are
/// `None`; handlers that need them report that explicitly instead of
/// degrading silently.
#[derive(Clone)]
pub struct AppState {
    pub store: Option<ClaimStore>,
    pub extraction: Option<Arc<ExtractionClient>>,
    pub settlement: Option<Arc<Orchestrator>>,
    pub policy: crate::claims::payable::CoveragePolicy,
    /// Claims with a broadcast in flight; settle reserves here first.
    pub settling: InFlightSettlements,
}

/// HTTP server for the claim gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Assemble the server from config.
    ///
    /// A subsystem that cannot come up is logged and left out of the
    /// state; the rest of the API keeps working.
    pub async fn from_config(config: GatewayConfig) -> Self {
        let connect_timeout = Duration::from_secs(config.timeouts.connect_secs);
        let request_timeout = Duration::from_secs(config.timeouts.request_secs);

        let extraction = if config.extraction.enabled {
            match ExtractionClient::from_env(&config.extraction, connect_timeout) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!(error = %e, "Extraction disabled");
                    None
                }
            }
        } else {
            None
        };

        let settlement = if config.blockchain.enabled {
            match Orchestrator::from_config(&config.blockchain).await {
                Ok(orchestrator) => Some(Arc::new(orchestrator)),
                Err(e) => {
                    tracing::warn!(error = %e, "Blockchain settlement disabled");
                    None
                }
            }
        } else {
            None
        };

        let store = match ClaimStore::from_config(&config.store, request_timeout) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "Claim store disabled");
                None
            }
        };

        let state = AppState {
            store,
            extraction,
            settlement,
            policy: config.policy.clone(),
            settling: InFlightSettlements::new(),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/upload", post(handlers::upload))
            .route("/api/process", post(handlers::process))
            .route("/api/record-tx", post(handlers::record_tx))
            .route("/api/claims/{id}", get(handlers::get_claim))
            .route("/api/claims/{id}/validate", post(handlers::validate_claim))
            .route("/api/claims/{id}/settle", post(handlers::settle_claim))
            .route("/api/tx/{hash}", get(handlers::tx_status))
            .route("/health", get(handlers::health))
            .layer(axum::middleware::from_fn(track_metrics))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(DefaultBodyLimit::max(config.security.max_body_size)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Per-request counter and latency tracking, labeled by route pattern.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    metrics::record_request(&endpoint, response.status().as_u16(), start);
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
