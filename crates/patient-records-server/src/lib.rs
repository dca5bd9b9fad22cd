//! # Patient Records HTTP Server
//!
//! Axum front end for the patient registry and the premium predictor.
//!
//! Registry calls are synchronous; handlers run them on the blocking pool so
//! file and SQLite I/O never stalls the runtime.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use patient_records_core::PatientRegistry;
use patient_records_predict::{PremiumModel, RuleModel};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{Backend, ConfigArgs, ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult, ErrorResponse};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PatientRegistry>,
    pub model: Arc<dyn PremiumModel>,
}

impl AppState {
    pub fn new(registry: PatientRegistry, model: impl PremiumModel + 'static) -> Self {
        Self {
            registry: Arc::new(registry),
            model: Arc::new(model),
        }
    }

    /// Registry with the rule-based premium model.
    pub fn with_rule_model(registry: PatientRegistry) -> Self {
        Self::new(registry, RuleModel::default())
    }
}

/// HTTP server for patient records
pub struct PatientServer {
    config: ServerConfig,
    router: Router,
}

impl PatientServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> std::io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {e}", self.config.socket_addr()),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, backend = ?self.config.backend, "patient records server listening");
        axum::serve(listener, self.router).await
    }
}

/// All routes with CORS and request tracing applied.
pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
    routes::routes(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|s| s.parse().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
