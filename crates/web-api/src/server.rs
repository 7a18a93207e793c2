use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use puckline_core::AppConfig;
use puckline_feed::ProviderFactory;
use puckline_ledger::CsvStore;

use crate::handlers;

/// Shared state behind the API handlers.
pub struct AppState {
    pub config: AppConfig,
    pub factory: Arc<dyn ProviderFactory>,
    pub store: CsvStore,
}

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    #[must_use]
    pub fn new(config: AppConfig, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            state: Arc::new(AppState {
                config,
                factory,
                store: CsvStore::new(),
            }),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/status", get(handlers::status))
            .route("/api/schedule/:league", get(handlers::list_schedule))
            .route("/api/results/:league", get(handlers::list_results))
            .route("/api/runs", post(handlers::trigger_run))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("control panel API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
