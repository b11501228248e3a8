//! API server: router construction and serving.

use crate::handlers;
use axum::routing::{get, post};
use axum::Router;
use pathlab_core::Simulator;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    simulator: Arc<Simulator>,
}

impl ApiServer {
    #[must_use]
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/simulate", post(handlers::simulate))
            .route("/controls", get(handlers::controls))
            .route("/health", get(handlers::health))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.simulator.clone())
    }

    /// Starts the server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve
    /// requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("simulation API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
