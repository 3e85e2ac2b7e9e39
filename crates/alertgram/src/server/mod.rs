mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{compose::Composer, telegram::Messenger, Result};

pub use routes::{ping_text, ApiError};

/// Per-process state shared by every request. Nothing in it is mutated
/// after startup.
pub struct AppState {
    pub composer: Composer,
    pub messenger: Arc<dyn Messenger>,
}

pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(composer: Composer, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            state: Arc::new(AppState {
                composer,
                messenger,
            }),
        }
    }

    pub fn build_router(self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/metrics", get(routes::metrics))
            .route("/ping/{chat_id}", get(routes::ping))
            .route("/alert/{chat_id}", post(routes::alert))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
            .with_state(self.state)
    }

    pub async fn start(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, self.build_router()).await?;
        Ok(())
    }
}
