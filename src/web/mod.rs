//! Web server module.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::diagnostics::Diagnostics;
use crate::probe::CommandRunner;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
pub struct AppState<R> {
    pub diagnostics: Arc<Diagnostics<R>>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Build the router with all routes.
pub fn routes<R>(diagnostics: Arc<Diagnostics<R>>) -> Router
where
    R: CommandRunner + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/network-diagnostics",
            post(handlers::handle_diagnostics::<R>),
        )
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(AppState { diagnostics })
}

/// Web server for netdiag.
pub struct Server<R> {
    config: ServerConfig,
    diagnostics: Arc<Diagnostics<R>>,
}

impl<R: CommandRunner + 'static> Server<R> {
    /// Create a new server with the given dependencies.
    pub fn new(config: ServerConfig, diagnostics: Arc<Diagnostics<R>>) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = routes(self.diagnostics.clone());

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
