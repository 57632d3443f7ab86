mod handler;

use crate::repositories::CatalogStore;
use crate::suggestions::SuggestionSource;
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn CatalogStore>,
    suggestions: Arc<dyn SuggestionSource>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, suggestions: Arc<dyn SuggestionSource>) -> Self {
        Self { store, suggestions }
    }
}

#[derive(Debug)]
pub struct HttpServerConfig {
    port: u16,
}

impl HttpServerConfig {
    /// Port zero asks the OS for a free port.
    pub const fn new(port: u16) -> Self {
        Self { port }
    }
}

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new(state: AppState, config: HttpServerConfig) -> anyhow::Result<Self> {
        let router = Router::new()
            .nest("/api", api_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .await
            .with_context(|| format!("Failed to bind to port {}", config.port))?;

        Ok(Self { router, listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to read bound address")
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "catalog server listening");
        axum::serve(self.listener, self.router)
            .await
            .context("Received error from running server")?;
        Ok(())
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/authors",
            get(handler::list_authors).post(handler::create_author),
        )
        .route("/books", get(handler::list_books).post(handler::create_book))
        .route("/suggestions", get(handler::search_suggestions))
}
