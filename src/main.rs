use anyhow::{Context, bail};
use book_catalog::{build_store, build_suggestion_source};
use book_catalog::config::{Backend, Config};
use book_catalog::http::{AppState, HttpServer, HttpServerConfig};
use book_catalog::library::Library;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    if config.backend() == Backend::Remote && config.api_base_url() == config.own_origin() {
        bail!("Remote catalog backend points at this server; set CATALOG_API_BASE_URL");
    }

    tracing::info!(
        backend = ?config.backend(),
        port = config.server_port(),
        "starting book catalog"
    );

    let store = build_store(&config);
    let library = Library::load(store.as_ref())
        .await
        .context("Failed to load catalog")?;
    tracing::info!(
        authors = library.authors().len(),
        books = library.books().len(),
        "catalog loaded"
    );

    let suggestions = build_suggestion_source(&config);
    let state = AppState::new(store, suggestions);
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
