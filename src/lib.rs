pub mod autofill;
pub mod config;
pub mod http;
pub mod library;
pub mod models;
pub mod remote;
pub mod repositories;
pub mod simulated;
pub mod suggestions;

use crate::config::{Backend, Config};
use crate::remote::RemoteCatalog;
use crate::repositories::CatalogStore;
use crate::simulated::{Seed, SimulatedCatalog};
use crate::suggestions::{GoogleBooks, SuggestionSource};
use std::sync::Arc;

/// Builds the catalog backend the configuration asks for.
pub fn build_store(config: &Config) -> Arc<dyn CatalogStore> {
    match config.backend() {
        Backend::Simulated => Arc::new(SimulatedCatalog::new(
            Seed::sample(),
            config.mock_latency(),
        )),
        Backend::Remote => Arc::new(RemoteCatalog::new(&config.api_base_url())),
    }
}

/// Builds the title lookup against the configured search endpoint.
pub fn build_suggestion_source(config: &Config) -> Arc<dyn SuggestionSource> {
    Arc::new(GoogleBooks::new(config.suggestions_endpoint()))
}
