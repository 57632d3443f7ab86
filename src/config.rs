use crate::suggestions::GOOGLE_BOOKS_ENDPOINT;
use anyhow::Context;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MOCK_LATENCY_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Simulated,
    Remote,
}

#[derive(Debug, Clone)]
pub struct Config {
    backend: Backend,
    api_base_url: String,
    mock_latency: Duration,
    suggestions_endpoint: String,
    server_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let use_mock = lookup("CATALOG_USE_MOCK").is_none_or(|v| v.eq_ignore_ascii_case("true"));
        let backend = if use_mock {
            Backend::Simulated
        } else {
            Backend::Remote
        };

        let api_base_url = lookup("CATALOG_API_BASE_URL").unwrap_or_default();
        let mock_latency = load_or(&lookup, "CATALOG_MOCK_LATENCY_MS", DEFAULT_MOCK_LATENCY_MS)?;
        let suggestions_endpoint =
            lookup("SUGGESTIONS_ENDPOINT").unwrap_or_else(|| GOOGLE_BOOKS_ENDPOINT.into());
        let server_port = load_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?;

        Ok(Self {
            backend,
            api_base_url,
            mock_latency: Duration::from_millis(mock_latency),
            suggestions_endpoint,
            server_port,
        })
    }

    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Base URL of the remote catalog; empty means this process's own address.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        if self.api_base_url.is_empty() {
            self.own_origin()
        } else {
            self.api_base_url.clone()
        }
    }

    #[must_use]
    pub fn own_origin(&self) -> String {
        format!("http://127.0.0.1:{}", self.server_port)
    }

    #[must_use]
    pub const fn mock_latency(&self) -> Duration {
        self.mock_latency
    }

    #[must_use]
    pub fn suggestions_endpoint(&self) -> &str {
        &self.suggestions_endpoint
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }
}

fn load_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(val) => val
            .parse::<T>()
            .with_context(|| format!("Failed to parse environment variable {key}")),
        None => Ok(default),
    }
}
