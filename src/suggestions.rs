//! Title lookups against an external book search service.
//!
//! Results are normalized into [`Suggestion`]s with empty strings and zero
//! standing in for anything the service did not return.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

pub const GOOGLE_BOOKS_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

/// Queries shorter than this (after trimming) never leave the process.
pub const MIN_QUERY_LEN: usize = 3;

const MAX_RESULTS: &str = "40";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    pub author_name: String,
    pub description: String,
    pub isbn: String,
    pub published_year: u32,
    pub thumbnail_url: String,
}

#[derive(Error, Debug)]
pub enum SuggestionSourceError {
    #[error("Book search failed: {status}")]
    Status { status: u16 },
    #[error("Book search request failed")]
    Transport(#[source] reqwest::Error),
    #[error("Book search returned an unreadable body")]
    Decode(#[source] reqwest::Error),
}

#[async_trait]
pub trait SuggestionSource: Send + Sync + 'static {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionSourceError>;
}

/// Whether `query` is long enough to be worth sending.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

#[derive(Debug, Clone)]
pub struct GoogleBooks {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleBooks {
    pub fn new(endpoint: &str) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GoogleBooks {
    fn default() -> Self {
        Self::new(GOOGLE_BOOKS_ENDPOINT)
    }
}

#[async_trait]
impl SuggestionSource for GoogleBooks {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, SuggestionSourceError> {
        if !is_searchable(query) {
            return Ok(Vec::new());
        }

        let q = format!("intitle:{}", query.trim());
        tracing::debug!(%q, "searching books by title");

        let res = self
            .client
            .get(&self.endpoint)
            .query(&[("q", q.as_str()), ("maxResults", MAX_RESULTS)])
            .send()
            .await
            .map_err(SuggestionSourceError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            return Err(SuggestionSourceError::Status {
                status: status.as_u16(),
            });
        }

        let volumes: Volumes = res.json().await.map_err(SuggestionSourceError::Decode)?;
        Ok(volumes.into_suggestions())
    }
}

#[derive(Debug, Default, Deserialize)]
struct Volumes {
    #[serde(default)]
    items: Vec<Volume>,
}

impl Volumes {
    fn into_suggestions(self) -> Vec<Suggestion> {
        self.items.into_iter().map(Suggestion::from).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    #[serde(default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    published_date: Option<String>,
    #[serde(default)]
    industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(default)]
    image_links: ImageLinks,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl From<Volume> for Suggestion {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;

        let isbn = find_identifier(&info.industry_identifiers, "ISBN_13")
            .or_else(|| find_identifier(&info.industry_identifiers, "ISBN_10"))
            .unwrap_or_default();

        let thumbnail_url = non_empty(info.image_links.thumbnail)
            .or_else(|| non_empty(info.image_links.small_thumbnail))
            .map(|url| force_https(&url))
            .unwrap_or_default();

        Self {
            title: info.title.unwrap_or_default(),
            author_name: info.authors.into_iter().next().unwrap_or_default(),
            description: info.description.unwrap_or_default(),
            isbn,
            published_year: info.published_date.as_deref().map_or(0, leading_year),
            thumbnail_url,
        }
    }
}

fn find_identifier(ids: &[IndustryIdentifier], kind: &str) -> Option<String> {
    ids.iter()
        .find(|id| id.kind == kind && !id.identifier.is_empty())
        .map(|id| id.identifier.clone())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.into(),
    }
}

/// Year from a date such as `2015-12-08` or `1999`; zero when there is none.
fn leading_year(date: &str) -> u32 {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}").unwrap());
    RE.find(date)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
