use crate::models::{
    Author, Book, CreateAuthorError, CreateBookError, FindAllAuthorsError, FindAllBooksError,
    NewAuthor, NewBook, RequestFailure,
};
use crate::repositories::{AuthorRepository, BookRepository};
use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

const AUTHORS_PATH: &str = "/api/authors";
const BOOKS_PATH: &str = "/api/books";

/// Catalog backed by the catalog HTTP service.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteCatalog {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T, E>(&self, path: &str) -> Result<T, E>
    where
        T: DeserializeOwned,
        E: From<RequestFailure> + From<anyhow::Error>,
    {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("Failed to send GET {path}"))?;
        decode(res, path).await
    }

    async fn post<B, T, E>(&self, path: &str, body: &B) -> Result<T, E>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
        E: From<RequestFailure> + From<anyhow::Error>,
    {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send POST {path}"))?;
        decode(res, path).await
    }
}

async fn decode<T, E>(res: reqwest::Response, path: &str) -> Result<T, E>
where
    T: DeserializeOwned,
    E: From<RequestFailure> + From<anyhow::Error>,
{
    let status = res.status();
    if !status.is_success() {
        tracing::warn!(path, status = status.as_u16(), "catalog service rejected request");
        return Err(RequestFailure {
            status: status.as_u16(),
        }
        .into());
    }

    let body = res
        .json()
        .await
        .with_context(|| format!("Failed to decode response from {path}"))?;
    Ok(body)
}

#[async_trait]
impl AuthorRepository for RemoteCatalog {
    async fn create_author(&self, req: &NewAuthor) -> Result<Author, CreateAuthorError> {
        self.post(AUTHORS_PATH, req).await
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        self.get(AUTHORS_PATH).await
    }
}

#[async_trait]
impl BookRepository for RemoteCatalog {
    async fn create_book(&self, req: &NewBook) -> Result<Book, CreateBookError> {
        self.post(BOOKS_PATH, req).await
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        self.get(BOOKS_PATH).await
    }
}
