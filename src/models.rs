use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(AuthorNameEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
#[error("Author name cannot be empty")]
pub struct AuthorNameEmptyError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    id: u64,
    name: AuthorName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

impl Author {
    pub fn new(id: u64, req: NewAuthor) -> Self {
        Self {
            id,
            name: req.name,
            country: req.country,
            birth_year: req.birth_year,
            bio: req.bio,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub const fn birth_year(&self) -> Option<i32> {
        self.birth_year
    }

    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }
}

/// An author that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuthor {
    name: AuthorName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birth_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bio: Option<String>,
}

impl NewAuthor {
    pub const fn new(name: AuthorName) -> Self {
        Self {
            name,
            country: None,
            birth_year: None,
            bio: None,
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub const fn with_birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    id: u64,
    title: String,
    author_id: u64,
    isbn: String,
    published_year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_url: Option<String>,
}

impl Book {
    pub fn new(id: u64, req: NewBook) -> Self {
        Self {
            id,
            title: req.title,
            author_id: req.author_id,
            isbn: req.isbn,
            published_year: req.published_year,
            description: req.description,
            cover_url: req.cover_url,
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn author_id(&self) -> u64 {
        self.author_id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub const fn published_year(&self) -> u32 {
        self.published_year
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.cover_url.as_deref()
    }
}

/// A book that has not been assigned an id yet.
///
/// The author reference is not checked against any author collection here;
/// callers that need referential integrity check it before building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    title: String,
    author_id: u64,
    isbn: String,
    published_year: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cover_url: Option<String>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author_id: u64,
        isbn: impl Into<String>,
        published_year: u32,
    ) -> Self {
        Self {
            title: title.into(),
            author_id,
            isbn: isbn.into(),
            published_year,
            description: None,
            cover_url: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_cover_url(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = Some(cover_url.into());
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub const fn author_id(&self) -> u64 {
        self.author_id
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub const fn published_year(&self) -> u32 {
        self.published_year
    }
}

/// A non-success response from the catalog service.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Request failed: {status}")]
pub struct RequestFailure {
    pub status: u16,
}

#[derive(Error, Debug)]
pub enum CreateAuthorError {
    #[error(transparent)]
    Rejected(#[from] RequestFailure),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum CreateBookError {
    #[error(transparent)]
    Rejected(#[from] RequestFailure),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FindAllAuthorsError {
    #[error(transparent)]
    Rejected(#[from] RequestFailure),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum FindAllBooksError {
    #[error(transparent)]
    Rejected(#[from] RequestFailure),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
