use crate::http::AppState;
use crate::models::{
    Author, AuthorName, AuthorNameEmptyError, Book, CreateAuthorError, CreateBookError,
    FindAllAuthorsError, FindAllBooksError, NewAuthor, NewBook, RequestFailure,
};
use crate::suggestions::{Suggestion, SuggestionSourceError};
use axum::extract::{Json, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Successful responses carry the bare entity so clients decode it directly.
#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(data))
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    const fn new(status: StatusCode, data: T) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    InternalServerError(String),
    BadGateway(String),
    UnprocessableEntity(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg) = match self {
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
        };
        (status, Json(ApiResponse::new(status, msg))).into_response()
    }
}

impl ApiError {
    fn upstream(failure: RequestFailure) -> Self {
        tracing::warn!(status = failure.status, "upstream catalog rejected request");
        Self::BadGateway(failure.to_string())
    }

    fn internal(cause: &anyhow::Error) -> Self {
        tracing::error!(error = ?cause, "catalog request failed");
        Self::InternalServerError("Internal server error".to_string())
    }
}

macro_rules! impl_api_error_from {
    ($($err:ident),+) => {
        $(
            impl From<$err> for ApiError {
                fn from(err: $err) -> Self {
                    match err {
                        $err::Rejected(failure) => Self::upstream(failure),
                        $err::Other(cause) => Self::internal(&cause),
                    }
                }
            }
        )+
    };
}

impl_api_error_from!(
    CreateAuthorError,
    CreateBookError,
    FindAllAuthorsError,
    FindAllBooksError
);

impl From<SuggestionSourceError> for ApiError {
    fn from(err: SuggestionSourceError) -> Self {
        tracing::warn!(error = %err, "book search failed");
        Self::BadGateway(err.to_string())
    }
}

impl From<ParseCreateAuthorHttpRequestError> for ApiError {
    fn from(err: ParseCreateAuthorHttpRequestError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

impl From<ParseCreateBookHttpRequestError> for ApiError {
    fn from(err: ParseCreateBookHttpRequestError) -> Self {
        Self::UnprocessableEntity(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuthorHttpRequest {
    name: String,
    country: Option<String>,
    birth_year: Option<i32>,
    bio: Option<String>,
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ParseCreateAuthorHttpRequestError(#[from] AuthorNameEmptyError);

impl TryFrom<CreateAuthorHttpRequest> for NewAuthor {
    type Error = ParseCreateAuthorHttpRequestError;

    fn try_from(value: CreateAuthorHttpRequest) -> Result<Self, Self::Error> {
        let mut author = Self::new(AuthorName::new(&value.name)?);
        if let Some(country) = value.country {
            author = author.with_country(country);
        }
        if let Some(year) = value.birth_year {
            author = author.with_birth_year(year);
        }
        if let Some(bio) = value.bio {
            author = author.with_bio(bio);
        }
        Ok(author)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookHttpRequest {
    title: String,
    author_id: u64,
    isbn: String,
    published_year: u32,
    description: Option<String>,
    cover_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum ParseCreateBookHttpRequestError {
    #[error("Book title cannot be empty")]
    Title,
    #[error("Book ISBN cannot be empty")]
    Isbn,
    #[error("Book author id must be positive")]
    AuthorId,
    #[error("Book published year must be positive")]
    PublishedYear,
}

impl TryFrom<CreateBookHttpRequest> for NewBook {
    type Error = ParseCreateBookHttpRequestError;

    fn try_from(value: CreateBookHttpRequest) -> Result<Self, Self::Error> {
        let title = value.title.trim();
        if title.is_empty() {
            return Err(ParseCreateBookHttpRequestError::Title);
        }
        let isbn = value.isbn.trim();
        if isbn.is_empty() {
            return Err(ParseCreateBookHttpRequestError::Isbn);
        }
        if value.author_id == 0 {
            return Err(ParseCreateBookHttpRequestError::AuthorId);
        }
        if value.published_year == 0 {
            return Err(ParseCreateBookHttpRequestError::PublishedYear);
        }

        let mut book = Self::new(title, value.author_id, isbn, value.published_year);
        if let Some(description) = value.description {
            book = book.with_description(description);
        }
        if let Some(cover_url) = value.cover_url {
            book = book.with_cover_url(cover_url);
        }
        Ok(book)
    }
}

pub async fn list_authors(
    State(state): State<AppState>,
) -> Result<ApiSuccess<Vec<Author>>, ApiError> {
    let authors = state.store.find_all_authors().await?;
    Ok(ApiSuccess::new(StatusCode::OK, authors))
}

pub async fn create_author(
    State(state): State<AppState>,
    Json(body): Json<CreateAuthorHttpRequest>,
) -> Result<ApiSuccess<Author>, ApiError> {
    let req: NewAuthor = body.try_into()?;
    state
        .store
        .create_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::new(StatusCode::CREATED, author))
}

pub async fn list_books(State(state): State<AppState>) -> Result<ApiSuccess<Vec<Book>>, ApiError> {
    let books = state.store.find_all_books().await?;
    Ok(ApiSuccess::new(StatusCode::OK, books))
}

pub async fn create_book(
    State(state): State<AppState>,
    Json(body): Json<CreateBookHttpRequest>,
) -> Result<ApiSuccess<Book>, ApiError> {
    let req: NewBook = body.try_into()?;
    state
        .store
        .create_book(&req)
        .await
        .map_err(ApiError::from)
        .map(|book| ApiSuccess::new(StatusCode::CREATED, book))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    q: String,
}

pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<ApiSuccess<Vec<Suggestion>>, ApiError> {
    let suggestions = state.suggestions.search(&query.q).await?;
    Ok(ApiSuccess::new(StatusCode::OK, suggestions))
}
