use crate::models::{
    Author, Book, CreateAuthorError, CreateBookError, FindAllAuthorsError, FindAllBooksError,
    NewAuthor, NewBook,
};
use async_trait::async_trait;

#[async_trait]
pub trait AuthorRepository: Send + Sync + 'static {
    async fn create_author(&self, req: &NewAuthor) -> Result<Author, CreateAuthorError>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;
}

#[async_trait]
pub trait BookRepository: Send + Sync + 'static {
    async fn create_book(&self, req: &NewBook) -> Result<Book, CreateBookError>;

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError>;
}

/// Both halves of the catalog behind a single handle.
pub trait CatalogStore: AuthorRepository + BookRepository {}

impl<T: AuthorRepository + BookRepository> CatalogStore for T {}
