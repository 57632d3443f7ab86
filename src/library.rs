use crate::autofill::{AddAuthorForm, AddBookForm, AuthorSubmitError, SubmitError};
use crate::models::{Author, Book, FindAllAuthorsError, FindAllBooksError};
use crate::repositories::{AuthorRepository, BookRepository, CatalogStore};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Books,
    Authors,
    AddAuthor,
    AddBook,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load authors: {0}")]
    Authors(#[from] FindAllAuthorsError),
    #[error("Failed to load books: {0}")]
    Books(#[from] FindAllBooksError),
}

/// Loaded catalog plus the browsing state around it.
#[derive(Debug, Default)]
pub struct Library {
    authors: Vec<Author>,
    books: Vec<Book>,
    search_term: String,
    active_tab: Tab,
}

impl Library {
    /// Fetches authors and books together; either failure aborts the whole load.
    pub async fn load<S: CatalogStore + ?Sized>(store: &S) -> Result<Self, LoadError> {
        let (authors, books) = tokio::try_join!(
            async { store.find_all_authors().await.map_err(LoadError::from) },
            async { store.find_all_books().await.map_err(LoadError::from) },
        )?;

        tracing::info!(authors = authors.len(), books = books.len(), "catalog loaded");
        Ok(Self::new(authors, books))
    }

    pub fn new(authors: Vec<Author>, books: Vec<Book>) -> Self {
        Self {
            authors,
            books,
            ..Self::default()
        }
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub const fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.into();
    }

    pub fn author_of(&self, book: &Book) -> Option<&Author> {
        self.authors.iter().find(|a| a.id() == book.author_id())
    }

    pub fn book_count(&self, author_id: u64) -> usize {
        self.books
            .iter()
            .filter(|b| b.author_id() == author_id)
            .count()
    }

    /// Books whose title or author name contains the search term, ignoring case.
    pub fn filtered_books(&self) -> Vec<&Book> {
        let term = self.search_term.trim().to_lowercase();
        self.books
            .iter()
            .filter(|book| {
                term.is_empty()
                    || book.title().to_lowercase().contains(&term)
                    || self
                        .author_of(book)
                        .is_some_and(|a| a.name().as_str().to_lowercase().contains(&term))
            })
            .collect()
    }

    pub fn filtered_authors(&self) -> Vec<&Author> {
        let term = self.search_term.trim().to_lowercase();
        self.authors
            .iter()
            .filter(|a| term.is_empty() || a.name().as_str().to_lowercase().contains(&term))
            .collect()
    }

    /// Switches to the add-book tab with a fresh form over the loaded authors.
    pub fn open_add_book(&mut self) -> AddBookForm {
        self.active_tab = Tab::AddBook;
        AddBookForm::new(self.authors.clone())
    }

    pub fn open_add_author(&mut self) -> AddAuthorForm {
        self.active_tab = Tab::AddAuthor;
        AddAuthorForm::new()
    }

    pub fn cancel_add_book(&mut self, mut form: AddBookForm) {
        form.close();
        self.active_tab = Tab::Books;
    }

    pub fn cancel_add_author(&mut self) {
        self.active_tab = Tab::Authors;
    }

    /// Submits the form; on success the book is listed first and the books tab shown.
    pub async fn add_book<R: BookRepository + ?Sized>(
        &mut self,
        form: &mut AddBookForm,
        repo: &R,
    ) -> Result<&Book, SubmitError> {
        let book = form.submit(repo).await.inspect_err(|err| {
            if let SubmitError::Rejected(cause) = err {
                tracing::error!(error = %cause, "failed to add book");
            }
        })?;

        form.close();
        self.books.insert(0, book);
        self.active_tab = Tab::Books;
        Ok(&self.books[0])
    }

    pub async fn add_author<R: AuthorRepository + ?Sized>(
        &mut self,
        form: &mut AddAuthorForm,
        repo: &R,
    ) -> Result<&Author, AuthorSubmitError> {
        let author = form.submit(repo).await.inspect_err(|err| {
            if let AuthorSubmitError::Rejected(cause) = err {
                tracing::error!(error = %cause, "failed to add author");
            }
        })?;

        self.authors.insert(0, author);
        self.active_tab = Tab::Authors;
        Ok(&self.authors[0])
    }
}
