//! Form state for adding books and authors.
//!
//! [`AddBookForm`] owns the new-book draft. Editing the title hands back a
//! [`SearchTicket`]; the caller runs it against a [`SuggestionSource`] whenever
//! it likes and feeds the [`SearchReply`] back through [`AddBookForm::receive`].
//! Replies are tagged with the sequence number of the edit that issued them, so
//! a reply overtaken by a newer edit (or arriving after [`AddBookForm::close`])
//! is dropped instead of clobbering the list.

use crate::models::{
    Author, AuthorName, Book, CreateAuthorError, CreateBookError, NewAuthor, NewBook,
};
use crate::repositories::{AuthorRepository, BookRepository};
use crate::suggestions::{Suggestion, SuggestionSource, SuggestionSourceError, is_searchable};
use std::collections::BTreeMap;
use thiserror::Error;

pub const NO_MATCHING_AUTHOR: &str = "No matching author found. Please select an author.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Title,
    AuthorId,
    Isbn,
    PublishedYear,
    Description,
    CoverUrl,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::AuthorId => "authorId",
            Self::Isbn => "isbn",
            Self::PublishedYear => "publishedYear",
            Self::Description => "description",
            Self::CoverUrl => "coverUrl",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation messages keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord = Field>(BTreeMap<F, String>);

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<F: Ord> FieldErrors<F> {
    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn set(&mut self, field: F, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    fn clear(&mut self, field: F) {
        self.0.remove(&field);
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.0.keys().copied()
    }
}

/// Working copy of a book that has not been submitted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub author_id: Option<u64>,
    pub isbn: String,
    pub published_year: Option<u32>,
    pub description: String,
    pub cover_url: String,
}

/// A title search the form wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    query: String,
}

impl SearchTicket {
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub async fn run<S: SuggestionSource + ?Sized>(self, source: &S) -> SearchReply {
        let result = source.search(&self.query).await;
        SearchReply {
            seq: self.seq,
            result,
        }
    }
}

#[derive(Debug)]
pub struct SearchReply {
    pub seq: u64,
    pub result: Result<Vec<Suggestion>, SuggestionSourceError>,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Book form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),
    #[error(transparent)]
    Rejected(CreateBookError),
}

#[derive(Error, Debug)]
pub enum AuthorSubmitError {
    #[error("Author form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors<AuthorField>),
    #[error(transparent)]
    Rejected(CreateAuthorError),
}

#[derive(Debug)]
pub struct AddBookForm {
    authors: Vec<Author>,
    draft: Draft,
    errors: FieldErrors,
    suggestions: Vec<Suggestion>,
    searching: bool,
    latest_seq: u64,
    closed: bool,
}

impl AddBookForm {
    /// Starts an empty draft; `authors` are the ones a suggestion may resolve to.
    pub fn new(authors: Vec<Author>) -> Self {
        Self {
            authors,
            draft: Draft::default(),
            errors: FieldErrors::default(),
            suggestions: Vec::new(),
            searching: false,
            latest_seq: 0,
            closed: false,
        }
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    /// Applies a raw input value to `field` and clears that field's error.
    ///
    /// Numeric fields treat zero or unparseable input as unset. Title edits
    /// return a ticket when the new value is long enough to search for.
    pub fn edit(&mut self, field: Field, raw: &str) -> Option<SearchTicket> {
        match field {
            Field::Title => self.draft.title = raw.into(),
            Field::AuthorId => self.draft.author_id = parse_positive(raw),
            Field::Isbn => self.draft.isbn = raw.into(),
            Field::PublishedYear => self.draft.published_year = parse_positive(raw),
            Field::Description => self.draft.description = raw.into(),
            Field::CoverUrl => self.draft.cover_url = raw.into(),
        }
        self.errors.clear(field);

        if field == Field::Title {
            self.title_changed()
        } else {
            None
        }
    }

    fn title_changed(&mut self) -> Option<SearchTicket> {
        // Any edit supersedes whatever is still in flight.
        self.latest_seq += 1;

        if self.closed {
            return None;
        }

        let query = self.draft.title.trim();
        if !is_searchable(query) {
            self.suggestions.clear();
            self.searching = false;
            return None;
        }

        self.searching = true;
        Some(SearchTicket {
            seq: self.latest_seq,
            query: query.into(),
        })
    }

    /// Takes in a finished search. Returns whether it was current and applied.
    pub fn receive(&mut self, reply: SearchReply) -> bool {
        if self.closed || reply.seq != self.latest_seq {
            tracing::debug!(
                seq = reply.seq,
                latest = self.latest_seq,
                "dropping stale suggestions"
            );
            return false;
        }

        self.suggestions = reply.result.unwrap_or_else(|err| {
            tracing::debug!(error = %err, "suggestion lookup failed");
            Vec::new()
        });
        self.searching = false;
        true
    }

    /// Convenience for callers that await the lookup inline.
    pub async fn search_title<S: SuggestionSource + ?Sized>(
        &mut self,
        title: &str,
        source: &S,
    ) -> bool {
        match self.edit(Field::Title, title) {
            Some(ticket) => {
                let reply = ticket.run(source).await;
                self.receive(reply)
            }
            None => false,
        }
    }

    /// Applies the shown suggestion at `index`. Returns `false` if there is none.
    pub fn pick(&mut self, index: usize) -> bool {
        match self.suggestions.get(index).cloned() {
            Some(suggestion) => {
                self.apply_suggestion(&suggestion);
                true
            }
            None => false,
        }
    }

    /// Merges a suggestion into the draft and resolves its author by exact name.
    ///
    /// Empty or zero suggestion fields never overwrite what the draft holds.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) {
        if !suggestion.title.is_empty() {
            self.draft.title = suggestion.title.clone();
        }
        if !suggestion.description.is_empty() {
            self.draft.description = suggestion.description.clone();
        }
        if !suggestion.isbn.is_empty() {
            self.draft.isbn = suggestion.isbn.clone();
        }
        if suggestion.published_year != 0 {
            self.draft.published_year = Some(suggestion.published_year);
        }
        if !suggestion.thumbnail_url.is_empty() {
            self.draft.cover_url = suggestion.thumbnail_url.clone();
        }

        let matched = self
            .authors
            .iter()
            .find(|author| author.name().as_str() == suggestion.author_name);

        match matched {
            Some(author) => {
                self.draft.author_id = Some(author.id());
                self.errors.clear(Field::AuthorId);
            }
            None => self.errors.set(Field::AuthorId, NO_MATCHING_AUTHOR),
        }
    }

    /// Checks the required fields, replacing the error map with the outcome.
    pub fn validate(&mut self) -> Result<NewBook, FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.draft.title.trim().is_empty() {
            errors.set(Field::Title, "Title is required");
        }
        let author_id = self
            .draft
            .author_id
            .filter(|id| self.authors.iter().any(|author| author.id() == *id));
        if author_id.is_none() {
            errors.set(Field::AuthorId, "Select an author");
        }
        if self.draft.isbn.trim().is_empty() {
            errors.set(Field::Isbn, "ISBN is required");
        }
        if self.draft.published_year.is_none() {
            errors.set(Field::PublishedYear, "Published year is required");
        }

        self.errors = errors.clone();

        match (author_id, self.draft.published_year) {
            (Some(author_id), Some(year)) if errors.is_empty() => {
                let mut book = NewBook::new(
                    self.draft.title.clone(),
                    author_id,
                    self.draft.isbn.clone(),
                    year,
                );
                if !self.draft.description.is_empty() {
                    book = book.with_description(self.draft.description.clone());
                }
                if !self.draft.cover_url.is_empty() {
                    book = book.with_cover_url(self.draft.cover_url.clone());
                }
                Ok(book)
            }
            _ => Err(errors),
        }
    }

    /// Validates and hands the draft to `repo`.
    ///
    /// On any failure the draft stays as it was so the user can fix it and retry.
    pub async fn submit<R: BookRepository + ?Sized>(
        &mut self,
        repo: &R,
    ) -> Result<Book, SubmitError> {
        let req = self.validate().map_err(SubmitError::Invalid)?;
        repo.create_book(&req).await.map_err(SubmitError::Rejected)
    }

    /// Tears the form down; replies arriving afterwards are ignored.
    pub fn close(&mut self) {
        self.closed = true;
        self.searching = false;
    }
}

fn parse_positive<T: std::str::FromStr + Default + PartialEq>(raw: &str) -> Option<T> {
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value != T::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorField {
    Name,
    Country,
    BirthYear,
    Bio,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorDraft {
    pub name: String,
    pub country: String,
    pub birth_year: Option<i32>,
    pub bio: String,
}

#[derive(Debug, Default)]
pub struct AddAuthorForm {
    draft: AuthorDraft,
    errors: FieldErrors<AuthorField>,
}

impl AddAuthorForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn draft(&self) -> &AuthorDraft {
        &self.draft
    }

    pub const fn errors(&self) -> &FieldErrors<AuthorField> {
        &self.errors
    }

    pub fn edit(&mut self, field: AuthorField, raw: &str) {
        match field {
            AuthorField::Name => self.draft.name = raw.into(),
            AuthorField::Country => self.draft.country = raw.into(),
            AuthorField::BirthYear => self.draft.birth_year = parse_positive(raw),
            AuthorField::Bio => self.draft.bio = raw.into(),
        }
        self.errors.clear(field);
    }

    pub fn validate(&mut self) -> Result<NewAuthor, FieldErrors<AuthorField>> {
        let name = match AuthorName::new(&self.draft.name) {
            Ok(name) => name,
            Err(err) => {
                let mut errors = FieldErrors::default();
                errors.set(AuthorField::Name, err.to_string());
                self.errors = errors.clone();
                return Err(errors);
            }
        };
        self.errors = FieldErrors::default();

        let mut author = NewAuthor::new(name);
        let country = self.draft.country.trim();
        if !country.is_empty() {
            author = author.with_country(country);
        }
        if let Some(year) = self.draft.birth_year {
            author = author.with_birth_year(year);
        }
        let bio = self.draft.bio.trim();
        if !bio.is_empty() {
            author = author.with_bio(bio);
        }
        Ok(author)
    }

    pub async fn submit<R: AuthorRepository + ?Sized>(
        &mut self,
        repo: &R,
    ) -> Result<Author, AuthorSubmitError> {
        let req = self.validate().map_err(AuthorSubmitError::Invalid)?;
        repo.create_author(&req).await.map_err(AuthorSubmitError::Rejected)
    }
}
