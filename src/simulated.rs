use crate::models::{
    Author, AuthorName, Book, CreateAuthorError, CreateBookError, FindAllAuthorsError,
    FindAllBooksError, NewAuthor, NewBook,
};
use crate::repositories::{AuthorRepository, BookRepository};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Records a simulated catalog starts from.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub authors: Vec<Author>,
    pub books: Vec<Book>,
}

impl Seed {
    /// Fixed sample data used for local development.
    pub fn sample() -> Self {
        let author = |id, name: &str, country: &str, birth_year| {
            let req = NewAuthor::new(AuthorName::new_unchecked(name))
                .with_country(country)
                .with_birth_year(birth_year);
            Author::new(id, req)
        };

        let authors = vec![
            author(1, "Jane Austen", "United Kingdom", 1775),
            author(2, "Gabriel García Márquez", "Colombia", 1927),
            author(3, "Chinua Achebe", "Nigeria", 1930),
            author(4, "Toni Morrison", "United States", 1931),
            author(5, "Haruki Murakami", "Japan", 1949),
        ];

        let books = vec![
            Book::new(1, NewBook::new("Pride and Prejudice", 1, "9780141439518", 1813)),
            Book::new(2, NewBook::new("Sense and Sensibility", 1, "9780141439662", 1811)),
            Book::new(
                3,
                NewBook::new("One Hundred Years of Solitude", 2, "9780060883287", 1967),
            ),
            Book::new(
                4,
                NewBook::new("Things Fall Apart", 3, "9780385474542", 1958)
                    .with_description("The fall of Okonkwo and of Umuofia's old order."),
            ),
            Book::new(5, NewBook::new("Beloved", 4, "9781400033416", 1987)),
            Book::new(6, NewBook::new("Norwegian Wood", 5, "9780375704024", 1987)),
        ];

        Self { authors, books }
    }
}

#[derive(Debug)]
struct Collection<T> {
    records: Vec<T>,
    last_id: u64,
}

impl<T> Collection<T> {
    fn new(records: Vec<T>, id: impl Fn(&T) -> u64) -> Self {
        let last_id = records.iter().map(id).max().unwrap_or(0);
        Self { records, last_id }
    }

    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory catalog that answers after an artificial delay.
///
/// State lives as long as the instance; independent instances never share records.
#[derive(Debug)]
pub struct SimulatedCatalog {
    authors: Mutex<Collection<Author>>,
    books: Mutex<Collection<Book>>,
    latency: Duration,
}

impl SimulatedCatalog {
    #[must_use]
    pub fn new(seed: Seed, latency: Duration) -> Self {
        Self {
            authors: Mutex::new(Collection::new(seed.authors, Author::id)),
            books: Mutex::new(Collection::new(seed.books, Book::id)),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("Simulated catalog state is poisoned"))
}

#[async_trait]
impl AuthorRepository for SimulatedCatalog {
    async fn create_author(&self, req: &NewAuthor) -> Result<Author, CreateAuthorError> {
        self.simulate_latency().await;

        let mut authors = lock(&self.authors).map_err(CreateAuthorError::Other)?;
        let author = Author::new(authors.next_id(), req.clone());
        authors.records.insert(0, author.clone());

        tracing::debug!(id = author.id(), name = %author.name(), "created simulated author");
        Ok(author)
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        self.simulate_latency().await;

        let authors = lock(&self.authors)?;
        Ok(authors.records.clone())
    }
}

#[async_trait]
impl BookRepository for SimulatedCatalog {
    async fn create_book(&self, req: &NewBook) -> Result<Book, CreateBookError> {
        self.simulate_latency().await;

        let mut books = lock(&self.books).map_err(CreateBookError::Other)?;
        let book = Book::new(books.next_id(), req.clone());
        books.records.insert(0, book.clone());

        tracing::debug!(id = book.id(), title = book.title(), "created simulated book");
        Ok(book)
    }

    async fn find_all_books(&self) -> Result<Vec<Book>, FindAllBooksError> {
        self.simulate_latency().await;

        let books = lock(&self.books)?;
        Ok(books.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane_austen_only() -> Seed {
        Seed {
            authors: vec![Author::new(
                1,
                NewAuthor::new(AuthorName::new_unchecked("Jane Austen")),
            )],
            books: Vec::new(),
        }
    }

    #[tokio::test]
    async fn created_book_gets_next_id_and_is_prepended() {
        let catalog = SimulatedCatalog::new(Seed::sample(), Duration::ZERO);
        let prior_max = catalog
            .find_all_books()
            .await
            .unwrap()
            .iter()
            .map(Book::id)
            .max()
            .unwrap();

        let created = catalog
            .create_book(&NewBook::new("Emma", 1, "111", 1815))
            .await
            .unwrap();

        assert_eq!(created.id(), prior_max + 1);
        let books = catalog.find_all_books().await.unwrap();
        assert_eq!(books.first(), Some(&created));
    }

    #[tokio::test]
    async fn ids_start_at_one_for_empty_seed() {
        let catalog = SimulatedCatalog::new(jane_austen_only(), Duration::ZERO);

        let first = catalog
            .create_book(&NewBook::new("Emma", 1, "111", 1815))
            .await
            .unwrap();
        let second = catalog
            .create_book(&NewBook::new("Persuasion", 1, "222", 1817))
            .await
            .unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
    }

    #[tokio::test]
    async fn created_author_follows_seed_ids() {
        let catalog = SimulatedCatalog::new(jane_austen_only(), Duration::ZERO);
        let req = NewAuthor::new(AuthorName::new("Mary Shelley").unwrap()).with_birth_year(1797);

        let author = catalog.create_author(&req).await.unwrap();

        assert_eq!(author.id(), 2);
        assert_eq!(author.birth_year(), Some(1797));
        let authors = catalog.find_all_authors().await.unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name().as_str(), "Mary Shelley");
    }

    #[tokio::test]
    async fn instances_do_not_share_state() {
        let first = SimulatedCatalog::new(jane_austen_only(), Duration::ZERO);
        let second = SimulatedCatalog::new(jane_austen_only(), Duration::ZERO);

        first
            .create_book(&NewBook::new("Emma", 1, "111", 1815))
            .await
            .unwrap();

        assert_eq!(first.find_all_books().await.unwrap().len(), 1);
        assert!(second.find_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_author_id_is_accepted() {
        let catalog = SimulatedCatalog::new(jane_austen_only(), Duration::ZERO);

        let book = catalog
            .create_book(&NewBook::new("Orphan", 99, "333", 2001))
            .await
            .unwrap();

        assert_eq!(book.author_id(), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn responses_wait_for_latency() {
        let catalog = SimulatedCatalog::new(Seed::sample(), Duration::from_millis(500));
        let started = tokio::time::Instant::now();

        catalog.find_all_authors().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
