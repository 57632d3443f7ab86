use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use book_catalog::http::{AppState, HttpServer, HttpServerConfig};
use book_catalog::library::{Library, LoadError};
use book_catalog::models::{
    AuthorName, CreateBookError, FindAllBooksError, NewAuthor, NewBook, RequestFailure,
};
use book_catalog::remote::RemoteCatalog;
use book_catalog::repositories::{AuthorRepository, BookRepository};
use book_catalog::simulated::{Seed, SimulatedCatalog};
use book_catalog::suggestions::GoogleBooks;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_catalog_server() -> RemoteCatalog {
    let store = Arc::new(SimulatedCatalog::new(Seed::sample(), Duration::ZERO));
    let state = AppState::new(store, Arc::new(GoogleBooks::default()));
    let server = HttpServer::new(state, HttpServerConfig::new(0))
        .await
        .unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::spawn(server.run());

    RemoteCatalog::new(&format!("http://127.0.0.1:{port}/"))
}

async fn spawn_router(router: Router) -> RemoteCatalog {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move { axum::serve(listener, router).await });

    RemoteCatalog::new(&format!("http://127.0.0.1:{port}"))
}

#[tokio::test]
async fn lists_seeded_collections() {
    let catalog = spawn_catalog_server().await;

    let authors = catalog.find_all_authors().await.unwrap();
    let books = catalog.find_all_books().await.unwrap();

    assert_eq!(authors.len(), 5);
    assert_eq!(authors[0].name().as_str(), "Jane Austen");
    assert_eq!(books.len(), 6);
}

#[tokio::test]
async fn created_book_comes_back_with_new_id() {
    let catalog = spawn_catalog_server().await;
    let req = NewBook::new("Emma", 1, "111", 1815).with_cover_url("https://example.com/emma.jpg");

    let created = catalog.create_book(&req).await.unwrap();

    assert_eq!(created.id(), 7);
    assert_eq!(created.cover_url(), Some("https://example.com/emma.jpg"));
    let books = catalog.find_all_books().await.unwrap();
    assert_eq!(books[0], created);
}

#[tokio::test]
async fn created_author_keeps_optional_fields() {
    let catalog = spawn_catalog_server().await;
    let req = NewAuthor::new(AuthorName::new("Mary Shelley").unwrap())
        .with_country("United Kingdom")
        .with_birth_year(1797);

    let created = catalog.create_author(&req).await.unwrap();

    assert_eq!(created.id(), 6);
    assert_eq!(created.country(), Some("United Kingdom"));
    assert_eq!(created.birth_year(), Some(1797));
    assert_eq!(created.bio(), None);
}

#[tokio::test]
async fn invalid_payload_is_a_request_failure() {
    let catalog = spawn_catalog_server().await;

    let err = catalog
        .create_book(&NewBook::new("  ", 1, "111", 1815))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CreateBookError::Rejected(RequestFailure { status: 422 })
    ));
}

#[tokio::test]
async fn loads_library_through_remote_backend() {
    let catalog = spawn_catalog_server().await;

    let library = Library::load(&catalog).await.unwrap();

    assert_eq!(library.authors().len(), 5);
    assert_eq!(library.books().len(), 6);
}

#[tokio::test]
async fn failing_books_endpoint_aborts_the_load() {
    let router = Router::new()
        .route("/api/authors", get(|| async { "[]" }))
        .route(
            "/api/books",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
    let catalog = spawn_router(router).await;

    let err = Library::load(&catalog).await.unwrap_err();

    assert!(matches!(
        err,
        LoadError::Books(FindAllBooksError::Rejected(RequestFailure { status: 503 }))
    ));
}

#[tokio::test]
async fn unreachable_service_is_not_a_status_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let catalog = RemoteCatalog::new(&format!("http://127.0.0.1:{port}"));

    let err = catalog.find_all_books().await.unwrap_err();

    assert!(matches!(err, FindAllBooksError::Other(_)));
}
