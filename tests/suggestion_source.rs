use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use book_catalog::autofill::{AddBookForm, Field, NO_MATCHING_AUTHOR};
use book_catalog::build_suggestion_source;
use book_catalog::config::Config;
use book_catalog::http::{AppState, HttpServer, HttpServerConfig};
use book_catalog::models::{Author, AuthorName, NewAuthor};
use book_catalog::simulated::{Seed, SimulatedCatalog};
use book_catalog::suggestions::{GoogleBooks, SuggestionSource, SuggestionSourceError};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct FakeVolumes {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    status: Option<StatusCode>,
}

impl FakeVolumes {
    fn failing(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn queries(&self) -> Vec<HashMap<String, String>> {
        self.queries.lock().unwrap().clone()
    }
}

async fn volumes(
    State(fake): State<FakeVolumes>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    fake.queries.lock().unwrap().push(params);
    if let Some(status) = fake.status {
        return status.into_response();
    }

    axum::Json(json!({
        "kind": "books#volumes",
        "totalItems": 2,
        "items": [
            {"volumeInfo": {
                "title": "Emma",
                "authors": ["Jane Austen"],
                "publishedDate": "2003-05-01",
                "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9780141439587"}],
                "imageLinks": {"thumbnail": "http://books.google.com/emma"}
            }},
            {"volumeInfo": {
                "title": "Emma in the Night",
                "authors": ["Wendy Walker"]
            }}
        ]
    }))
    .into_response()
}

async fn spawn_fake_endpoint(fake: FakeVolumes) -> String {
    let router = Router::new()
        .route("/books/v1/volumes", get(volumes))
        .with_state(fake);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move { axum::serve(listener, router).await });

    format!("http://127.0.0.1:{port}/books/v1/volumes")
}

async fn spawn_fake(fake: FakeVolumes) -> GoogleBooks {
    GoogleBooks::new(&spawn_fake_endpoint(fake).await)
}

fn config_with_endpoint(endpoint: &str) -> Config {
    Config::from_source(|key| (key == "SUGGESTIONS_ENDPOINT").then(|| endpoint.to_string()))
        .unwrap()
}

fn authors() -> Vec<Author> {
    vec![Author::new(
        1,
        NewAuthor::new(AuthorName::new_unchecked("Jane Austen")),
    )]
}

#[tokio::test]
async fn short_query_never_reaches_the_service() {
    let fake = FakeVolumes::default();
    let source = spawn_fake(fake.clone()).await;

    let suggestions = source.search("Em").await.unwrap();

    assert!(suggestions.is_empty());
    assert!(fake.queries().is_empty());
}

#[tokio::test]
async fn query_is_sent_as_title_phrase() {
    let fake = FakeVolumes::default();
    let source = spawn_fake(fake.clone()).await;

    let suggestions = source.search(" Emma ").await.unwrap();

    let queries = fake.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0]["q"], "intitle:Emma");
    assert_eq!(queries[0]["maxResults"], "40");

    assert_eq!(suggestions.len(), 2);
    assert_eq!(suggestions[0].isbn, "9780141439587");
    assert_eq!(suggestions[0].published_year, 2003);
    assert_eq!(suggestions[0].thumbnail_url, "https://books.google.com/emma");
    assert_eq!(suggestions[1].isbn, "");
    assert_eq!(suggestions[1].published_year, 0);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let source = spawn_fake(FakeVolumes::failing(StatusCode::TOO_MANY_REQUESTS)).await;

    let err = source.search("Emma").await.unwrap_err();

    assert!(matches!(err, SuggestionSourceError::Status { status: 429 }));
}

#[tokio::test]
async fn form_fills_draft_from_picked_suggestion() {
    let source = spawn_fake(FakeVolumes::default()).await;
    let mut form = AddBookForm::new(authors());

    assert!(form.search_title("Emma", &source).await);
    assert!(form.pick(0));

    let draft = form.draft();
    assert_eq!(draft.title, "Emma");
    assert_eq!(draft.author_id, Some(1));
    assert_eq!(draft.isbn, "9780141439587");
    assert_eq!(draft.published_year, Some(2003));
    assert!(form.validate().is_ok());
}

#[tokio::test]
async fn unknown_suggested_author_needs_manual_pick() {
    let source = spawn_fake(FakeVolumes::default()).await;
    let mut form = AddBookForm::new(authors());
    form.search_title("Emma", &source).await;

    form.pick(1);

    assert_eq!(form.draft().author_id, None);
    assert_eq!(form.errors().get(Field::AuthorId), Some(NO_MATCHING_AUTHOR));
}

#[tokio::test]
async fn service_failure_leaves_an_empty_list() {
    let source = spawn_fake(FakeVolumes::failing(StatusCode::INTERNAL_SERVER_ERROR)).await;
    let mut form = AddBookForm::new(authors());

    assert!(form.search_title("Emma", &source).await);

    assert!(form.suggestions().is_empty());
    assert!(!form.is_searching());
}

#[tokio::test]
async fn configured_endpoint_is_the_one_queried() {
    let fake = FakeVolumes::default();
    let config = config_with_endpoint(&spawn_fake_endpoint(fake.clone()).await);
    let source = build_suggestion_source(&config);

    let suggestions = source.search("Emma").await.unwrap();

    assert_eq!(suggestions.len(), 2);
    assert_eq!(fake.queries().len(), 1);
}

#[tokio::test]
async fn server_relays_suggestions_from_configured_source() {
    let fake = FakeVolumes::default();
    let config = config_with_endpoint(&spawn_fake_endpoint(fake.clone()).await);
    let store = Arc::new(SimulatedCatalog::new(Seed::sample(), Duration::ZERO));
    let state = AppState::new(store, build_suggestion_source(&config));
    let server = HttpServer::new(state, HttpServerConfig::new(0))
        .await
        .unwrap();
    let port = server.local_addr().unwrap().port();
    tokio::spawn(server.run());

    let body: Value = reqwest::get(format!("http://127.0.0.1:{port}/api/suggestions?q=Emma"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(fake.queries()[0]["q"], "intitle:Emma");
    assert_eq!(body[0]["title"], "Emma");
    assert_eq!(body[0]["authorName"], "Jane Austen");
    assert_eq!(body[0]["publishedYear"], 2003);
}
