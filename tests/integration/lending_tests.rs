//! Lending sub-resource tests

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use crate::common::TestApp;

fn lending_uri(book: &Value) -> String {
    format!("/books/{}/lending", book["id"])
}

#[tokio::test]
async fn test_lend_book() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;

    let response = app
        .mutate(
            Method::POST,
            &lending_uri(&book),
            "lender",
            Some(json!({"user": "alice@school", "days": 7, "etag": book["etag"]})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text);

    let lending = response.json();
    assert_eq!(lending["user"], "alice@school");
    assert_eq!(lending["days"], 7);
    assert!(lending["since"].is_string());
    assert_eq!(lending["overdue"], false);
    assert_ne!(u64::from(response.etag()), book["etag"].as_u64().unwrap());

    let view = app.get(&format!("/books/{}/", book["id"]), "lender").await.json();
    assert_eq!(view["lent"], true);
    assert_eq!(view["lending"]["user"], "alice@school");
    assert_eq!(view["etag"].as_u64().unwrap(), u64::from(response.etag()));
}

#[tokio::test]
async fn test_lend_uses_default_days() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;

    let response = app
        .mutate(
            Method::POST,
            &lending_uri(&book),
            "lender",
            Some(json!({"user": "alice@school", "days": "not a number"})),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["days"], 14);
}

#[tokio::test]
async fn test_lend_to_other_user_while_lent() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let first = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let response = app
        .mutate(
            Method::POST,
            &uri,
            "lender",
            Some(json!({"user": "bob@school", "etag": first.etag()})),
        )
        .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);

    let lending = app.get(&uri, "lender").await.json();
    assert_eq!(lending["user"], "alice@school");
}

#[tokio::test]
async fn test_renew_keeps_since() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let first = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice@school", "days": 14})))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let renewed = app
        .mutate(
            Method::POST,
            &uri,
            "lender",
            Some(json!({"user": "alice@school", "days": 28, "etag": first.etag()})),
        )
        .await;
    assert_eq!(renewed.status, StatusCode::OK);
    assert_eq!(renewed.json()["since"], first.json()["since"]);
    assert_eq!(renewed.json()["days"], 28);
    assert_ne!(renewed.etag(), first.etag());
}

#[tokio::test]
async fn test_lend_with_stale_etag() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let stale = book["etag"].as_u64().unwrap() as u32 ^ 1;

    let response = app
        .mutate(
            Method::POST,
            &lending_uri(&book),
            "lender",
            Some(json!({"user": "alice@school", "etag": stale})),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let view = app.get(&format!("/books/{}/", book["id"]), "lender").await.json();
    assert_eq!(view["lent"], false);
}

#[tokio::test]
async fn test_lend_validation() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let response = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"days": 7})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice"})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .mutate(Method::POST, "/books/999/lending", "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lend_requires_capability() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let response = app
        .mutate(Method::POST, &uri, "editor", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    assert_eq!(app.get(&uri, "reader").await.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unlendable_book() {
    let app = TestApp::new();
    let response = app
        .mutate(
            Method::POST,
            "/books/",
            "admin",
            Some(json!({"title": "Reference", "lendable": false})),
        )
        .await;
    let book = response.json();

    let response = app
        .mutate(Method::POST, &lending_uri(&book), "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn test_reader_never_sees_lending() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let response = app
        .mutate(Method::POST, &lending_uri(&book), "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let view = app.get(&format!("/books/{}/", book["id"]), "reader").await.json();
    assert_eq!(view["lent"], true);
    assert!(view.get("lending").is_none());

    let books = app.get("/books/", "reader").await.json();
    let listed = &books[book["id"].to_string()];
    assert_eq!(listed["lent"], true);
    assert!(listed.get("lending").is_none());

    let books = app.get("/books/", "lender").await.json();
    assert_eq!(books[book["id"].to_string()]["lending"]["user"], "alice@school");
}

#[tokio::test]
async fn test_return_book() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let lent = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(lent.status, StatusCode::OK);

    let response = app.mutate(Method::DELETE, &uri, "lender", None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_ne!(response.etag(), lent.etag());

    assert_eq!(app.get(&uri, "lender").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.mutate(Method::DELETE, &uri, "lender", None).await.status, StatusCode::NOT_FOUND);

    let view = app.get(&format!("/books/{}/", book["id"]), "lender").await.json();
    assert_eq!(view["lent"], false);
    assert_eq!(view["etag"].as_u64().unwrap(), u64::from(response.etag()));
}

#[tokio::test]
async fn test_return_with_stale_if_match() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let lent = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice@school"})))
        .await;
    let stale = (lent.etag() ^ 1).to_string();
    let token = app.token("lender").await;

    let response = app
        .send(
            Method::DELETE,
            &uri,
            Some("lender"),
            &[("x-csrf-token", token.as_str()), ("if-match", stale.as_str())],
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(app.get(&uri, "lender").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_lend_missing_book_without_borrower() {
    let app = TestApp::new();
    let response = app
        .mutate(Method::POST, "/books/999/lending", "lender", Some(json!({})))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lend_stale_etag_without_borrower() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let stale = book["etag"].as_u64().unwrap() as u32 ^ 1;

    let response = app
        .mutate(Method::POST, &lending_uri(&book), "lender", Some(json!({"etag": stale})))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_lend_without_borrower_while_lent() {
    let app = TestApp::new();
    let book = app.create_book("Moby Dick").await;
    let uri = lending_uri(&book);

    let lent = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"user": "alice@school"})))
        .await;
    assert_eq!(lent.status, StatusCode::OK);

    let response = app
        .mutate(Method::POST, &uri, "lender", Some(json!({"etag": lent.etag()})))
        .await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(app.get(&uri, "lender").await.json()["user"], "alice@school");
}
