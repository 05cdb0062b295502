//! Lending sub-resource endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::{
    error::AppResult,
    models::book::{LendingInput, LendingView},
    AppState,
};

use super::{etag_header, if_match, AuthenticatedUser};

/// Get the current lending of a book
#[utoipa::path(
    get,
    path = "/books/{id}/lending",
    tag = "lending",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Current lending", body = LendingView),
        (status = 403, description = "Lend capability required"),
        (status = 404, description = "Book not found or not lent")
    )
)]
pub async fn get_lending(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let book = state.services.books.get_lending(&identity, id).await?;
    let lending = LendingView::new(book.lending.as_ref(), Utc::now());
    Ok((etag_header(book.etag), Json(lending)))
}

/// Lend a book, or renew the lending for its current borrower
#[utoipa::path(
    post,
    path = "/books/{id}/lending",
    tag = "lending",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("If-Match" = Option<u32>, Header, description = "Expected etag, alternative to the etag field")
    ),
    request_body = LendingInput,
    responses(
        (status = 200, description = "Book lent", body = LendingView),
        (status = 400, description = "Borrower missing or malformed"),
        (status = 403, description = "Lend capability required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book was modified since the given etag"),
        (status = 412, description = "Book is lent to another user or not lendable"),
        (status = 419, description = "CSRF token missing or expired")
    )
)]
pub async fn lend_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<LendingInput>,
) -> AppResult<impl IntoResponse> {
    let book = state
        .services
        .books
        .lend(&identity, id, input, if_match(&headers))
        .await?;
    let lending = LendingView::new(book.lending.as_ref(), Utc::now());
    Ok((etag_header(book.etag), Json(lending)))
}

/// Return a lent book
#[utoipa::path(
    delete,
    path = "/books/{id}/lending",
    tag = "lending",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("If-Match" = Option<u32>, Header, description = "Expected etag")
    ),
    responses(
        (status = 204, description = "Book returned; ETag carries the new book etag"),
        (status = 403, description = "Lend capability required"),
        (status = 404, description = "Book not found or not lent"),
        (status = 409, description = "Book was modified since the given etag"),
        (status = 419, description = "CSRF token missing or expired")
    )
)]
pub async fn return_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let book = state
        .services
        .books
        .return_book(&identity, id, if_match(&headers))
        .await?;
    Ok((StatusCode::NO_CONTENT, etag_header(book.etag)))
}
