//! Book (catalog) endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    models::book::BookInput,
    AppState,
};

use super::{etag_header, if_match, AuthenticatedUser};

/// List all books, keyed by id
#[utoipa::path(
    get,
    path = "/books/",
    tag = "books",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "All books; lending details only for lenders. ETag is the XOR of all book etags", body = crate::models::book::BookIndex),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let (books, etag) = state.services.books.list(&identity).await?;
    Ok((etag_header(etag), Json(books)))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books/",
    tag = "books",
    security(("basic_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = crate::models::book::BookView),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Modify capability required"),
        (status = 419, description = "CSRF token missing or expired")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Json(input): Json<BookInput>,
) -> AppResult<impl IntoResponse> {
    let book = state.services.books.create(&identity, input).await?;
    Ok((StatusCode::CREATED, etag_header(book.etag), Json(book)))
}

/// Get a book by id
#[utoipa::path(
    get,
    path = "/books/{id}/",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = crate::models::book::BookView),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let book = state.services.books.get(&identity, id).await?;
    Ok((etag_header(book.etag), Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}/",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("If-Match" = Option<u32>, Header, description = "Expected etag, alternative to the etag field")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = crate::models::book::BookView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Modify capability required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book was modified since the given etag"),
        (status = 419, description = "CSRF token missing or expired")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(input): Json<BookInput>,
) -> AppResult<impl IntoResponse> {
    let book = state
        .services
        .books
        .update(&identity, id, input, if_match(&headers))
        .await?;
    Ok((etag_header(book.etag), Json(book)))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}/",
    tag = "books",
    security(("basic_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Delete capability required"),
        (status = 404, description = "Book not found"),
        (status = 419, description = "CSRF token missing or expired")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.books.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
