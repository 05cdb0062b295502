//! API handlers for the schoollibrary REST endpoints

pub mod auth;
pub mod books;
pub mod health;
pub mod lending;
pub mod openapi;
pub mod session;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::book::Etag, models::identity::Identity, AppState};

/// Extractor for the identity established by [`auth::authorize`]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))
    }
}

/// Etag from an `If-Match` header, if one was sent
pub fn if_match(headers: &HeaderMap) -> Option<Etag> {
    let value = headers.get(header::IF_MATCH)?.to_str().ok()?.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    value.trim_matches('"').parse().ok()
}

/// `ETag` response header
pub fn etag_header(etag: Etag) -> [(header::HeaderName, String); 1] {
    [(header::ETAG, etag.to_string())]
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            header::ETAG,
            header::HeaderName::from_static(auth::CSRF_HEADER),
        ]);

    // Everything below requires authentication
    let library = Router::new()
        .route("/", get(session::whoami))
        .route("/users/", get(session::list_users))
        .route("/books/", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id/",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route(
            "/books/:id/lending",
            get(lending::get_lending)
                .post(lending::lend_book)
                .delete(lending::return_book),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::authorize));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(library)
        .with_state(state)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
