//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, lending, session};

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Schoollibrary API",
        version = "0.2.0",
        description = "School library catalog and lending REST API. Mutating requests must carry \
                       the CSRF token from GET / in the `_csrf` body field, the `_csrf` query \
                       parameter or the `X-CSRF-Token` header.",
        license(name = "GPL-3.0-or-later", url = "https://www.gnu.org/licenses/gpl-3.0.html")
    ),
    paths(
        // Health
        health::health_check,
        // Session
        session::whoami,
        session::list_users,
        // Books
        books::list_books,
        books::create_book,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Lending
        lending::get_lending,
        lending::lend_book,
        lending::return_book,
    ),
    components(
        schemas(
            // Session
            session::SessionResponse,
            crate::models::identity::Capabilities,
            // Books
            crate::models::book::BookInput,
            crate::models::book::BookView,
            crate::models::book::BookIndex,
            // Lending
            crate::models::book::LendingInput,
            crate::models::book::LendingView,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BasicAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Identity, CSRF token and borrower roster"),
        (name = "books", description = "Catalog management"),
        (name = "lending", description = "Lending and returning books")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
