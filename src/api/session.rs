//! Session endpoints: current identity and borrower roster

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::identity::Capabilities, AppState};

use super::AuthenticatedUser;

/// Authenticated identity with the CSRF token to send back on mutating requests
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: String,
    pub groups: Vec<String>,
    pub capabilities: Capabilities,
    #[serde(rename = "_csrf")]
    pub csrf: String,
}

/// Current user, groups, capabilities and CSRF token
#[utoipa::path(
    get,
    path = "/",
    tag = "session",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Authenticated identity", body = SessionResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn whoami(AuthenticatedUser(identity): AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        groups: identity.groups.into_iter().collect(),
        capabilities: identity.capabilities,
        csrf: identity.csrf_token,
        user: identity.user,
    })
}

/// Borrower roster, one identity per line
#[utoipa::path(
    get,
    path = "/users/",
    tag = "session",
    security(("basic_auth" = [])),
    responses(
        (status = 200, description = "Plain-text list of borrowers", body = String, content_type = "text/plain"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Lend capability required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    identity.require_lend()?;

    let mut users = state.services.roster.users().await?.join("\n");
    if !users.is_empty() {
        users.push('\n');
    }

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], users))
}
