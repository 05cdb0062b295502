//! Authorization middleware: Basic credentials, identity and CSRF enforcement

use axum::{
    body::{self, Body},
    extract::{Query, Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use serde::Deserialize;

use crate::{error::AppError, AppState};

/// Header carrying the CSRF token, on requests and responses
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Fallback request header for the CSRF token
pub const XSRF_HEADER: &str = "x-xsrf-token";

const BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Deserialize)]
struct CsrfField {
    #[serde(rename = "_csrf")]
    csrf: Option<String>,
}

/// GET, HEAD and OPTIONS never change state and skip the CSRF check
fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Find the submitted CSRF token: body field, query parameter, then headers.
///
/// The body is buffered and handed back with the rebuilt request.
async fn submitted_token(request: Request) -> Result<(Request, Option<String>), AppError> {
    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;

    let from_body = serde_json::from_slice::<CsrfField>(&bytes)
        .ok()
        .and_then(|field| field.csrf);
    let from_query = Query::<CsrfField>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(field)| field.csrf);
    let from_headers = [CSRF_HEADER, XSRF_HEADER].iter().find_map(|name| {
        parts
            .headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });

    let token = from_body.or(from_query).or(from_headers);
    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

/// Authenticate every request against the oracle and enforce CSRF on mutating ones.
///
/// Nothing is kept between requests: credentials are verified each time.
pub async fn authorize(
    State(state): State<AppState>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(basic)) = credentials
        .ok_or_else(|| AppError::Authentication("Authentication required".to_string()))?;

    let identity = state
        .services
        .auth
        .authenticate(basic.username(), basic.password())
        .await?;

    let mut request = if is_safe(request.method()) {
        request
    } else {
        let (request, token) = submitted_token(request).await?;
        state.services.auth.check_csrf(Some(&identity), token.as_deref())?;
        request
    };

    let token = HeaderValue::from_str(&identity.csrf_token).ok();
    request.extensions_mut().insert(identity);

    let mut response = next.run(request).await;
    if let Some(token) = token {
        response.headers_mut().insert(CSRF_HEADER, token);
    }
    Ok(response)
}
