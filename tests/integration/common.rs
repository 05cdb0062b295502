//! Test application harness

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use schoollibrary_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::{credentials::StaticVerifier, csrf::CsrfService, roster::StaticRoster, Services},
    AppState,
};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).expect("response is not JSON")
    }

    pub fn etag(&self) -> u32 {
        self.headers
            .get(header::ETAG)
            .expect("no ETag header")
            .to_str()
            .unwrap()
            .parse()
            .unwrap()
    }
}

pub struct TestApp {
    router: Router,
    pub csrf: Arc<CsrfService>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::default();
        let verifier = StaticVerifier::new()
            .with_account("admin", "admin", ["user", "library_admin"])
            .with_account("editor", "editor", ["user", "library_modify"])
            .with_account("lender", "lender", ["user", "library_lend"])
            .with_account("reader", "reader", ["user"]);
        let roster = StaticRoster(vec!["alice@school".into(), "bob@school".into()]);
        let csrf = Arc::new(CsrfService::new(Duration::from_secs(86400), Utc::now()));

        let services = Services::new(
            Repository::in_memory(),
            Arc::new(verifier),
            Arc::new(roster),
            csrf.clone(),
            &config,
        );

        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
        };

        Self {
            router: api::create_router(state),
            csrf,
        }
    }

    /// Send a request as `user` (password equals the username)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let mut request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        if let Some(user) = user {
            request
                .headers_mut()
                .typed_insert(Authorization::basic(user, user));
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            text: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str, user: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(user), &[], None).await
    }

    /// CSRF token handed out to `user`
    pub async fn token(&self, user: &str) -> String {
        let response = self.get("/", user).await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["_csrf"].as_str().unwrap().to_string()
    }

    /// Mutating request carrying a valid CSRF token in the header
    pub async fn mutate(&self, method: Method, uri: &str, user: &str, body: Option<Value>) -> TestResponse {
        let token = self.token(user).await;
        self.send(method, uri, Some(user), &[("x-csrf-token", token.as_str())], body)
            .await
    }

    /// Create a book as admin and return its JSON
    pub async fn create_book(&self, title: &str) -> Value {
        let response = self
            .mutate(Method::POST, "/books/", "admin", Some(serde_json::json!({ "title": title })))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()
    }
}
