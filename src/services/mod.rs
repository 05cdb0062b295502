//! Business logic services

pub mod auth;
pub mod books;
pub mod capabilities;
pub mod credentials;
pub mod csrf;
pub mod hooks;
pub mod roster;
pub mod validation;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub books: books::BooksService,
    pub roster: Arc<dyn roster::UserRoster>,
}

impl Services {
    /// Create all services with the given repository and oracle adapters
    pub fn new(
        repository: Repository,
        verifier: Arc<dyn credentials::CredentialVerifier>,
        roster: Arc<dyn roster::UserRoster>,
        csrf: Arc<csrf::CsrfService>,
        config: &AppConfig,
    ) -> Self {
        Self {
            auth: auth::AuthService::new(
                verifier,
                capabilities::CapabilityMapper::new(config.groups.clone()),
                csrf,
            ),
            books: books::BooksService::new(repository, config.lending.default_days),
            roster,
        }
    }
}
