//! Authentication: credentials to identity, capabilities and CSRF token

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::identity::Identity,
};

use super::{capabilities::CapabilityMapper, credentials::CredentialVerifier, csrf::CsrfService};

#[derive(Clone)]
pub struct AuthService {
    verifier: Arc<dyn CredentialVerifier>,
    mapper: CapabilityMapper,
    csrf: Arc<CsrfService>,
}

impl AuthService {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        mapper: CapabilityMapper,
        csrf: Arc<CsrfService>,
    ) -> Self {
        Self {
            verifier,
            mapper,
            csrf,
        }
    }

    /// Verify credentials with the oracle and build the request identity.
    ///
    /// Every successful call issues a fresh CSRF token.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Identity> {
        let groups = self.verifier.verify(username, password).await;
        if groups.is_empty() {
            tracing::info!(user = %username, "Authentication failed");
            return Err(AppError::Authentication("Authentication required".to_string()));
        }

        let capabilities = self.mapper.derive(&groups);
        tracing::debug!(user = %username, ?capabilities, "Authenticated");

        Ok(Identity {
            user: username.to_string(),
            groups,
            capabilities,
            csrf_token: self.csrf.issue(username),
        })
    }

    /// Check the token submitted with a state-changing request
    pub fn check_csrf(&self, identity: Option<&Identity>, token: Option<&str>) -> AppResult<()> {
        let user = identity.map(|identity| identity.user.as_str());
        if self.csrf.validate(user, token) {
            Ok(())
        } else {
            tracing::warn!(user = ?user, token_present = token.is_some(), "Rejected CSRF token");
            Err(AppError::Csrf)
        }
    }
}
