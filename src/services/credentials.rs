//! Credential verification against an external authentication oracle

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::hooks::{run_hook, HookError};

/// Turns a username/password pair into the set of groups granted to it.
///
/// An empty set means unauthenticated. Implementations never distinguish a
/// wrong password from a failing oracle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> BTreeSet<String>;
}

/// Runs the auth hook as `<hook> <username> <password>` and reads one group per line
#[derive(Debug, Clone)]
pub struct ProcessVerifier {
    hook: PathBuf,
    timeout: Duration,
}

impl ProcessVerifier {
    pub fn new(hook: PathBuf, timeout: Duration) -> Self {
        Self { hook, timeout }
    }
}

#[async_trait]
impl CredentialVerifier for ProcessVerifier {
    async fn verify(&self, username: &str, password: &str) -> BTreeSet<String> {
        match run_hook(&self.hook, &[username, password], self.timeout).await {
            Ok(groups) => groups.into_iter().collect(),
            Err(e @ HookError::Timeout { .. }) => {
                tracing::warn!(user = %username, "Auth hook unavailable: {}", e);
                BTreeSet::new()
            }
            Err(e @ HookError::Spawn { .. }) => {
                tracing::error!(user = %username, "Auth hook unavailable: {}", e);
                BTreeSet::new()
            }
        }
    }
}

/// Verifier with a fixed table of accounts
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    accounts: HashMap<String, (String, BTreeSet<String>)>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account granted `groups`
    pub fn with_account<I, S>(mut self, username: &str, password: &str, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts.insert(
            username.to_string(),
            (password.to_string(), groups.into_iter().map(Into::into).collect()),
        );
        self
    }
}

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, username: &str, password: &str) -> BTreeSet<String> {
        match self.accounts.get(username) {
            Some((expected, groups)) if expected == password => groups.clone(),
            _ => BTreeSet::new(),
        }
    }
}
