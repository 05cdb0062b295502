//! Borrower roster provided by the users hook

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, AppResult};

use super::hooks::run_hook;

/// Source of borrower identities, one per entry
#[async_trait]
pub trait UserRoster: Send + Sync {
    async fn users(&self) -> AppResult<Vec<String>>;
}

/// Runs the users hook without arguments and reads one identity per line
#[derive(Debug, Clone)]
pub struct ProcessRoster {
    hook: PathBuf,
    timeout: Duration,
}

impl ProcessRoster {
    pub fn new(hook: PathBuf, timeout: Duration) -> Self {
        Self { hook, timeout }
    }
}

#[async_trait]
impl UserRoster for ProcessRoster {
    async fn users(&self) -> AppResult<Vec<String>> {
        run_hook(&self.hook, &[], self.timeout)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Fixed roster
#[derive(Debug, Clone, Default)]
pub struct StaticRoster(pub Vec<String>);

#[async_trait]
impl UserRoster for StaticRoster {
    async fn users(&self) -> AppResult<Vec<String>> {
        Ok(self.0.clone())
    }
}
