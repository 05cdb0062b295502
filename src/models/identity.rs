//! Authenticated identity and capabilities attached to each request

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppError;

/// Library permissions derived from the groups reported by the auth hook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Capabilities {
    pub admin: bool,
    pub modify: bool,
    pub delete: bool,
    pub lend: bool,
}

/// Identity established by the authorization middleware
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: String,
    pub groups: BTreeSet<String>,
    pub capabilities: Capabilities,
    /// CSRF token issued for this request
    pub csrf_token: String,
}

impl Identity {
    pub fn can_lend(&self) -> bool {
        self.capabilities.lend
    }

    // Authorization checks
    pub fn require_modify(&self) -> Result<(), AppError> {
        if self.capabilities.modify {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to modify books".to_string()))
        }
    }

    pub fn require_delete(&self) -> Result<(), AppError> {
        if self.capabilities.delete {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to delete books".to_string()))
        }
    }

    pub fn require_lend(&self) -> Result<(), AppError> {
        if self.capabilities.lend {
            Ok(())
        } else {
            Err(AppError::Authorization("Insufficient rights to manage lendings".to_string()))
        }
    }
}
