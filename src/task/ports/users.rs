//! User directory port used to validate assignees.

use crate::task::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory lookups.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Lookup contract for registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns whether `user_id` resolves to a registered user.
    async fn user_exists(&self, user_id: UserId) -> UserDirectoryResult<bool>;
}

/// Errors returned by user directory implementations.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Lookup failure.
    #[error("user lookup failed: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a lookup failure.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
