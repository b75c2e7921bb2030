//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe set of registered users.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    ///
    /// # Errors
    ///
    /// Returns lookup errors when lock acquisition fails.
    pub fn register(&self, user_id: UserId) -> UserDirectoryResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|err| UserDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        users.insert(user_id);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn user_exists(&self, user_id: UserId) -> UserDirectoryResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|err| UserDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(users.contains(&user_id))
    }
}
