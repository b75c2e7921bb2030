//! `PostgreSQL` user directory.

use super::{repository::TaskPgPool, schema::users};
use crate::task::{
    domain::UserId,
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// Resolves assignees against the `users` table.
#[derive(Debug, Clone)]
pub struct PostgresUserDirectory {
    pool: TaskPgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory backed by `pool`.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn user_exists(&self, user_id: UserId) -> UserDirectoryResult<bool> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(UserDirectoryError::lookup)?;
            diesel::select(diesel::dsl::exists(
                users::table.filter(users::id.eq(user_id.into_inner())),
            ))
            .get_result::<bool>(&mut connection)
            .map_err(UserDirectoryError::lookup)
        })
        .await
        .map_err(UserDirectoryError::lookup)?
    }
}
