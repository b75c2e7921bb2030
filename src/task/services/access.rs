//! Membership-based access gate.

use crate::task::{
    domain::{TaskId, TaskWithAccess, UserId},
    ports::{AccessError, AccessGate, AccessResult, TaskRepository},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Authorizes actors who own the task's workspace or belong to its project.
///
/// Membership is re-read from the repository on every call.
#[derive(Clone)]
pub struct MembershipAccessGate<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> MembershipAccessGate<R>
where
    R: TaskRepository,
{
    /// Creates a gate backed by `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R> AccessGate for MembershipAccessGate<R>
where
    R: TaskRepository,
{
    async fn authorize(&self, task_id: TaskId, actor_id: UserId) -> AccessResult<TaskWithAccess> {
        let loaded = self
            .repository
            .find_task_with_access(task_id)
            .await?
            .ok_or(AccessError::TaskNotFound(task_id))?;

        if !loaded.access.permits(actor_id) {
            tracing::debug!(%task_id, %actor_id, "actor is not a member of the task's project");
            return Err(AccessError::Forbidden {
                actor_id,
                project_id: loaded.access.project_id(),
            });
        }
        Ok(loaded)
    }
}
