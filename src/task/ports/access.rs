//! Authorization port consulted at the top of every relationship operation.

use crate::task::domain::{ProjectId, TaskId, TaskWithAccess, UserId};
use crate::task::ports::TaskRepositoryError;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for access checks.
pub type AccessResult<T> = Result<T, AccessError>;

/// Decides whether an actor may work on a task.
///
/// Implementations must derive the decision from current membership on each
/// call and must not cache it across calls.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Loads `task_id` with its membership context and checks `actor_id`
    /// against it.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::TaskNotFound`] when the task does not exist and
    /// [`AccessError::Forbidden`] when the actor neither owns the workspace nor
    /// belongs to the project.
    async fn authorize(&self, task_id: TaskId, actor_id: UserId) -> AccessResult<TaskWithAccess>;
}

/// Errors returned by access gates.
#[derive(Debug, Clone, Error)]
pub enum AccessError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The actor may not access the task's project.
    #[error("user {actor_id} may not access project {project_id}")]
    Forbidden {
        /// Rejected actor.
        actor_id: UserId,
        /// Project the task belongs to.
        project_id: ProjectId,
    },

    /// Loading the membership context failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}
