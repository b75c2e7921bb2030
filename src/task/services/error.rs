//! Service-level errors shared by every relationship operation.

use crate::task::{
    domain::{
        AssignmentId, ChecklistItemId, DependencyId, ProjectId, TaskId, TaskRelationDomainError,
        UserId,
    },
    ports::{AccessError, TaskRepositoryError, UserDirectoryError},
};
use std::fmt;
use thiserror::Error;

/// The entity a `NotFound` failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    /// A task.
    Task(TaskId),
    /// A dependency edge, or one that belongs to a different task.
    Dependency(DependencyId),
    /// An assignment, or one that belongs to a different task.
    Assignment(AssignmentId),
    /// No assignment of this user exists on the task.
    AssigneeOnTask {
        /// Task searched.
        task_id: TaskId,
        /// User searched for.
        user_id: UserId,
    },
    /// A checklist item, or one that belongs to a different task.
    ChecklistItem(ChecklistItemId),
    /// A user that is not registered.
    User(UserId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Dependency(id) => write!(f, "dependency {id}"),
            Self::Assignment(id) => write!(f, "assignment {id}"),
            Self::AssigneeOnTask { task_id, user_id } => {
                write!(f, "assignment of user {user_id} on task {task_id}")
            }
            Self::ChecklistItem(id) => write!(f, "checklist item {id}"),
            Self::User(id) => write!(f, "user {id}"),
        }
    }
}

/// Why a `Forbidden` failure was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// The actor is neither workspace owner nor project member.
    NotProjectMember {
        /// Rejected actor.
        actor_id: UserId,
        /// Project of the task.
        project_id: ProjectId,
    },
    /// A task may not depend on itself.
    SelfDependency(TaskId),
    /// Both ends of a dependency must belong to the same project.
    CrossProjectDependency {
        /// Project of the dependent task.
        task_project: ProjectId,
        /// Project of the task depended upon.
        target_project: ProjectId,
    },
    /// The edge already exists.
    DuplicateDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Task depended upon.
        depends_on_task_id: TaskId,
    },
    /// The edge would close a cycle.
    DependencyCycle {
        /// Dependent task.
        task_id: TaskId,
        /// Task depended upon.
        depends_on_task_id: TaskId,
    },
    /// The user is already assigned to the task.
    DuplicateAssignment {
        /// Task.
        task_id: TaskId,
        /// User.
        user_id: UserId,
    },
    /// A reorder submission is not a permutation of the task's items.
    ChecklistOrderMismatch {
        /// Items currently on the task.
        expected: usize,
        /// Ids submitted.
        submitted: usize,
    },
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotProjectMember {
                actor_id,
                project_id,
            } => write!(f, "user {actor_id} may not access project {project_id}"),
            Self::SelfDependency(task_id) => write!(f, "task {task_id} can not depend on itself"),
            Self::CrossProjectDependency {
                task_project,
                target_project,
            } => write!(
                f,
                "dependencies must stay within one project ({task_project} vs {target_project})"
            ),
            Self::DuplicateDependency {
                task_id,
                depends_on_task_id,
            } => write!(f, "task {task_id} already depends on {depends_on_task_id}"),
            Self::DependencyCycle {
                task_id,
                depends_on_task_id,
            } => write!(
                f,
                "making {task_id} depend on {depends_on_task_id} would create a cycle"
            ),
            Self::DuplicateAssignment { task_id, user_id } => {
                write!(f, "user {user_id} is already assigned to task {task_id}")
            }
            Self::ChecklistOrderMismatch {
                expected,
                submitted,
            } => write!(
                f,
                "reorder must list each of the {expected} checklist items exactly once, got {submitted} ids"
            ),
        }
    }
}

/// Errors returned by the relationship services.
#[derive(Debug, Error)]
pub enum TaskRelationError {
    /// A referenced entity does not exist or belongs to another task.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// The operation is not allowed.
    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskRelationDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User lookup failed.
    #[error(transparent)]
    Users(#[from] UserDirectoryError),
}

impl TaskRelationError {
    /// Returns whether this is a `NotFound` failure.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns whether this is a `Forbidden` failure.
    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<AccessError> for TaskRelationError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::TaskNotFound(task_id) => Self::NotFound(MissingEntity::Task(task_id)),
            AccessError::Forbidden {
                actor_id,
                project_id,
            } => Self::Forbidden(ForbiddenReason::NotProjectMember {
                actor_id,
                project_id,
            }),
            AccessError::Repository(source) => Self::Repository(source),
        }
    }
}

/// Result type for relationship service operations.
pub type TaskRelationResult<T> = Result<T, TaskRelationError>;
