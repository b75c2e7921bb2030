//! Repository port for tasks and the relationships attached to them.

use crate::task::domain::{
    AssignmentId, ChecklistItem, ChecklistItemId, DependencyId, Page, PageRequest, Task,
    TaskAssignment, TaskDependency, TaskId, TaskSnapshot, TaskWithAccess, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Persistence contract for tasks, dependencies, assignments, and checklists.
///
/// Methods documented as atomic must apply all of their row changes or none
/// of them; observers never see an intermediate state.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Loads a task together with its project ownership and membership.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task_with_access(
        &self,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskWithAccess>>;

    /// Stores a new dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateDependency`] when the
    /// `(task_id, depends_on_task_id)` pair already exists.
    async fn insert_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()>;

    /// Finds a dependency edge by identifier.
    async fn find_dependency(
        &self,
        id: DependencyId,
    ) -> TaskRepositoryResult<Option<TaskDependency>>;

    /// Returns whether the edge `task_id -> depends_on_task_id` exists.
    async fn dependency_exists(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> TaskRepositoryResult<bool>;

    /// Returns the targets of every outgoing edge of `task_id`.
    async fn dependency_targets(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskId>>;

    /// Deletes a dependency edge.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DependencyNotFound`] when the edge does
    /// not exist.
    async fn delete_dependency(&self, id: DependencyId) -> TaskRepositoryResult<()>;

    /// Lists outgoing edges of `task_id`, newest first.
    async fn list_dependencies(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>>;

    /// Lists incoming edges of `task_id` (tasks that depend on it), newest
    /// first.
    async fn list_dependents(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>>;

    /// Stores a new assignment.
    ///
    /// Atomic: when the assignment is primary, every other primary flag on the
    /// same task is cleared in the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateAssignment`] when the user is
    /// already assigned to the task.
    async fn insert_assignment(&self, assignment: &TaskAssignment) -> TaskRepositoryResult<()>;

    /// Finds an assignment by identifier.
    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>>;

    /// Finds the assignment of `user_id` on `task_id`.
    async fn find_assignment_for_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>>;

    /// Deletes an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::AssignmentNotFound`] when the assignment
    /// does not exist.
    async fn delete_assignment(&self, id: AssignmentId) -> TaskRepositoryResult<()>;

    /// Sets the primary flag of an assignment and returns the updated row.
    ///
    /// Atomic: when `is_primary` is true, every other primary flag on the task
    /// is cleared in the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::AssignmentNotFound`] when the assignment
    /// does not exist.
    async fn set_primary(
        &self,
        id: AssignmentId,
        is_primary: bool,
    ) -> TaskRepositoryResult<TaskAssignment>;

    /// Lists assignments of `task_id`, primary first then newest first.
    async fn list_assignments(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskAssignment>>;

    /// Returns every checklist item of `task_id` ordered by index.
    async fn checklist_items(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ChecklistItem>>;

    /// Finds a checklist item by identifier.
    async fn find_checklist_item(
        &self,
        id: ChecklistItemId,
    ) -> TaskRepositoryResult<Option<ChecklistItem>>;

    /// Inserts a checklist item at its order index.
    ///
    /// Atomic: items at or after that index move down by one.
    async fn insert_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()>;

    /// Persists text, completion, and timestamp changes of an item. The order
    /// index is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ChecklistItemNotFound`] when the item
    /// does not exist.
    async fn update_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()>;

    /// Deletes a checklist item.
    ///
    /// Atomic: items after the deleted one move up by one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ChecklistItemNotFound`] when the item
    /// does not exist.
    async fn delete_checklist_item(&self, id: ChecklistItemId) -> TaskRepositoryResult<()>;

    /// Sets `order_index = position` for every id in `ordered_ids`.
    ///
    /// Atomic. Callers must pass a complete permutation of the task's items.
    async fn apply_checklist_order(
        &self,
        task_id: TaskId,
        ordered_ids: &[ChecklistItemId],
    ) -> TaskRepositoryResult<()>;

    /// Loads the full relationship state of a task.
    ///
    /// Returns `None` when the task does not exist.
    async fn snapshot(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskSnapshot>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The dependency edge already exists.
    #[error("task {task_id} already depends on {depends_on_task_id}")]
    DuplicateDependency {
        /// Dependent task.
        task_id: TaskId,
        /// Task depended upon.
        depends_on_task_id: TaskId,
    },

    /// The user is already assigned to the task.
    #[error("user {user_id} is already assigned to task {task_id}")]
    DuplicateAssignment {
        /// Task.
        task_id: TaskId,
        /// Assigned user.
        user_id: UserId,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The dependency edge was not found.
    #[error("dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// The assignment was not found.
    #[error("assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// The checklist item was not found.
    #[error("checklist item not found: {0}")]
    ChecklistItemNotFound(ChecklistItemId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted task data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
