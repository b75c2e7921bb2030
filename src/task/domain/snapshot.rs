//! Full relationship state of a task, broadcast after every mutation.

use super::{
    AssignmentId, ChecklistItem, ChecklistItemId, DependencyId, ProjectId, Task, TaskAssignment,
    TaskDependency, TaskId, UserId, WorkspaceId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fresh state of a task and everything attached to it.
///
/// Subscribers receive whole snapshots rather than deltas so they never have
/// to reconcile a partially applied change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// The task itself.
    pub task: Task,
    /// Outgoing dependency edges, newest first.
    pub dependencies: Vec<TaskDependency>,
    /// Assignments, primary first then newest first.
    pub assignments: Vec<TaskAssignment>,
    /// Checklist items in order.
    pub checklist: Vec<ChecklistItem>,
}

/// The mutation that produced a [`TaskChangedEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskChange {
    /// A dependency edge was created.
    DependencyAdded {
        /// New edge.
        dependency_id: DependencyId,
    },
    /// A dependency edge was deleted.
    DependencyRemoved {
        /// Deleted edge.
        dependency_id: DependencyId,
    },
    /// A user was assigned.
    AssigneeAdded {
        /// New assignment.
        assignment_id: AssignmentId,
        /// Assigned user.
        user_id: UserId,
    },
    /// A user was unassigned.
    AssigneeRemoved {
        /// Unassigned user.
        user_id: UserId,
    },
    /// The primary flag of an assignment changed.
    PrimaryAssigneeChanged {
        /// Updated assignment.
        assignment_id: AssignmentId,
        /// New flag value.
        is_primary: bool,
    },
    /// A checklist item was created.
    ChecklistItemAdded {
        /// New item.
        item_id: ChecklistItemId,
    },
    /// A checklist item's text or completion changed.
    ChecklistItemUpdated {
        /// Updated item.
        item_id: ChecklistItemId,
    },
    /// A checklist item was deleted.
    ChecklistItemDeleted {
        /// Deleted item.
        item_id: ChecklistItemId,
    },
    /// The checklist order was rewritten.
    ChecklistReordered,
}

/// Notification that a task's relationships changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskChangedEvent {
    /// Changed task.
    pub task_id: TaskId,
    /// Project that owns the task.
    pub project_id: ProjectId,
    /// Workspace that owns the project.
    pub workspace_id: WorkspaceId,
    /// User who made the change.
    pub actor_id: UserId,
    /// What changed.
    pub change: TaskChange,
    /// State after the change.
    pub snapshot: TaskSnapshot,
    /// When the change was committed.
    pub occurred_at: DateTime<Utc>,
}

impl TaskChangedEvent {
    /// Serializes the event for a transport adapter.
    ///
    /// # Errors
    ///
    /// Returns a serialization error when a field can not be represented as
    /// JSON.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
