//! User assignments on a task.

use super::{AssignmentId, TaskId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A user assigned to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskAssignment {
    id: AssignmentId,
    task_id: TaskId,
    user_id: UserId,
    assigned_at: DateTime<Utc>,
    is_primary: bool,
}

impl TaskAssignment {
    /// Creates an assignment stamped with the current time.
    #[must_use]
    pub fn new(task_id: TaskId, user_id: UserId, is_primary: bool, clock: &impl Clock) -> Self {
        Self {
            id: AssignmentId::new(),
            task_id,
            user_id,
            assigned_at: clock.utc(),
            is_primary,
        }
    }

    /// Reconstructs an assignment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: AssignmentId,
        task_id: TaskId,
        user_id: UserId,
        assigned_at: DateTime<Utc>,
        is_primary: bool,
    ) -> Self {
        Self {
            id,
            task_id,
            user_id,
            assigned_at,
            is_primary,
        }
    }

    /// Returns the assignment identifier.
    #[must_use]
    pub const fn id(&self) -> AssignmentId {
        self.id
    }

    /// Returns the task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the assigned user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns when the user was assigned.
    #[must_use]
    pub const fn assigned_at(&self) -> DateTime<Utc> {
        self.assigned_at
    }

    /// Returns whether this is the task's primary assignee.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Sets or clears the primary flag.
    pub const fn set_primary(&mut self, is_primary: bool) {
        self.is_primary = is_primary;
    }
}

/// Sorts assignments primary-first, then most recently assigned first.
///
/// The sort is stable, so callers that pass rows newest-inserted first keep
/// that order among equal timestamps.
pub fn sort_primary_first(assignments: &mut [TaskAssignment]) {
    assignments.sort_by(|left, right| {
        right
            .is_primary
            .cmp(&left.is_primary)
            .then_with(|| right.assigned_at.cmp(&left.assigned_at))
    });
}
