//! Directed dependency edges between tasks.

use super::{DependencyId, ParseEnumError, TaskId, TaskSummary};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of relationship an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    /// The source task blocks the target.
    Blocks,
    /// The source task is blocked by the target.
    BlockedBy,
    /// The tasks are related without ordering.
    RelatesTo,
}

impl DependencyType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::BlockedBy => "blocked_by",
            Self::RelatesTo => "relates_to",
        }
    }
}

impl TryFrom<&str> for DependencyType {
    type Error = ParseEnumError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blocks" => Ok(Self::Blocks),
            "blocked_by" => Ok(Self::BlockedBy),
            "relates_to" => Ok(Self::RelatesTo),
            _ => Err(ParseEnumError::new("dependency type", value)),
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge `task_id -> depends_on_task_id`.
///
/// Every edge type participates in cycle detection; the type only labels the
/// relationship for readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    id: DependencyId,
    task_id: TaskId,
    depends_on_task_id: TaskId,
    dependency_type: DependencyType,
    created_at: DateTime<Utc>,
}

impl TaskDependency {
    /// Creates a new edge stamped with the current time.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        depends_on_task_id: TaskId,
        dependency_type: DependencyType,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: DependencyId::new(),
            task_id,
            depends_on_task_id,
            dependency_type,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs an edge from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: DependencyId,
        task_id: TaskId,
        depends_on_task_id: TaskId,
        dependency_type: DependencyType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            depends_on_task_id,
            dependency_type,
            created_at,
        }
    }

    /// Returns the edge identifier.
    #[must_use]
    pub const fn id(&self) -> DependencyId {
        self.id
    }

    /// Returns the dependent task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the task depended upon.
    #[must_use]
    pub const fn depends_on_task_id(&self) -> TaskId {
        self.depends_on_task_id
    }

    /// Returns the relationship label.
    #[must_use]
    pub const fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A dependency edge enriched with the task on its far end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyView {
    /// The stored edge.
    pub dependency: TaskDependency,
    /// Summary of the task on the other end of the edge.
    pub related_task: TaskSummary,
}
