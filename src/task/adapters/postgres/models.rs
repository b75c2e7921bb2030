//! Diesel row models for task relationship persistence.

use super::schema::{checklist_items, task_assignments, task_dependencies, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

/// Row model for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: Uuid,
    /// Owning project.
    pub project_id: Uuid,
    /// Task title.
    pub title: String,
    /// Workflow status.
    pub status: String,
    /// Urgency.
    pub priority: String,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
    /// Optional effort estimate in hours.
    pub estimated_hours: Option<f64>,
    /// Optional parent task.
    pub parent_task_id: Option<Uuid>,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Row model for dependency edges.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_dependencies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DependencyRow {
    /// Edge identifier.
    pub id: Uuid,
    /// Dependent task.
    pub task_id: Uuid,
    /// Task depended upon.
    pub depends_on_task_id: Uuid,
    /// Relationship label.
    pub dependency_type: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for assignments.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AssignmentRow {
    /// Assignment identifier.
    pub id: Uuid,
    /// Task.
    pub task_id: Uuid,
    /// Assigned user.
    pub user_id: Uuid,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
    /// Primary assignee flag.
    pub is_primary: bool,
}

/// Row model for checklist items.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = checklist_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChecklistItemRow {
    /// Item identifier.
    pub id: Uuid,
    /// Owning task.
    pub task_id: Uuid,
    /// Item text.
    pub item_text: String,
    /// Completion flag.
    pub is_completed: bool,
    /// Dense zero-based position.
    pub order_index: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
