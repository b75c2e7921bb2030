//! Domain model for task relationships.
//!
//! Tasks, the dependency edges between them, their assignees, and their
//! checklists. Everything here is free of infrastructure concerns; ordering
//! and permutation rules live next to the types they govern so services can
//! validate a full batch before writing.

mod access;
mod assignment;
mod checklist;
mod dependency;
mod error;
mod ids;
mod page;
mod snapshot;
mod task;

pub use access::{ProjectAccess, TaskWithAccess};
pub use assignment::{TaskAssignment, sort_primary_first};
pub use checklist::{
    CHECKLIST_TEXT_MAX_CHARS, ChecklistItem, ChecklistItemPatch, ChecklistText,
    PersistedChecklistItemData, apply_order, insertion_index, is_complete_permutation,
    move_to_position, next_order_index, sorted_by_order,
};
pub use dependency::{DependencyType, DependencyView, TaskDependency};
pub use error::{ParseEnumError, TaskRelationDomainError};
pub use ids::{
    AssignmentId, ChecklistItemId, DependencyId, ProjectId, TaskId, UserId, WorkspaceId,
};
pub use page::{Page, PageRequest};
pub use snapshot::{TaskChange, TaskChangedEvent, TaskSnapshot};
pub use task::{PersistedTaskData, Task, TaskPriority, TaskStatus, TaskSummary};
