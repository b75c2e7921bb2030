//! Conversions between Diesel rows and domain types.

use super::models::{AssignmentRow, ChecklistItemRow, DependencyRow, TaskRow};
use crate::task::{
    domain::{
        AssignmentId, ChecklistItem, ChecklistItemId, ChecklistText, DependencyId,
        DependencyType, PersistedChecklistItemData, PersistedTaskData, ProjectId, Task,
        TaskAssignment, TaskDependency, TaskId, TaskPriority, TaskStatus, UserId,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};

pub(super) fn task_to_row(task: &Task) -> TaskRow {
    TaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        title: task.title().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        due_date: task.due_date(),
        estimated_hours: task.estimated_hours(),
        parent_task_id: task.parent_task_id().map(TaskId::into_inner),
        created_by: task.created_by().into_inner(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

pub(super) fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    let priority = TaskPriority::try_from(row.priority.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        title: row.title,
        status,
        priority,
        due_date: row.due_date,
        estimated_hours: row.estimated_hours,
        parent_task_id: row.parent_task_id.map(TaskId::from_uuid),
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(super) fn dependency_to_row(dependency: &TaskDependency) -> DependencyRow {
    DependencyRow {
        id: dependency.id().into_inner(),
        task_id: dependency.task_id().into_inner(),
        depends_on_task_id: dependency.depends_on_task_id().into_inner(),
        dependency_type: dependency.dependency_type().as_str().to_owned(),
        created_at: dependency.created_at(),
    }
}

pub(super) fn row_to_dependency(row: DependencyRow) -> TaskRepositoryResult<TaskDependency> {
    let dependency_type = DependencyType::try_from(row.dependency_type.as_str())
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    Ok(TaskDependency::from_persisted(
        DependencyId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        TaskId::from_uuid(row.depends_on_task_id),
        dependency_type,
        row.created_at,
    ))
}

pub(super) fn assignment_to_row(assignment: &TaskAssignment) -> AssignmentRow {
    AssignmentRow {
        id: assignment.id().into_inner(),
        task_id: assignment.task_id().into_inner(),
        user_id: assignment.user_id().into_inner(),
        assigned_at: assignment.assigned_at(),
        is_primary: assignment.is_primary(),
    }
}

pub(super) const fn row_to_assignment(row: &AssignmentRow) -> TaskAssignment {
    TaskAssignment::from_persisted(
        AssignmentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.user_id),
        row.assigned_at,
        row.is_primary,
    )
}

pub(super) fn checklist_item_to_row(item: &ChecklistItem) -> TaskRepositoryResult<ChecklistItemRow> {
    Ok(ChecklistItemRow {
        id: item.id().into_inner(),
        task_id: item.task_id().into_inner(),
        item_text: item.item_text().as_str().to_owned(),
        is_completed: item.is_completed(),
        order_index: to_db_index(item.order_index())?,
        created_at: item.created_at(),
        updated_at: item.updated_at(),
    })
}

pub(super) fn row_to_checklist_item(row: ChecklistItemRow) -> TaskRepositoryResult<ChecklistItem> {
    let order_index =
        u32::try_from(row.order_index).map_err(TaskRepositoryError::invalid_persisted_data)?;
    // Stored text predates any length limit now configured, so only emptiness
    // is checked here.
    let item_text = ChecklistText::new(row.item_text, usize::MAX)
        .map_err(TaskRepositoryError::invalid_persisted_data)?;
    Ok(ChecklistItem::from_persisted(PersistedChecklistItemData {
        id: ChecklistItemId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        item_text,
        is_completed: row.is_completed,
        order_index,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

pub(super) fn to_db_index(index: u32) -> TaskRepositoryResult<i32> {
    i32::try_from(index).map_err(TaskRepositoryError::invalid_persisted_data)
}

pub(super) fn to_db_position(position: usize) -> TaskRepositoryResult<i32> {
    i32::try_from(position).map_err(TaskRepositoryError::invalid_persisted_data)
}
