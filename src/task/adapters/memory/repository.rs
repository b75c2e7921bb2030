//! In-memory repository for task relationship tests and local flows.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        AssignmentId, ChecklistItem, ChecklistItemId, DependencyId, Page, PageRequest,
        ProjectAccess, ProjectId, Task, TaskAssignment, TaskDependency, TaskId, TaskSnapshot,
        TaskWithAccess, UserId, apply_order, sort_primary_first, sorted_by_order,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Every atomic batch in the [`TaskRepository`] contract runs under a single
/// write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    projects: HashMap<ProjectId, ProjectAccess>,
    // Rows are kept in insertion order so listings can break timestamp ties.
    dependencies: Vec<TaskDependency>,
    assignments: Vec<TaskAssignment>,
    checklist: Vec<ChecklistItem>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the ownership and membership of a project.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn register_project(&self, access: ProjectAccess) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.projects.insert(access.project_id(), access);
        Ok(())
    }

    /// Removes a member from a registered project.
    ///
    /// Unknown projects are ignored.
    ///
    /// # Errors
    ///
    /// Returns persistence errors when lock acquisition fails.
    pub fn revoke_membership(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let rebuilt = state.projects.get(&project_id).map(|access| {
            let remaining = access
                .member_ids()
                .iter()
                .copied()
                .filter(|member| *member != user_id);
            ProjectAccess::new(
                access.project_id(),
                access.workspace_id(),
                access.workspace_owner_id(),
            )
            .with_members(remaining)
        });
        if let Some(access) = rebuilt {
            state.projects.insert(project_id, access);
        }
        Ok(())
    }

    fn read_state(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl InMemoryTaskState {
    fn dependencies_newest_first(
        &self,
        matches: impl Fn(&TaskDependency) -> bool,
    ) -> Vec<TaskDependency> {
        let mut rows: Vec<TaskDependency> = self
            .dependencies
            .iter()
            .rev()
            .filter(|dependency| matches(dependency))
            .cloned()
            .collect();
        rows.sort_by_key(|dependency| std::cmp::Reverse(dependency.created_at()));
        rows
    }

    fn assignments_for(&self, task_id: TaskId) -> Vec<TaskAssignment> {
        let mut rows: Vec<TaskAssignment> = self
            .assignments
            .iter()
            .rev()
            .filter(|assignment| assignment.task_id() == task_id)
            .cloned()
            .collect();
        sort_primary_first(&mut rows);
        rows
    }

    fn checklist_for(&self, task_id: TaskId) -> Vec<ChecklistItem> {
        let rows: Vec<ChecklistItem> = self
            .checklist
            .iter()
            .filter(|item| item.task_id() == task_id)
            .cloned()
            .collect();
        sorted_by_order(&rows)
    }

    /// Rewrites the order of `task_id`'s items to match `ordered_ids`.
    fn reorder(&mut self, task_id: TaskId, ordered_ids: &[ChecklistItemId]) {
        let mut items: Vec<ChecklistItem> = self
            .checklist
            .iter()
            .filter(|item| item.task_id() == task_id)
            .cloned()
            .collect();
        apply_order(&mut items, ordered_ids);
        for updated in items {
            if let Some(slot) = self.checklist.iter_mut().find(|item| item.id() == updated.id()) {
                *slot = updated;
            }
        }
    }

    fn demote_primaries(&mut self, task_id: TaskId, keep: AssignmentId) {
        for assignment in &mut self.assignments {
            if assignment.task_id() == task_id && assignment.id() != keep {
                assignment.set_primary(false);
            }
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.read_state()?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_task_with_access(
        &self,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskWithAccess>> {
        let state = self.read_state()?;
        let Some(task) = state.tasks.get(&id) else {
            return Ok(None);
        };
        let access = state.projects.get(&task.project_id()).ok_or_else(|| {
            TaskRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                "project {} of task {id} is not registered",
                task.project_id()
            )))
        })?;
        Ok(Some(TaskWithAccess {
            task: task.clone(),
            access: access.clone(),
        }))
    }

    async fn insert_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let duplicate = state.dependencies.iter().any(|existing| {
            existing.task_id() == dependency.task_id()
                && existing.depends_on_task_id() == dependency.depends_on_task_id()
        });
        if duplicate {
            return Err(TaskRepositoryError::DuplicateDependency {
                task_id: dependency.task_id(),
                depends_on_task_id: dependency.depends_on_task_id(),
            });
        }
        state.dependencies.push(dependency.clone());
        Ok(())
    }

    async fn find_dependency(
        &self,
        id: DependencyId,
    ) -> TaskRepositoryResult<Option<TaskDependency>> {
        let state = self.read_state()?;
        Ok(state
            .dependencies
            .iter()
            .find(|dependency| dependency.id() == id)
            .cloned())
    }

    async fn dependency_exists(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        let state = self.read_state()?;
        Ok(state.dependencies.iter().any(|dependency| {
            dependency.task_id() == task_id && dependency.depends_on_task_id() == depends_on_task_id
        }))
    }

    async fn dependency_targets(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskId>> {
        let state = self.read_state()?;
        Ok(state
            .dependencies
            .iter()
            .filter(|dependency| dependency.task_id() == task_id)
            .map(TaskDependency::depends_on_task_id)
            .collect())
    }

    async fn delete_dependency(&self, id: DependencyId) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let before = state.dependencies.len();
        state.dependencies.retain(|dependency| dependency.id() != id);
        if state.dependencies.len() == before {
            return Err(TaskRepositoryError::DependencyNotFound(id));
        }
        Ok(())
    }

    async fn list_dependencies(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>> {
        let state = self.read_state()?;
        let rows = state.dependencies_newest_first(|dependency| dependency.task_id() == task_id);
        Ok(page.slice(rows))
    }

    async fn list_dependents(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>> {
        let state = self.read_state()?;
        let rows = state
            .dependencies_newest_first(|dependency| dependency.depends_on_task_id() == task_id);
        Ok(page.slice(rows))
    }

    async fn insert_assignment(&self, assignment: &TaskAssignment) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let duplicate = state.assignments.iter().any(|existing| {
            existing.task_id() == assignment.task_id() && existing.user_id() == assignment.user_id()
        });
        if duplicate {
            return Err(TaskRepositoryError::DuplicateAssignment {
                task_id: assignment.task_id(),
                user_id: assignment.user_id(),
            });
        }
        if assignment.is_primary() {
            state.demote_primaries(assignment.task_id(), assignment.id());
        }
        state.assignments.push(assignment.clone());
        Ok(())
    }

    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(state
            .assignments
            .iter()
            .find(|assignment| assignment.id() == id)
            .cloned())
    }

    async fn find_assignment_for_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(state
            .assignments
            .iter()
            .find(|assignment| assignment.task_id() == task_id && assignment.user_id() == user_id)
            .cloned())
    }

    async fn delete_assignment(&self, id: AssignmentId) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let before = state.assignments.len();
        state.assignments.retain(|assignment| assignment.id() != id);
        if state.assignments.len() == before {
            return Err(TaskRepositoryError::AssignmentNotFound(id));
        }
        Ok(())
    }

    async fn set_primary(
        &self,
        id: AssignmentId,
        is_primary: bool,
    ) -> TaskRepositoryResult<TaskAssignment> {
        let mut state = self.write_state()?;
        let task_id = state
            .assignments
            .iter()
            .find(|assignment| assignment.id() == id)
            .map(TaskAssignment::task_id)
            .ok_or(TaskRepositoryError::AssignmentNotFound(id))?;
        if is_primary {
            state.demote_primaries(task_id, id);
        }
        let updated = state
            .assignments
            .iter_mut()
            .find(|assignment| assignment.id() == id)
            .ok_or(TaskRepositoryError::AssignmentNotFound(id))?;
        updated.set_primary(is_primary);
        Ok(updated.clone())
    }

    async fn list_assignments(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskAssignment>> {
        let state = self.read_state()?;
        Ok(page.slice(state.assignments_for(task_id)))
    }

    async fn checklist_items(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ChecklistItem>> {
        let state = self.read_state()?;
        Ok(state.checklist_for(task_id))
    }

    async fn find_checklist_item(
        &self,
        id: ChecklistItemId,
    ) -> TaskRepositoryResult<Option<ChecklistItem>> {
        let state = self.read_state()?;
        Ok(state.checklist.iter().find(|item| item.id() == id).cloned())
    }

    async fn insert_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let mut ordered: Vec<ChecklistItemId> = state
            .checklist_for(item.task_id())
            .iter()
            .map(ChecklistItem::id)
            .collect();
        let position = usize::try_from(item.order_index())
            .map_or(ordered.len(), |index| index.min(ordered.len()));
        ordered.insert(position, item.id());
        state.checklist.push(item.clone());
        state.reorder(item.task_id(), &ordered);
        Ok(())
    }

    async fn update_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .checklist
            .iter_mut()
            .find(|existing| existing.id() == item.id())
            .ok_or(TaskRepositoryError::ChecklistItemNotFound(item.id()))?;
        let order_index = stored.order_index();
        *stored = item.clone();
        stored.set_order_index(order_index);
        Ok(())
    }

    async fn delete_checklist_item(&self, id: ChecklistItemId) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        let task_id = state
            .checklist
            .iter()
            .find(|item| item.id() == id)
            .map(ChecklistItem::task_id)
            .ok_or(TaskRepositoryError::ChecklistItemNotFound(id))?;
        state.checklist.retain(|item| item.id() != id);
        let remaining: Vec<ChecklistItemId> = state
            .checklist_for(task_id)
            .iter()
            .map(ChecklistItem::id)
            .collect();
        state.reorder(task_id, &remaining);
        Ok(())
    }

    async fn apply_checklist_order(
        &self,
        task_id: TaskId,
        ordered_ids: &[ChecklistItemId],
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write_state()?;
        state.reorder(task_id, ordered_ids);
        Ok(())
    }

    async fn snapshot(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskSnapshot>> {
        let state = self.read_state()?;
        let Some(task) = state.tasks.get(&task_id) else {
            return Ok(None);
        };
        Ok(Some(TaskSnapshot {
            task: task.clone(),
            dependencies: state.dependencies_newest_first(|dependency| {
                dependency.task_id() == task_id
            }),
            assignments: state.assignments_for(task_id),
            checklist: state.checklist_for(task_id),
        }))
    }
}
