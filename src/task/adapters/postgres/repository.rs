//! `PostgreSQL` repository implementation for task relationship storage.

use super::{
    conversion::{
        assignment_to_row, checklist_item_to_row, dependency_to_row, row_to_assignment,
        row_to_checklist_item, row_to_dependency, row_to_task, task_to_row, to_db_position,
    },
    models::{AssignmentRow, ChecklistItemRow, DependencyRow, TaskRow},
    schema::{
        checklist_items, project_members, projects, task_assignments, task_dependencies, tasks,
        workspaces,
    },
};
use crate::task::{
    domain::{
        AssignmentId, ChecklistItem, ChecklistItemId, DependencyId, Page, PageRequest,
        ProjectAccess, ProjectId, Task, TaskAssignment, TaskDependency, TaskId, TaskSnapshot,
        TaskWithAccess, UserId, WorkspaceId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const DEPENDENCY_PAIR_CONSTRAINT: &str = "uq_task_dependencies_pair";
const ASSIGNMENT_USER_CONSTRAINT: &str = "uq_task_assignments_task_user";

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed task repository.
///
/// Multi-row batches run inside one transaction. The schema backs the
/// single-primary rule with a partial unique index, so concurrent primary
/// changes can not both commit.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store_task(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task);
        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    other => TaskRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| load_task(connection, id))
            .await
    }

    async fn find_task_with_access(
        &self,
        id: TaskId,
    ) -> TaskRepositoryResult<Option<TaskWithAccess>> {
        self.run_blocking(move |connection| {
            let Some(task) = load_task(connection, id)? else {
                return Ok(None);
            };
            let access = load_project_access(connection, task.project_id())?;
            Ok(Some(TaskWithAccess { task, access }))
        })
        .await
    }

    async fn insert_dependency(&self, dependency: &TaskDependency) -> TaskRepositoryResult<()> {
        let task_id = dependency.task_id();
        let depends_on_task_id = dependency.depends_on_task_id();
        let row = dependency_to_row(dependency);
        self.run_blocking(move |connection| {
            diesel::insert_into(task_dependencies::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if violates(info.as_ref(), DEPENDENCY_PAIR_CONSTRAINT) =>
                    {
                        TaskRepositoryError::DuplicateDependency {
                            task_id,
                            depends_on_task_id,
                        }
                    }
                    other => TaskRepositoryError::persistence(other),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_dependency(
        &self,
        id: DependencyId,
    ) -> TaskRepositoryResult<Option<TaskDependency>> {
        self.run_blocking(move |connection| {
            let row = task_dependencies::table
                .find(id.into_inner())
                .select(DependencyRow::as_select())
                .first::<DependencyRow>(connection)
                .optional()?;
            row.map(row_to_dependency).transpose()
        })
        .await
    }

    async fn dependency_exists(
        &self,
        task_id: TaskId,
        depends_on_task_id: TaskId,
    ) -> TaskRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let count: i64 = task_dependencies::table
                .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                .filter(task_dependencies::depends_on_task_id.eq(depends_on_task_id.into_inner()))
                .count()
                .get_result(connection)?;
            Ok(count > 0)
        })
        .await
    }

    async fn dependency_targets(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskId>> {
        self.run_blocking(move |connection| {
            let targets = task_dependencies::table
                .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                .select(task_dependencies::depends_on_task_id)
                .load::<Uuid>(connection)?;
            Ok(targets.into_iter().map(TaskId::from_uuid).collect())
        })
        .await
    }

    async fn delete_dependency(&self, id: DependencyId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(task_dependencies::table.find(id.into_inner())).execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::DependencyNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_dependencies(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>> {
        self.run_blocking(move |connection| {
            let total: i64 = task_dependencies::table
                .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                .count()
                .get_result(connection)?;
            let (offset, limit) = page_bounds(page)?;
            let rows = task_dependencies::table
                .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                .order((
                    task_dependencies::created_at.desc(),
                    task_dependencies::id.asc(),
                ))
                .offset(offset)
                .limit(limit)
                .select(DependencyRow::as_select())
                .load::<DependencyRow>(connection)?;
            dependency_page(rows, page, total)
        })
        .await
    }

    async fn list_dependents(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskDependency>> {
        self.run_blocking(move |connection| {
            let total: i64 = task_dependencies::table
                .filter(task_dependencies::depends_on_task_id.eq(task_id.into_inner()))
                .count()
                .get_result(connection)?;
            let (offset, limit) = page_bounds(page)?;
            let rows = task_dependencies::table
                .filter(task_dependencies::depends_on_task_id.eq(task_id.into_inner()))
                .order((
                    task_dependencies::created_at.desc(),
                    task_dependencies::id.asc(),
                ))
                .offset(offset)
                .limit(limit)
                .select(DependencyRow::as_select())
                .load::<DependencyRow>(connection)?;
            dependency_page(rows, page, total)
        })
        .await
    }

    async fn insert_assignment(&self, assignment: &TaskAssignment) -> TaskRepositoryResult<()> {
        let task_id = assignment.task_id();
        let user_id = assignment.user_id();
        let row = assignment_to_row(assignment);
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                if row.is_primary {
                    demote_primaries(tx, row.task_id)?;
                }
                diesel::insert_into(task_assignments::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                            if violates(info.as_ref(), ASSIGNMENT_USER_CONSTRAINT) =>
                        {
                            TaskRepositoryError::DuplicateAssignment { task_id, user_id }
                        }
                        other => TaskRepositoryError::persistence(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn find_assignment(
        &self,
        id: AssignmentId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let row = task_assignments::table
                .find(id.into_inner())
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()?;
            Ok(row.as_ref().map(row_to_assignment))
        })
        .await
    }

    async fn find_assignment_for_user(
        &self,
        task_id: TaskId,
        user_id: UserId,
    ) -> TaskRepositoryResult<Option<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let row = task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .filter(task_assignments::user_id.eq(user_id.into_inner()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(connection)
                .optional()?;
            Ok(row.as_ref().map(row_to_assignment))
        })
        .await
    }

    async fn delete_assignment(&self, id: AssignmentId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(task_assignments::table.find(id.into_inner())).execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::AssignmentNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn set_primary(
        &self,
        id: AssignmentId,
        is_primary: bool,
    ) -> TaskRepositoryResult<TaskAssignment> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let current = task_assignments::table
                    .find(id.into_inner())
                    .for_update()
                    .select(AssignmentRow::as_select())
                    .first::<AssignmentRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::AssignmentNotFound(id))?;
                if is_primary {
                    demote_primaries(tx, current.task_id)?;
                }
                let updated = diesel::update(task_assignments::table.find(id.into_inner()))
                    .set(task_assignments::is_primary.eq(is_primary))
                    .returning(AssignmentRow::as_returning())
                    .get_result::<AssignmentRow>(tx)?;
                Ok(row_to_assignment(&updated))
            })
        })
        .await
    }

    async fn list_assignments(
        &self,
        task_id: TaskId,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<TaskAssignment>> {
        self.run_blocking(move |connection| {
            let total: i64 = task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .count()
                .get_result(connection)?;
            let (offset, limit) = page_bounds(page)?;
            let rows = task_assignments::table
                .filter(task_assignments::task_id.eq(task_id.into_inner()))
                .order((
                    task_assignments::is_primary.desc(),
                    task_assignments::assigned_at.desc(),
                    task_assignments::id.asc(),
                ))
                .offset(offset)
                .limit(limit)
                .select(AssignmentRow::as_select())
                .load::<AssignmentRow>(connection)?;
            let items = rows.iter().map(row_to_assignment).collect();
            Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
        })
        .await
    }

    async fn checklist_items(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<ChecklistItem>> {
        self.run_blocking(move |connection| load_checklist(connection, task_id))
            .await
    }

    async fn find_checklist_item(
        &self,
        id: ChecklistItemId,
    ) -> TaskRepositoryResult<Option<ChecklistItem>> {
        self.run_blocking(move |connection| {
            let row = checklist_items::table
                .find(id.into_inner())
                .select(ChecklistItemRow::as_select())
                .first::<ChecklistItemRow>(connection)
                .optional()?;
            row.map(row_to_checklist_item).transpose()
        })
        .await
    }

    async fn insert_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()> {
        let row = checklist_item_to_row(item)?;
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                diesel::update(
                    checklist_items::table
                        .filter(checklist_items::task_id.eq(row.task_id))
                        .filter(checklist_items::order_index.ge(row.order_index)),
                )
                .set(checklist_items::order_index.eq(checklist_items::order_index + 1))
                .execute(tx)?;
                diesel::insert_into(checklist_items::table)
                    .values(&row)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_checklist_item(&self, item: &ChecklistItem) -> TaskRepositoryResult<()> {
        let id = item.id();
        let text = item.item_text().as_str().to_owned();
        let is_completed = item.is_completed();
        let updated_at = item.updated_at();
        self.run_blocking(move |connection| {
            let updated = diesel::update(checklist_items::table.find(id.into_inner()))
                .set((
                    checklist_items::item_text.eq(text),
                    checklist_items::is_completed.eq(is_completed),
                    checklist_items::updated_at.eq(updated_at),
                ))
                .execute(connection)?;
            if updated == 0 {
                return Err(TaskRepositoryError::ChecklistItemNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_checklist_item(&self, id: ChecklistItemId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let removed = diesel::delete(checklist_items::table.find(id.into_inner()))
                    .returning(ChecklistItemRow::as_returning())
                    .get_result::<ChecklistItemRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::ChecklistItemNotFound(id))?;
                diesel::update(
                    checklist_items::table
                        .filter(checklist_items::task_id.eq(removed.task_id))
                        .filter(checklist_items::order_index.gt(removed.order_index)),
                )
                .set(checklist_items::order_index.eq(checklist_items::order_index - 1))
                .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn apply_checklist_order(
        &self,
        task_id: TaskId,
        ordered_ids: &[ChecklistItemId],
    ) -> TaskRepositoryResult<()> {
        let ordered: Vec<Uuid> = ordered_ids.iter().map(|id| id.into_inner()).collect();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                for (position, item_id) in ordered.iter().copied().enumerate() {
                    diesel::update(
                        checklist_items::table
                            .filter(checklist_items::id.eq(item_id))
                            .filter(checklist_items::task_id.eq(task_id.into_inner())),
                    )
                    .set(checklist_items::order_index.eq(to_db_position(position)?))
                    .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn snapshot(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskSnapshot>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let Some(task) = load_task(tx, task_id)? else {
                    return Ok(None);
                };
                let dependencies = task_dependencies::table
                    .filter(task_dependencies::task_id.eq(task_id.into_inner()))
                    .order((
                        task_dependencies::created_at.desc(),
                        task_dependencies::id.asc(),
                    ))
                    .select(DependencyRow::as_select())
                    .load::<DependencyRow>(tx)?
                    .into_iter()
                    .map(row_to_dependency)
                    .collect::<TaskRepositoryResult<Vec<_>>>()?;
                let assignments = task_assignments::table
                    .filter(task_assignments::task_id.eq(task_id.into_inner()))
                    .order((
                        task_assignments::is_primary.desc(),
                        task_assignments::assigned_at.desc(),
                        task_assignments::id.asc(),
                    ))
                    .select(AssignmentRow::as_select())
                    .load::<AssignmentRow>(tx)?
                    .iter()
                    .map(row_to_assignment)
                    .collect();
                let checklist = load_checklist(tx, task_id)?;
                Ok(Some(TaskSnapshot {
                    task,
                    dependencies,
                    assignments,
                    checklist,
                }))
            })
        })
        .await
    }
}

fn load_task(connection: &mut PgConnection, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
    let row = tasks::table
        .find(id.into_inner())
        .select(TaskRow::as_select())
        .first::<TaskRow>(connection)
        .optional()?;
    row.map(row_to_task).transpose()
}

fn load_project_access(
    connection: &mut PgConnection,
    project_id: ProjectId,
) -> TaskRepositoryResult<ProjectAccess> {
    let (workspace_id, owner_id) = projects::table
        .inner_join(workspaces::table.on(workspaces::id.eq(projects::workspace_id)))
        .filter(projects::id.eq(project_id.into_inner()))
        .select((workspaces::id, workspaces::owner_id))
        .first::<(Uuid, Uuid)>(connection)
        .optional()?
        .ok_or_else(|| {
            TaskRepositoryError::invalid_persisted_data(std::io::Error::other(format!(
                "project {project_id} has no owning workspace"
            )))
        })?;
    let members = project_members::table
        .filter(project_members::project_id.eq(project_id.into_inner()))
        .select(project_members::user_id)
        .load::<Uuid>(connection)?;

    Ok(ProjectAccess::new(
        project_id,
        WorkspaceId::from_uuid(workspace_id),
        UserId::from_uuid(owner_id),
    )
    .with_members(members.into_iter().map(UserId::from_uuid)))
}

fn load_checklist(
    connection: &mut PgConnection,
    task_id: TaskId,
) -> TaskRepositoryResult<Vec<ChecklistItem>> {
    checklist_items::table
        .filter(checklist_items::task_id.eq(task_id.into_inner()))
        .order((
            checklist_items::order_index.asc(),
            checklist_items::created_at.asc(),
        ))
        .select(ChecklistItemRow::as_select())
        .load::<ChecklistItemRow>(connection)?
        .into_iter()
        .map(row_to_checklist_item)
        .collect()
}

fn demote_primaries(connection: &mut PgConnection, task_id: Uuid) -> TaskRepositoryResult<()> {
    diesel::update(
        task_assignments::table
            .filter(task_assignments::task_id.eq(task_id))
            .filter(task_assignments::is_primary.eq(true)),
    )
    .set(task_assignments::is_primary.eq(false))
    .execute(connection)?;
    Ok(())
}

fn page_bounds(page: PageRequest) -> TaskRepositoryResult<(i64, i64)> {
    let offset = i64::try_from(page.offset()).map_err(TaskRepositoryError::persistence)?;
    Ok((offset, i64::from(page.limit())))
}

fn dependency_page(
    rows: Vec<DependencyRow>,
    page: PageRequest,
    total: i64,
) -> TaskRepositoryResult<Page<TaskDependency>> {
    let items = rows
        .into_iter()
        .map(row_to_dependency)
        .collect::<TaskRepositoryResult<Vec<_>>>()?;
    Ok(Page::new(items, page, u64::try_from(total).unwrap_or_default()))
}

fn violates(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}
