//! Shared helpers for `PostgreSQL` repository integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use tokio::runtime::Runtime;
use trellis::task::{
    adapters::postgres::{PostgresTaskRepository, PostgresUserDirectory, TaskPgPool},
    domain::{ChecklistItem, ChecklistText, ProjectId, Task, UserId, WorkspaceId},
    ports::TaskRepository,
};
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL for the relationship tables.
const CREATE_RELATIONSHIPS_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_task_relationships/up.sql");

/// Template database name for pre-migrated schema.
const TEMPLATE_DB: &str = "trellis_test_template";

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_RELATIONSHIPS_SQL)
                .map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Guard that drops the test database even if the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// One migrated database with a workspace, a project, its owner, and one
/// project member.
pub struct PgProject {
    pub pool: TaskPgPool,
    pub repo: PostgresTaskRepository,
    pub users: PostgresUserDirectory,
    pub project_id: ProjectId,
    pub workspace_id: WorkspaceId,
    pub owner: UserId,
    pub member: UserId,
}

impl PgProject {
    /// Stores and returns a new task in the project.
    pub fn task(&self, rt: &Runtime, title: &str) -> Task {
        let task =
            Task::new(self.project_id, title, self.owner, &DefaultClock).expect("valid task");
        rt.block_on(self.repo.store_task(&task))
            .expect("task storage should succeed");
        task
    }

    /// Inserts a row into `users` and returns its identifier.
    pub fn user(&self) -> UserId {
        let user = UserId::new();
        let mut conn = self.pool.get().expect("pooled connection");
        insert_user(&mut conn, user.into_inner()).expect("user insert");
        user
    }
}

/// Creates a database from the template and seeds one project.
///
/// # Errors
///
/// Returns an error if database creation, pooling, or seeding fails.
pub fn setup_project(cluster: &TestCluster, db_name: &str) -> Result<PgProject, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;

    let workspace_id = WorkspaceId::new();
    let project_id = ProjectId::new();
    let owner = UserId::new();
    let member = UserId::new();
    {
        let mut conn = pool.get().map_err(|e| Box::new(e) as BoxError)?;
        insert_user(&mut conn, owner.into_inner())?;
        insert_user(&mut conn, member.into_inner())?;
        diesel::sql_query("INSERT INTO workspaces (id, owner_id) VALUES ($1, $2)")
            .bind::<diesel::sql_types::Uuid, _>(workspace_id.into_inner())
            .bind::<diesel::sql_types::Uuid, _>(owner.into_inner())
            .execute(&mut conn)
            .map_err(|e| Box::new(e) as BoxError)?;
        diesel::sql_query("INSERT INTO projects (id, workspace_id) VALUES ($1, $2)")
            .bind::<diesel::sql_types::Uuid, _>(project_id.into_inner())
            .bind::<diesel::sql_types::Uuid, _>(workspace_id.into_inner())
            .execute(&mut conn)
            .map_err(|e| Box::new(e) as BoxError)?;
        diesel::sql_query("INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)")
            .bind::<diesel::sql_types::Uuid, _>(project_id.into_inner())
            .bind::<diesel::sql_types::Uuid, _>(member.into_inner())
            .execute(&mut conn)
            .map_err(|e| Box::new(e) as BoxError)?;
    }

    Ok(PgProject {
        repo: PostgresTaskRepository::new(pool.clone()),
        users: PostgresUserDirectory::new(pool.clone()),
        pool,
        project_id,
        workspace_id,
        owner,
        member,
    })
}

fn insert_user(conn: &mut PgConnection, id: Uuid) -> Result<(), BoxError> {
    diesel::sql_query("INSERT INTO users (id) VALUES ($1)")
        .bind::<diesel::sql_types::Uuid, _>(id)
        .execute(conn)
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Builds an unsaved checklist item for `task` at `order_index`.
pub fn checklist_item(task: &Task, text: &str, order_index: u32) -> ChecklistItem {
    let item_text = ChecklistText::new(text, 1000).expect("valid checklist text");
    ChecklistItem::new(task.id(), item_text, order_index, &DefaultClock)
}

/// Returns `(text, order_index)` pairs in stored order.
pub fn texts_and_indices(items: &[ChecklistItem]) -> Vec<(String, u32)> {
    items
        .iter()
        .map(|item| (item.item_text().as_str().to_owned(), item.order_index()))
        .collect()
}

/// Counts primary assignments of `task_id` straight from the table.
pub fn primary_count(pool: &TaskPgPool, task_id: Uuid) -> i64 {
    #[derive(diesel::QueryableByName)]
    struct CountRow {
        #[diesel(sql_type = diesel::sql_types::BigInt)]
        primaries: i64,
    }

    let mut conn = pool.get().expect("pooled connection");
    diesel::sql_query(
        "SELECT COUNT(*) AS primaries FROM task_assignments WHERE task_id = $1 AND is_primary",
    )
    .bind::<diesel::sql_types::Uuid, _>(task_id)
    .get_result::<CountRow>(&mut conn)
    .expect("primary count")
    .primaries
}
