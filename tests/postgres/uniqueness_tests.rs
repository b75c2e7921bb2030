//! Constraint enforcement for the `PostgreSQL` task repository.

use super::helpers::{CleanupGuard, ensure_template, setup_project, test_runtime};
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use trellis::task::{
    domain::{DependencyType, PageRequest, TaskAssignment, TaskDependency},
    ports::{TaskRepository, TaskRepositoryError, UserDirectory},
};

#[rstest]
fn duplicate_edge_maps_to_duplicate_dependency(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_dup_edge_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Ship release");
    let blocker = project.task(&rt, "Freeze branch");

    let edge = TaskDependency::new(task.id(), blocker.id(), DependencyType::Blocks, &DefaultClock);
    rt.block_on(project.repo.insert_dependency(&edge))
        .expect("first edge");
    let again = TaskDependency::new(
        task.id(),
        blocker.id(),
        DependencyType::RelatesTo,
        &DefaultClock,
    );
    let result = rt.block_on(project.repo.insert_dependency(&again));

    assert!(
        matches!(
            result,
            Err(TaskRepositoryError::DuplicateDependency { task_id, depends_on_task_id })
                if task_id == task.id() && depends_on_task_id == blocker.id()
        ),
        "Expected DuplicateDependency error, got: {result:?}"
    );
    let page = rt
        .block_on(project.repo.list_dependents(blocker.id(), PageRequest::first(10)))
        .expect("dependents");
    assert_eq!(page.total, 1);
}

#[rstest]
fn self_loop_is_rejected_by_the_schema(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_self_loop_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Ship release");

    let edge = TaskDependency::new(task.id(), task.id(), DependencyType::Blocks, &DefaultClock);
    let result = rt.block_on(project.repo.insert_dependency(&edge));

    assert!(
        matches!(result, Err(TaskRepositoryError::Persistence(_))),
        "Expected Persistence error, got: {result:?}"
    );
}

#[rstest]
fn duplicate_assignee_maps_to_duplicate_assignment(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_dup_assignee_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Ship release");

    let first = TaskAssignment::new(task.id(), project.member, false, &DefaultClock);
    rt.block_on(project.repo.insert_assignment(&first))
        .expect("first assignment");
    let again = TaskAssignment::new(task.id(), project.member, true, &DefaultClock);
    let result = rt.block_on(project.repo.insert_assignment(&again));

    assert!(
        matches!(
            result,
            Err(TaskRepositoryError::DuplicateAssignment { task_id, user_id })
                if task_id == task.id() && user_id == project.member
        ),
        "Expected DuplicateAssignment error, got: {result:?}"
    );
    let stored = rt
        .block_on(project.repo.find_assignment_for_user(task.id(), project.member))
        .expect("lookup")
        .expect("first assignment survives");
    assert_eq!(stored.id(), first.id());
    assert!(!stored.is_primary());
}

#[rstest]
fn duplicate_task_id_maps_to_duplicate_task(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_dup_task_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Ship release");

    let result = rt.block_on(project.repo.store_task(&task));

    assert!(
        matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == task.id()),
        "Expected DuplicateTask error, got: {result:?}"
    );
}

#[rstest]
fn partial_index_rejects_a_second_primary(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_two_primaries_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Ship release");
    let primary = TaskAssignment::new(task.id(), project.member, true, &DefaultClock);
    rt.block_on(project.repo.insert_assignment(&primary))
        .expect("primary assignment");
    let other = project.user();

    let mut conn = project.pool.get().expect("pooled connection");
    let result = diesel::sql_query(concat!(
        "INSERT INTO task_assignments (id, task_id, user_id, assigned_at, is_primary) ",
        "VALUES ($1, $2, $3, NOW(), TRUE)",
    ))
    .bind::<diesel::sql_types::Uuid, _>(uuid::Uuid::new_v4())
    .bind::<diesel::sql_types::Uuid, _>(task.id().into_inner())
    .bind::<diesel::sql_types::Uuid, _>(other.into_inner())
    .execute(&mut conn);

    assert!(
        matches!(
            result,
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _
            ))
        ),
        "Expected unique violation, got: {result:?}"
    );
}

#[rstest]
fn user_directory_reads_the_users_table(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_user_directory_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();

    let known = rt
        .block_on(project.users.user_exists(project.member))
        .expect("lookup");
    let unknown = rt
        .block_on(project.users.user_exists(trellis::task::domain::UserId::new()))
        .expect("lookup");

    assert!(known);
    assert!(!unknown);
}
