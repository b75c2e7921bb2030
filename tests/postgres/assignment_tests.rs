//! Primary demotion and access loading in the `PostgreSQL` task repository.

use super::helpers::{CleanupGuard, ensure_template, primary_count, setup_project, test_runtime};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use trellis::task::{
    domain::{AssignmentId, PageRequest, TaskAssignment},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
fn primary_insert_demotes_the_previous_primary(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_primary_insert_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Triage");
    let first = TaskAssignment::new(task.id(), project.member, true, &DefaultClock);
    let second = TaskAssignment::new(task.id(), project.owner, true, &DefaultClock);

    rt.block_on(project.repo.insert_assignment(&first))
        .expect("first primary");
    rt.block_on(project.repo.insert_assignment(&second))
        .expect("second primary");

    assert_eq!(primary_count(&project.pool, task.id().into_inner()), 1);
    let page = rt
        .block_on(project.repo.list_assignments(task.id(), PageRequest::first(10)))
        .expect("assignments");
    let listed: Vec<_> = page
        .items
        .iter()
        .map(|assignment| (assignment.id(), assignment.is_primary()))
        .collect();
    assert_eq!(listed, vec![(second.id(), true), (first.id(), false)]);
}

#[rstest]
fn set_primary_moves_the_flag_in_one_transaction(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_set_primary_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Triage");
    let third_user = project.user();
    let assignments: Vec<_> = [project.member, project.owner, third_user]
        .into_iter()
        .enumerate()
        .map(|(position, user)| {
            let assignment = TaskAssignment::new(task.id(), user, position == 0, &DefaultClock);
            rt.block_on(project.repo.insert_assignment(&assignment))
                .expect("assignment");
            assignment
        })
        .collect();
    let target = assignments.get(2).expect("three assignments");

    let updated = rt
        .block_on(project.repo.set_primary(target.id(), true))
        .expect("set primary");

    assert_eq!(updated.id(), target.id());
    assert!(updated.is_primary());
    assert_eq!(primary_count(&project.pool, task.id().into_inner()), 1);
    let snapshot = rt
        .block_on(project.repo.snapshot(task.id()))
        .expect("snapshot")
        .expect("task exists");
    assert_eq!(
        snapshot.assignments.first().map(TaskAssignment::id),
        Some(target.id())
    );

    let cleared = rt
        .block_on(project.repo.set_primary(target.id(), false))
        .expect("clear primary");
    assert!(!cleared.is_primary());
    assert_eq!(primary_count(&project.pool, task.id().into_inner()), 0);
}

#[rstest]
fn set_primary_on_a_missing_assignment_is_not_found(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_set_primary_missing_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let missing = AssignmentId::new();

    let result = rt.block_on(project.repo.set_primary(missing, true));

    assert!(
        matches!(result, Err(TaskRepositoryError::AssignmentNotFound(id)) if id == missing),
        "Expected AssignmentNotFound error, got: {result:?}"
    );
}

#[rstest]
fn task_access_joins_workspace_owner_and_members(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_task_access_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Triage");
    let outsider = project.user();

    let loaded = rt
        .block_on(project.repo.find_task_with_access(task.id()))
        .expect("lookup")
        .expect("task exists");

    assert_eq!(loaded.task.id(), task.id());
    assert_eq!(loaded.access.project_id(), project.project_id);
    assert_eq!(loaded.access.workspace_id(), project.workspace_id);
    assert_eq!(loaded.access.workspace_owner_id(), project.owner);
    assert!(loaded.access.permits(project.owner));
    assert!(loaded.access.permits(project.member));
    assert!(!loaded.access.permits(outsider));
}
