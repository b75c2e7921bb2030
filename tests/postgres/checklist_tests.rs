//! Checklist density in the `PostgreSQL` task repository.
//!
//! Shifts and reorders pass through duplicate positions mid-transaction;
//! `uq_checklist_items_position` is deferred to commit.

use super::helpers::{
    CleanupGuard, checklist_item, ensure_template, setup_project, test_runtime, texts_and_indices,
};
use pg_embedded_setup_unpriv::TestCluster;
use pg_embedded_setup_unpriv::test_support::shared_test_cluster;
use rstest::rstest;
use trellis::task::{
    domain::{ChecklistItem, ChecklistItemId},
    ports::{TaskRepository, TaskRepositoryError},
};

fn owned(rows: &[(&str, u32)]) -> Vec<(String, u32)> {
    rows.iter()
        .map(|(text, index)| ((*text).to_owned(), *index))
        .collect()
}

#[rstest]
fn insert_shifts_later_items_down(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_checklist_insert_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Release");
    for (index, text) in ["Build", "Test"].into_iter().enumerate() {
        let position = u32::try_from(index).expect("small index");
        rt.block_on(
            project
                .repo
                .insert_checklist_item(&checklist_item(&task, text, position)),
        )
        .expect("append");
    }

    rt.block_on(
        project
            .repo
            .insert_checklist_item(&checklist_item(&task, "Plan", 0)),
    )
    .expect("insert at front");

    let items = rt
        .block_on(project.repo.checklist_items(task.id()))
        .expect("checklist");
    assert_eq!(
        texts_and_indices(&items),
        owned(&[("Plan", 0), ("Build", 1), ("Test", 2)])
    );
}

#[rstest]
fn delete_compacts_later_items(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_checklist_delete_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Release");
    let items: Vec<ChecklistItem> = ["Build", "Test", "Deploy"]
        .into_iter()
        .zip(0..)
        .map(|(text, position)| {
            let item = checklist_item(&task, text, position);
            rt.block_on(project.repo.insert_checklist_item(&item))
                .expect("append");
            item
        })
        .collect();
    let middle = items.get(1).map(ChecklistItem::id).expect("three items");

    rt.block_on(project.repo.delete_checklist_item(middle))
        .expect("delete");

    let remaining = rt
        .block_on(project.repo.checklist_items(task.id()))
        .expect("checklist");
    assert_eq!(
        texts_and_indices(&remaining),
        owned(&[("Build", 0), ("Deploy", 1)])
    );
    let again = rt.block_on(project.repo.delete_checklist_item(middle));
    assert!(
        matches!(again, Err(TaskRepositoryError::ChecklistItemNotFound(id)) if id == middle),
        "Expected ChecklistItemNotFound error, got: {again:?}"
    );
}

#[rstest]
fn reorder_commits_a_full_permutation(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = format!("test_checklist_reorder_{}", uuid::Uuid::new_v4());
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let project = setup_project(shared_test_cluster, &db_name).expect("project setup");
    let rt = test_runtime();
    let task = project.task(&rt, "Release");
    let ids: Vec<ChecklistItemId> = ["A", "B", "C"]
        .into_iter()
        .zip(0..)
        .map(|(text, position)| {
            let item = checklist_item(&task, text, position);
            rt.block_on(project.repo.insert_checklist_item(&item))
                .expect("append");
            item.id()
        })
        .collect();
    let reordered: Vec<_> = [2, 0, 1]
        .iter()
        .map(|index| ids.get(*index).copied().expect("three items"))
        .collect();

    rt.block_on(project.repo.apply_checklist_order(task.id(), &reordered))
        .expect("reorder");

    let snapshot = rt
        .block_on(project.repo.snapshot(task.id()))
        .expect("snapshot")
        .expect("task exists");
    assert_eq!(
        texts_and_indices(&snapshot.checklist),
        owned(&[("C", 0), ("A", 1), ("B", 2)])
    );
}
