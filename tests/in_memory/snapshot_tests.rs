//! Task snapshots and dependency listings.

use super::helpers::{SeededRepository, checklist_item, seeded};
use mockable::DefaultClock;
use rstest::rstest;
use trellis::task::{
    domain::{DependencyType, PageRequest, TaskAssignment, TaskDependency, TaskId, UserId},
    ports::{TaskRepository, TaskRepositoryError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn snapshot_collects_every_relationship(
    seeded: SeededRepository,
) -> Result<(), eyre::Report> {
    let task = seeded.task("Parent").await?;
    let target = seeded.task("Child").await?;
    let edge = TaskDependency::new(task.id(), target.id(), DependencyType::Blocks, &DefaultClock);
    let assignment = TaskAssignment::new(task.id(), UserId::new(), true, &DefaultClock);
    let item = checklist_item(&task, "check", 0)?;
    seeded.repo.insert_dependency(&edge).await?;
    seeded.repo.insert_assignment(&assignment).await?;
    seeded.repo.insert_checklist_item(&item).await?;

    let snapshot = seeded
        .repo
        .snapshot(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("snapshot missing"))?;

    assert_eq!(snapshot.task, task);
    assert_eq!(snapshot.dependencies, vec![edge]);
    assert_eq!(snapshot.assignments, vec![assignment]);
    assert_eq!(snapshot.checklist, vec![item]);
    assert!(seeded.repo.snapshot(TaskId::new()).await?.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependents_are_listed_by_target(seeded: SeededRepository) -> Result<(), eyre::Report> {
    let shared = seeded.task("Shared").await?;
    let first = seeded.task("First").await?;
    let second = seeded.task("Second").await?;
    for source in [&first, &second] {
        let edge =
            TaskDependency::new(source.id(), shared.id(), DependencyType::Blocks, &DefaultClock);
        seeded.repo.insert_dependency(&edge).await?;
    }

    let dependents = seeded
        .repo
        .list_dependents(shared.id(), PageRequest::new(1, 1)?)
        .await?;

    assert_eq!(dependents.total, 2);
    assert_eq!(
        dependents.items.first().map(TaskDependency::task_id),
        Some(second.id())
    );
    assert_eq!(
        seeded.repo.dependency_targets(first.id()).await?,
        vec![shared.id()]
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_edge_is_rejected(seeded: SeededRepository) -> Result<(), eyre::Report> {
    let task = seeded.task("A").await?;
    let target = seeded.task("B").await?;
    let edge = TaskDependency::new(task.id(), target.id(), DependencyType::Blocks, &DefaultClock);
    seeded.repo.insert_dependency(&edge).await?;

    let again =
        TaskDependency::new(task.id(), target.id(), DependencyType::RelatesTo, &DefaultClock);
    let result = seeded.repo.insert_dependency(&again).await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateDependency { .. })
    ));
    Ok(())
}
