//! Then steps for task relationship BDD scenarios.

use super::world::{TaskRelationshipWorld, run_async, split_list};
use rstest_bdd_macros::then;
use trellis::task::domain::TaskAssignment;

#[then("the request succeeds")]
fn request_succeeds(world: &TaskRelationshipWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(())) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("no request was made")),
    }
}

#[then("the request is forbidden")]
fn request_is_forbidden(world: &TaskRelationshipWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Err(err)) if err.is_forbidden() => Ok(()),
        other => Err(eyre::eyre!("expected a forbidden error, got {other:?}")),
    }
}

#[then(r#"task "{task}" has {count:u64} outgoing dependencies"#)]
fn outgoing_dependencies(
    world: &mut TaskRelationshipWorld,
    task: String,
    count: u64,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    let listed = run_async(world.graph.list_dependencies(task_id, world.owner, None))?;
    eyre::ensure!(
        listed.total == count,
        "expected {count} dependencies from {task}, found {}",
        listed.total
    );
    Ok(())
}

#[then(r#"user "{user}" is the only primary assignee of task "{task}""#)]
fn only_primary(
    world: &mut TaskRelationshipWorld,
    user: String,
    task: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    let user_id = world.person(&user)?;
    let listed = run_async(world.assignments.list(task_id, world.owner, None))?;
    let primaries: Vec<_> = listed
        .items
        .iter()
        .filter(|assignment| assignment.is_primary())
        .map(TaskAssignment::user_id)
        .collect();
    eyre::ensure!(
        primaries == vec![user_id],
        "expected {user} to be the only primary assignee, found {primaries:?}"
    );
    Ok(())
}

#[then(r#"the checklist of task "{task}" reads "{items}""#)]
fn checklist_reads(
    world: &mut TaskRelationshipWorld,
    task: String,
    items: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    let listed = run_async(world.checklist.list_items(task_id, world.owner))?;
    let actual: Vec<(String, u32)> = listed
        .iter()
        .map(|item| (item.item_text().as_str().to_owned(), item.order_index()))
        .collect();
    let expected: Vec<(String, u32)> = split_list(&items).into_iter().zip(0_u32..).collect();
    eyre::ensure!(
        actual == expected,
        "expected checklist {expected:?}, found {actual:?}"
    );
    Ok(())
}
