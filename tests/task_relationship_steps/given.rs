//! Given steps for task relationship BDD scenarios.

use super::world::{TaskRelationshipWorld, run_async, split_list};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::task::{
    domain::DependencyType,
    services::{AddChecklistItemRequest, AddDependencyRequest, AssignUserRequest},
};

#[given(r#"a project with tasks "{titles}""#)]
fn project_with_tasks(world: &mut TaskRelationshipWorld, titles: String) -> Result<(), eyre::Report> {
    for title in split_list(&titles) {
        world.task(&title)?;
    }
    Ok(())
}

#[given(r#"task "{task}" depends on task "{target}""#)]
fn task_depends_on(
    world: &mut TaskRelationshipWorld,
    task: String,
    target: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    let target_id = world.task(&target)?;
    run_async(world.graph.add_dependency(
        AddDependencyRequest::new(task_id, target_id, DependencyType::Blocks),
        world.owner,
    ))
    .wrap_err("seed dependency edge")?;
    Ok(())
}

#[given(r#"user "{user}" is the primary assignee of task "{task}""#)]
fn primary_assignee(
    world: &mut TaskRelationshipWorld,
    user: String,
    task: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    let user_id = world.person(&user)?;
    run_async(
        world
            .assignments
            .assign(AssignUserRequest::new(task_id, user_id).as_primary(), world.owner),
    )
    .wrap_err("seed primary assignee")?;
    Ok(())
}

#[given(r#"task "{task}" has checklist items "{items}""#)]
fn task_with_checklist(
    world: &mut TaskRelationshipWorld,
    task: String,
    items: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task(&task)?;
    for text in split_list(&items) {
        run_async(
            world
                .checklist
                .add_item(AddChecklistItemRequest::new(task_id, text), world.owner),
        )
        .wrap_err("seed checklist item")?;
    }
    Ok(())
}
