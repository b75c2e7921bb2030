//! Assignment operations.
//!
//! A task has any number of assignees, at most one of them primary.

use super::{
    TaskRelationConfig,
    broadcast::ChangeBroadcaster,
    error::{ForbiddenReason, MissingEntity, TaskRelationError, TaskRelationResult},
};
use crate::task::{
    domain::{AssignmentId, Page, PageRequest, TaskAssignment, TaskChange, TaskId, UserId},
    ports::{
        AccessGate, AssignmentNotifier, TaskEventPublisher, TaskRepository, TaskRepositoryError,
        UserDirectory,
    },
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for assigning a user to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignUserRequest {
    /// Task to assign.
    pub task_id: TaskId,
    /// User being assigned.
    pub assignee_id: UserId,
    /// Whether the user becomes the primary assignee.
    pub is_primary: bool,
}

impl AssignUserRequest {
    /// Creates a non-primary assignment request.
    #[must_use]
    pub const fn new(task_id: TaskId, assignee_id: UserId) -> Self {
        Self {
            task_id,
            assignee_id,
            is_primary: false,
        }
    }

    /// Marks the assignee as primary.
    #[must_use]
    pub const fn as_primary(mut self) -> Self {
        self.is_primary = true;
        self
    }
}

/// Ports an [`AssignmentSetService`] talks to besides the repository.
pub struct AssignmentCollaborators<G, U, P, N> {
    /// Authorization gate.
    pub gate: Arc<G>,
    /// Registered-user lookup.
    pub users: Arc<U>,
    /// Change broadcaster.
    pub publisher: Arc<P>,
    /// Assignment notification channel.
    pub notifier: Arc<N>,
}

/// Maintains the assignee set of each task.
#[derive(Clone)]
pub struct AssignmentSetService<R, G, U, P, N, C>
where
    R: TaskRepository,
    G: AccessGate,
    U: UserDirectory,
    P: TaskEventPublisher,
    N: AssignmentNotifier,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    gate: Arc<G>,
    users: Arc<U>,
    notifier: Arc<N>,
    broadcaster: ChangeBroadcaster<R, P, C>,
    clock: Arc<C>,
    config: TaskRelationConfig,
}

impl<R, G, U, P, N, C> AssignmentSetService<R, G, U, P, N, C>
where
    R: TaskRepository,
    G: AccessGate,
    U: UserDirectory,
    P: TaskEventPublisher,
    N: AssignmentNotifier,
    C: Clock + Send + Sync,
{
    /// Creates an assignment service with default configuration.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        collaborators: AssignmentCollaborators<G, U, P, N>,
        clock: Arc<C>,
    ) -> Self {
        let AssignmentCollaborators {
            gate,
            users,
            publisher,
            notifier,
        } = collaborators;
        Self {
            broadcaster: ChangeBroadcaster::new(
                Arc::clone(&repository),
                publisher,
                Arc::clone(&clock),
            ),
            repository,
            gate,
            users,
            notifier,
            clock,
            config: TaskRelationConfig::default(),
        }
    }

    /// Replaces the listing configuration.
    #[must_use]
    pub const fn with_config(mut self, config: TaskRelationConfig) -> Self {
        self.config = config;
        self
    }

    /// Assigns a user to a task.
    ///
    /// A primary assignment demotes every other primary assignee on the task
    /// in the same write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or user is
    /// missing and [`TaskRelationError::Forbidden`] when the actor may not
    /// access the task or the user is already assigned.
    pub async fn assign(
        &self,
        request: AssignUserRequest,
        actor_id: UserId,
    ) -> TaskRelationResult<TaskAssignment> {
        let AssignUserRequest {
            task_id,
            assignee_id,
            is_primary,
        } = request;
        let authorized = self.gate.authorize(task_id, actor_id).await?;

        if !self.users.user_exists(assignee_id).await? {
            return Err(TaskRelationError::NotFound(MissingEntity::User(assignee_id)));
        }
        if self
            .repository
            .find_assignment_for_user(task_id, assignee_id)
            .await?
            .is_some()
        {
            return Err(duplicate_assignment(task_id, assignee_id));
        }

        let assignment = TaskAssignment::new(task_id, assignee_id, is_primary, &*self.clock);
        self.repository
            .insert_assignment(&assignment)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::DuplicateAssignment {
                    task_id: duplicate_task,
                    user_id,
                } => duplicate_assignment(duplicate_task, user_id),
                other => TaskRelationError::Repository(other),
            })?;
        tracing::info!(
            %task_id,
            %assignee_id,
            assignment_id = %assignment.id(),
            is_primary,
            %actor_id,
            "user assigned"
        );

        if let Err(err) = self
            .notifier
            .notify_assigned(task_id, assignee_id, actor_id)
            .await
        {
            tracing::warn!(%task_id, %assignee_id, error = %err, "failed to notify assignee");
        }
        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::AssigneeAdded {
                    assignment_id: assignment.id(),
                    user_id: assignee_id,
                },
            )
            .await;
        Ok(assignment)
    }

    /// Removes a user's assignment from a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task is missing or the
    /// user is not assigned to it and [`TaskRelationError::Forbidden`] when the
    /// actor may not access the task.
    pub async fn unassign(
        &self,
        task_id: TaskId,
        assignee_id: UserId,
        actor_id: UserId,
    ) -> TaskRelationResult<()> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;

        let assignment = self
            .repository
            .find_assignment_for_user(task_id, assignee_id)
            .await?
            .ok_or(TaskRelationError::NotFound(MissingEntity::AssigneeOnTask {
                task_id,
                user_id: assignee_id,
            }))?;
        self.repository
            .delete_assignment(assignment.id())
            .await
            .map_err(|err| match err {
                TaskRepositoryError::AssignmentNotFound(_) => {
                    TaskRelationError::NotFound(MissingEntity::AssigneeOnTask {
                        task_id,
                        user_id: assignee_id,
                    })
                }
                other => TaskRelationError::Repository(other),
            })?;
        tracing::info!(%task_id, %assignee_id, %actor_id, "user unassigned");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::AssigneeRemoved {
                    user_id: assignee_id,
                },
            )
            .await;
        Ok(())
    }

    /// Sets or clears the primary flag of an assignment.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or assignment is
    /// missing, or the assignment belongs to another task, and
    /// [`TaskRelationError::Forbidden`] when the actor may not access the task.
    pub async fn set_primary(
        &self,
        task_id: TaskId,
        assignment_id: AssignmentId,
        actor_id: UserId,
        is_primary: bool,
    ) -> TaskRelationResult<TaskAssignment> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;

        let belongs_to_task = self
            .repository
            .find_assignment(assignment_id)
            .await?
            .is_some_and(|assignment| assignment.task_id() == task_id);
        if !belongs_to_task {
            return Err(TaskRelationError::NotFound(MissingEntity::Assignment(
                assignment_id,
            )));
        }

        let updated = self
            .repository
            .set_primary(assignment_id, is_primary)
            .await
            .map_err(|err| match err {
                TaskRepositoryError::AssignmentNotFound(id) => {
                    TaskRelationError::NotFound(MissingEntity::Assignment(id))
                }
                other => TaskRelationError::Repository(other),
            })?;
        tracing::info!(%task_id, %assignment_id, is_primary, %actor_id, "primary flag updated");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::PrimaryAssigneeChanged {
                    assignment_id,
                    is_primary,
                },
            )
            .await;
        Ok(updated)
    }

    /// Lists assignments, primary first then most recently assigned first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] or
    /// [`TaskRelationError::Forbidden`] from authorization, and repository
    /// errors.
    pub async fn list(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        page: Option<PageRequest>,
    ) -> TaskRelationResult<Page<TaskAssignment>> {
        self.gate.authorize(task_id, actor_id).await?;
        Ok(self
            .repository
            .list_assignments(task_id, self.config.resolve_page(page))
            .await?)
    }
}

const fn duplicate_assignment(task_id: TaskId, user_id: UserId) -> TaskRelationError {
    TaskRelationError::Forbidden(ForbiddenReason::DuplicateAssignment { task_id, user_id })
}
