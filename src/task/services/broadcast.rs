//! Post-commit fan-out of fresh task snapshots.

use crate::task::{
    domain::{TaskChange, TaskChangedEvent, TaskWithAccess, UserId},
    ports::{TaskEventPublisher, TaskRepository},
};
use mockable::Clock;
use std::sync::Arc;

/// Loads the task's current state after a write and hands it to the publisher.
///
/// Failures are logged and swallowed: the write has already been committed
/// and delivery is best effort.
pub(super) struct ChangeBroadcaster<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    publisher: Arc<P>,
    clock: Arc<C>,
}

impl<R, P, C> Clone for ChangeBroadcaster<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            publisher: Arc::clone(&self.publisher),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, P, C> ChangeBroadcaster<R, P, C>
where
    R: TaskRepository,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    pub(super) const fn new(repository: Arc<R>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            repository,
            publisher,
            clock,
        }
    }

    pub(super) async fn task_changed(
        &self,
        authorized: &TaskWithAccess,
        actor_id: UserId,
        change: TaskChange,
    ) {
        let task_id = authorized.task.id();
        let snapshot = match self.repository.snapshot(task_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::warn!(%task_id, "task vanished before its change could be broadcast");
                return;
            }
            Err(err) => {
                tracing::warn!(%task_id, error = %err, "failed to load task snapshot for broadcast");
                return;
            }
        };

        let event = TaskChangedEvent {
            task_id,
            project_id: authorized.task.project_id(),
            workspace_id: authorized.workspace_id(),
            actor_id,
            change,
            snapshot,
            occurred_at: self.clock.utc(),
        };
        if let Err(err) = self.publisher.publish_task_changed(event).await {
            tracing::warn!(%task_id, error = %err, "failed to publish task change");
        }
    }
}
