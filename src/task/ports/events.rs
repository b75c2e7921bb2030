//! Outbound ports for change broadcasts and assignment notifications.
//!
//! Both ports are fire-and-forget from the caller's point of view: services
//! log failures and carry on, because the write they describe has already
//! been committed.

use crate::task::domain::{TaskChangedEvent, TaskId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Broadcasts fresh task snapshots to live subscribers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskEventPublisher: Send + Sync {
    /// Publishes a task change scoped to the task's project and workspace.
    ///
    /// # Errors
    ///
    /// Returns [`EventPublishError`] when the event bus rejects the event.
    async fn publish_task_changed(&self, event: TaskChangedEvent) -> Result<(), EventPublishError>;
}

/// Delivers "you were assigned" notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentNotifier: Send + Sync {
    /// Notifies `assignee_id` that `actor_id` assigned them to `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery can not be queued.
    async fn notify_assigned(
        &self,
        task_id: TaskId,
        assignee_id: UserId,
        actor_id: UserId,
    ) -> Result<(), NotificationError>;
}

/// Error returned when an event can not be published.
#[derive(Debug, Clone, Error)]
#[error("event publish failed: {0}")]
pub struct EventPublishError(pub Arc<dyn std::error::Error + Send + Sync>);

impl EventPublishError {
    /// Wraps a transport failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Error returned when a notification can not be queued.
#[derive(Debug, Clone, Error)]
#[error("notification failed: {0}")]
pub struct NotificationError(pub Arc<dyn std::error::Error + Send + Sync>);

impl NotificationError {
    /// Wraps a delivery failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
