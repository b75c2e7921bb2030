//! Recording event publisher and notifier.
//!
//! Both adapters keep every call in memory so tests can assert on what the
//! services broadcast.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{TaskChangedEvent, TaskId, UserId},
    ports::{AssignmentNotifier, EventPublishError, NotificationError, TaskEventPublisher},
};

/// Event publisher that records published events.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventPublisher {
    events: Arc<RwLock<Vec<TaskChangedEvent>>>,
}

impl InMemoryEventPublisher {
    /// Creates an empty publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every event published so far, oldest first.
    ///
    /// A poisoned lock yields an empty list.
    #[must_use]
    pub fn published(&self) -> Vec<TaskChangedEvent> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TaskEventPublisher for InMemoryEventPublisher {
    async fn publish_task_changed(&self, event: TaskChangedEvent) -> Result<(), EventPublishError> {
        let mut events = self
            .events
            .write()
            .map_err(|err| EventPublishError::new(std::io::Error::other(err.to_string())))?;
        events.push(event);
        Ok(())
    }
}

/// A recorded assignment notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentNotification {
    /// Task the user was assigned to.
    pub task_id: TaskId,
    /// Notified user.
    pub assignee_id: UserId,
    /// User who made the assignment.
    pub actor_id: UserId,
}

/// Notifier that records notifications instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentNotifier {
    sent: Arc<RwLock<Vec<SentNotification>>>,
}

impl InMemoryAssignmentNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification sent so far, oldest first.
    ///
    /// A poisoned lock yields an empty list.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .read()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AssignmentNotifier for InMemoryAssignmentNotifier {
    async fn notify_assigned(
        &self,
        task_id: TaskId,
        assignee_id: UserId,
        actor_id: UserId,
    ) -> Result<(), NotificationError> {
        let mut sent = self
            .sent
            .write()
            .map_err(|err| NotificationError::new(std::io::Error::other(err.to_string())))?;
        sent.push(SentNotification {
            task_id,
            assignee_id,
            actor_id,
        });
        Ok(())
    }
}
