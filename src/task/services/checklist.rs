//! Checklist sequencing operations.
//!
//! Every write keeps a task's order indices dense and zero-based. Reorders
//! are validated in full before the single batch write that applies them.

use super::{
    TaskRelationConfig,
    broadcast::ChangeBroadcaster,
    error::{ForbiddenReason, MissingEntity, TaskRelationError, TaskRelationResult},
};
use crate::task::{
    domain::{
        ChecklistItem, ChecklistItemId, ChecklistItemPatch, ChecklistText, TaskChange, TaskId,
        TaskWithAccess, UserId, insertion_index, is_complete_permutation, move_to_position,
        next_order_index,
    },
    ports::{AccessGate, TaskEventPublisher, TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;

/// Request payload for adding a checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddChecklistItemRequest {
    task_id: TaskId,
    text: String,
    order_index: Option<u32>,
}

impl AddChecklistItemRequest {
    /// Creates a request that appends `text` to the checklist.
    #[must_use]
    pub fn new(task_id: TaskId, text: impl Into<String>) -> Self {
        Self {
            task_id,
            text: text.into(),
            order_index: None,
        }
    }

    /// Inserts the item at `order_index` instead of appending it.
    #[must_use]
    pub const fn at_index(mut self, order_index: u32) -> Self {
        self.order_index = Some(order_index);
        self
    }
}

/// Request payload for a partial checklist item update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateChecklistItemRequest {
    task_id: TaskId,
    item_id: ChecklistItemId,
    text: Option<String>,
    is_completed: Option<bool>,
}

impl UpdateChecklistItemRequest {
    /// Creates an update that changes nothing yet.
    #[must_use]
    pub const fn new(task_id: TaskId, item_id: ChecklistItemId) -> Self {
        Self {
            task_id,
            item_id,
            text: None,
            is_completed: None,
        }
    }

    /// Replaces the item text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the completion flag.
    #[must_use]
    pub const fn with_completed(mut self, is_completed: bool) -> Self {
        self.is_completed = Some(is_completed);
        self
    }
}

/// Maintains the ordered checklist of each task.
#[derive(Clone)]
pub struct ChecklistSequencerService<R, G, P, C>
where
    R: TaskRepository,
    G: AccessGate,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    gate: Arc<G>,
    broadcaster: ChangeBroadcaster<R, P, C>,
    clock: Arc<C>,
    config: TaskRelationConfig,
}

impl<R, G, P, C> ChecklistSequencerService<R, G, P, C>
where
    R: TaskRepository,
    G: AccessGate,
    P: TaskEventPublisher,
    C: Clock + Send + Sync,
{
    /// Creates a checklist service with default configuration.
    #[must_use]
    pub fn new(repository: Arc<R>, gate: Arc<G>, publisher: Arc<P>, clock: Arc<C>) -> Self {
        Self {
            broadcaster: ChangeBroadcaster::new(
                Arc::clone(&repository),
                publisher,
                Arc::clone(&clock),
            ),
            repository,
            gate,
            clock,
            config: TaskRelationConfig::default(),
        }
    }

    /// Replaces the validation configuration.
    #[must_use]
    pub const fn with_config(mut self, config: TaskRelationConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds an incomplete item to a task's checklist.
    ///
    /// Without an explicit index the item goes after the current maximum. An
    /// explicit index inserts the item there and shifts later items down.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] or
    /// [`TaskRelationError::Forbidden`] from authorization and
    /// [`TaskRelationError::Domain`] for blank or oversized text.
    pub async fn add_item(
        &self,
        request: AddChecklistItemRequest,
        actor_id: UserId,
    ) -> TaskRelationResult<ChecklistItem> {
        let AddChecklistItemRequest {
            task_id,
            text,
            order_index,
        } = request;
        let authorized = self.gate.authorize(task_id, actor_id).await?;
        let item_text = ChecklistText::new(text, self.config.max_checklist_text_chars)?;

        let current = self.repository.checklist_items(task_id).await?;
        let index = insertion_index(order_index, next_order_index(&current));
        let item = ChecklistItem::new(task_id, item_text, index, &*self.clock);
        self.repository.insert_checklist_item(&item).await?;
        tracing::info!(%task_id, item_id = %item.id(), order_index = index, %actor_id, "checklist item added");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::ChecklistItemAdded { item_id: item.id() },
            )
            .await;
        Ok(item)
    }

    /// Applies a partial update to an item's text and completion.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or item is
    /// missing, or the item belongs to another task,
    /// [`TaskRelationError::Forbidden`] from authorization, and
    /// [`TaskRelationError::Domain`] for invalid text.
    pub async fn update_item(
        &self,
        request: UpdateChecklistItemRequest,
        actor_id: UserId,
    ) -> TaskRelationResult<ChecklistItem> {
        let UpdateChecklistItemRequest {
            task_id,
            item_id,
            text,
            is_completed,
        } = request;
        let authorized = self.gate.authorize(task_id, actor_id).await?;
        let mut item = self.owned_item(task_id, item_id).await?;

        let patch = ChecklistItemPatch {
            item_text: text
                .map(|raw| ChecklistText::new(raw, self.config.max_checklist_text_chars))
                .transpose()?,
            is_completed,
        };
        if patch.is_empty() {
            return Ok(item);
        }
        item.apply(patch, &*self.clock);
        self.repository
            .update_checklist_item(&item)
            .await
            .map_err(map_missing_item)?;
        tracing::info!(%task_id, %item_id, %actor_id, "checklist item updated");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::ChecklistItemUpdated { item_id },
            )
            .await;
        Ok(item)
    }

    /// Deletes an item; later items move up so indices stay dense.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or item is
    /// missing, or the item belongs to another task, and
    /// [`TaskRelationError::Forbidden`] from authorization.
    pub async fn delete_item(
        &self,
        task_id: TaskId,
        item_id: ChecklistItemId,
        actor_id: UserId,
    ) -> TaskRelationResult<()> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;
        self.owned_item(task_id, item_id).await?;

        self.repository
            .delete_checklist_item(item_id)
            .await
            .map_err(map_missing_item)?;
        tracing::info!(%task_id, %item_id, %actor_id, "checklist item deleted");

        self.broadcaster
            .task_changed(
                &authorized,
                actor_id,
                TaskChange::ChecklistItemDeleted { item_id },
            )
            .await;
        Ok(())
    }

    /// Lists a task's checklist in order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] or
    /// [`TaskRelationError::Forbidden`] from authorization, and repository
    /// errors.
    pub async fn list_items(
        &self,
        task_id: TaskId,
        actor_id: UserId,
    ) -> TaskRelationResult<Vec<ChecklistItem>> {
        self.gate.authorize(task_id, actor_id).await?;
        Ok(self.repository.checklist_items(task_id).await?)
    }

    /// Replaces the whole checklist order.
    ///
    /// `ordered_item_ids` must name every current item exactly once; item `i`
    /// in the list gets order index `i`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::Forbidden`] when the submission is not a
    /// complete permutation of the task's items or the actor may not access
    /// the task, and [`TaskRelationError::NotFound`] when the task is missing.
    pub async fn reorder(
        &self,
        task_id: TaskId,
        actor_id: UserId,
        ordered_item_ids: &[ChecklistItemId],
    ) -> TaskRelationResult<Vec<ChecklistItem>> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;
        let current = self.repository.checklist_items(task_id).await?;

        if !is_complete_permutation(&current, ordered_item_ids) {
            return Err(TaskRelationError::Forbidden(
                ForbiddenReason::ChecklistOrderMismatch {
                    expected: current.len(),
                    submitted: ordered_item_ids.len(),
                },
            ));
        }

        self.commit_order(&authorized, actor_id, ordered_item_ids)
            .await
    }

    /// Moves one item to `new_index`, clamped to the last position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationError::NotFound`] when the task or item is
    /// missing, or the item belongs to another task, and
    /// [`TaskRelationError::Forbidden`] from authorization.
    pub async fn move_item(
        &self,
        task_id: TaskId,
        item_id: ChecklistItemId,
        actor_id: UserId,
        new_index: u32,
    ) -> TaskRelationResult<Vec<ChecklistItem>> {
        let authorized = self.gate.authorize(task_id, actor_id).await?;
        let current = self.repository.checklist_items(task_id).await?;
        let ordered = move_to_position(&current, item_id, new_index).ok_or(
            TaskRelationError::NotFound(MissingEntity::ChecklistItem(item_id)),
        )?;

        self.commit_order(&authorized, actor_id, &ordered).await
    }

    async fn commit_order(
        &self,
        authorized: &TaskWithAccess,
        actor_id: UserId,
        ordered_item_ids: &[ChecklistItemId],
    ) -> TaskRelationResult<Vec<ChecklistItem>> {
        let task_id = authorized.task.id();
        self.repository
            .apply_checklist_order(task_id, ordered_item_ids)
            .await?;
        tracing::info!(%task_id, items = ordered_item_ids.len(), %actor_id, "checklist reordered");

        self.broadcaster
            .task_changed(authorized, actor_id, TaskChange::ChecklistReordered)
            .await;
        Ok(self.repository.checklist_items(task_id).await?)
    }

    async fn owned_item(
        &self,
        task_id: TaskId,
        item_id: ChecklistItemId,
    ) -> TaskRelationResult<ChecklistItem> {
        self.repository
            .find_checklist_item(item_id)
            .await?
            .filter(|item| item.task_id() == task_id)
            .ok_or(TaskRelationError::NotFound(MissingEntity::ChecklistItem(
                item_id,
            )))
    }
}

fn map_missing_item(err: TaskRepositoryError) -> TaskRelationError {
    match err {
        TaskRepositoryError::ChecklistItemNotFound(id) => {
            TaskRelationError::NotFound(MissingEntity::ChecklistItem(id))
        }
        other => TaskRelationError::Repository(other),
    }
}
