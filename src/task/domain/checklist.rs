//! Ordered checklist items attached to a task.
//!
//! Order indices for one task always form the dense sequence `0..n`. The
//! helpers at the bottom of this module compute new orderings without
//! touching storage so that services can validate a whole batch before any
//! write happens.

use super::{ChecklistItemId, TaskId, TaskRelationDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default upper bound on checklist item length, in characters.
///
/// Deserialized text is held to this bound.
pub const CHECKLIST_TEXT_MAX_CHARS: usize = 1000;

/// Validated, trimmed checklist item text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChecklistText(String);

impl ChecklistText {
    /// Creates validated checklist text.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRelationDomainError::EmptyChecklistText`] for blank text
    /// or [`TaskRelationDomainError::ChecklistTextTooLong`] when the trimmed
    /// text has more than `max_chars` characters.
    pub fn new(value: impl Into<String>, max_chars: usize) -> Result<Self, TaskRelationDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskRelationDomainError::EmptyChecklistText);
        }
        let actual = trimmed.chars().count();
        if actual > max_chars {
            return Err(TaskRelationDomainError::ChecklistTextTooLong {
                actual,
                limit: max_chars,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChecklistText {
    type Error = TaskRelationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value, CHECKLIST_TEXT_MAX_CHARS)
    }
}

impl From<ChecklistText> for String {
    fn from(text: ChecklistText) -> Self {
        text.0
    }
}

impl fmt::Display for ChecklistText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry in a task checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    id: ChecklistItemId,
    task_id: TaskId,
    item_text: ChecklistText,
    is_completed: bool,
    order_index: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted checklist item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedChecklistItemData {
    /// Item identifier.
    pub id: ChecklistItemId,
    /// Owning task.
    pub task_id: TaskId,
    /// Item text.
    pub item_text: ChecklistText,
    /// Completion flag.
    pub is_completed: bool,
    /// Position within the task checklist.
    pub order_index: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ChecklistItem {
    /// Creates an incomplete item at `order_index`.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        item_text: ChecklistText,
        order_index: u32,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ChecklistItemId::new(),
            task_id,
            item_text,
            is_completed: false,
            order_index,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an item from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedChecklistItemData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            item_text: data.item_text,
            is_completed: data.is_completed,
            order_index: data.order_index,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> ChecklistItemId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the item text.
    #[must_use]
    pub const fn item_text(&self) -> &ChecklistText {
        &self.item_text
    }

    /// Returns whether the item has been ticked off.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the position within the checklist.
    #[must_use]
    pub const fn order_index(&self) -> u32 {
        self.order_index
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn apply(&mut self, patch: ChecklistItemPatch, clock: &impl Clock) {
        if let Some(text) = patch.item_text {
            self.item_text = text;
        }
        if let Some(completed) = patch.is_completed {
            self.is_completed = completed;
        }
        self.updated_at = clock.utc();
    }

    pub(crate) const fn set_order_index(&mut self, order_index: u32) {
        self.order_index = order_index;
    }
}

/// Partial update for a checklist item. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecklistItemPatch {
    /// Replacement text.
    pub item_text: Option<ChecklistText>,
    /// Replacement completion flag.
    pub is_completed: Option<bool>,
}

impl ChecklistItemPatch {
    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.item_text.is_none() && self.is_completed.is_none()
    }
}

/// Returns the index a new item gets when the caller names no position: one
/// past the current maximum, or 0 for an empty checklist.
#[must_use]
pub fn next_order_index(items: &[ChecklistItem]) -> u32 {
    items
        .iter()
        .map(ChecklistItem::order_index)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Resolves the position of a new item.
///
/// A requested position is an insertion point clamped to `0..=next`, so the
/// sequence stays dense; without one the item is appended at `next`.
#[must_use]
pub const fn insertion_index(requested: Option<u32>, next: u32) -> u32 {
    match requested {
        Some(index) if index < next => index,
        _ => next,
    }
}

/// Returns whether `submitted` names exactly the items in `current`.
///
/// Cardinality must match and every submitted id must belong to the current
/// set; duplicates therefore fail because they leave an item uncovered.
#[must_use]
pub fn is_complete_permutation(current: &[ChecklistItem], submitted: &[ChecklistItemId]) -> bool {
    if current.len() != submitted.len() {
        return false;
    }
    let known: HashSet<ChecklistItemId> = current.iter().map(ChecklistItem::id).collect();
    let mut seen = HashSet::with_capacity(submitted.len());
    submitted
        .iter()
        .all(|id| known.contains(id) && seen.insert(*id))
}

/// Returns the ids of `current` (sorted by order index) with `item_id` moved
/// to `target`, clamped to the last position.
///
/// Returns `None` when `item_id` is not part of `current`.
#[must_use]
pub fn move_to_position(
    current: &[ChecklistItem],
    item_id: ChecklistItemId,
    target: u32,
) -> Option<Vec<ChecklistItemId>> {
    let mut ordered: Vec<ChecklistItemId> = sorted_by_order(current)
        .iter()
        .map(ChecklistItem::id)
        .collect();
    let from = ordered.iter().position(|id| *id == item_id)?;
    let moved = ordered.remove(from);
    let last = ordered.len();
    let to = usize::try_from(target).map_or(last, |index| index.min(last));
    ordered.insert(to, moved);
    Some(ordered)
}

/// Returns a copy of `items` ordered by index, ties broken by creation time.
#[must_use]
pub fn sorted_by_order(items: &[ChecklistItem]) -> Vec<ChecklistItem> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|left, right| {
        left.order_index
            .cmp(&right.order_index)
            .then_with(|| left.created_at.cmp(&right.created_at))
    });
    sorted
}

/// Rewrites every item's index to its position in `ordered_ids`.
///
/// Items not named in `ordered_ids` are left untouched; callers validate the
/// permutation first with [`is_complete_permutation`].
pub fn apply_order(items: &mut [ChecklistItem], ordered_ids: &[ChecklistItemId]) {
    for (position, id) in ordered_ids.iter().enumerate() {
        let index = u32::try_from(position).unwrap_or(u32::MAX);
        if let Some(item) = items.iter_mut().find(|item| item.id == *id) {
            item.set_order_index(index);
        }
    }
}
