//! Project membership context used to authorize callers.

use super::{ProjectId, Task, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ownership and membership of the project that owns a task.
///
/// This is read fresh for every call; nothing here is cached between
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAccess {
    project_id: ProjectId,
    workspace_id: WorkspaceId,
    workspace_owner_id: UserId,
    member_ids: BTreeSet<UserId>,
}

impl ProjectAccess {
    /// Creates a membership context with no project members.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        workspace_id: WorkspaceId,
        workspace_owner_id: UserId,
    ) -> Self {
        Self {
            project_id,
            workspace_id,
            workspace_owner_id,
            member_ids: BTreeSet::new(),
        }
    }

    /// Adds project members.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = UserId>) -> Self {
        self.member_ids.extend(members);
        self
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the workspace that owns the project.
    #[must_use]
    pub const fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Returns the workspace owner.
    #[must_use]
    pub const fn workspace_owner_id(&self) -> UserId {
        self.workspace_owner_id
    }

    /// Returns the project members.
    #[must_use]
    pub const fn member_ids(&self) -> &BTreeSet<UserId> {
        &self.member_ids
    }

    /// Returns whether `actor` owns the workspace or belongs to the project.
    #[must_use]
    pub fn permits(&self, actor: UserId) -> bool {
        self.workspace_owner_id == actor || self.member_ids.contains(&actor)
    }
}

/// A task together with the membership context it was authorized against.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithAccess {
    /// The loaded task.
    pub task: Task,
    /// Membership of the owning project.
    pub access: ProjectAccess,
}

impl TaskWithAccess {
    /// Returns the workspace that owns the task's project.
    #[must_use]
    pub const fn workspace_id(&self) -> WorkspaceId {
        self.access.workspace_id()
    }
}
