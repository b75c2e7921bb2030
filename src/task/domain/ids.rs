//! Identifier types for the task relationship domain.
//!
//! Every identifier wraps a UUID so that values from different tables can not
//! be mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a task.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for the project that owns a task.
    ProjectId
);

uuid_identifier!(
    /// Unique identifier for the workspace that owns a project.
    WorkspaceId
);

uuid_identifier!(
    /// Unique identifier for a user acting on, or assigned to, a task.
    UserId
);

uuid_identifier!(
    /// Unique identifier for a dependency edge between two tasks.
    DependencyId
);

uuid_identifier!(
    /// Unique identifier for a user assignment on a task.
    AssignmentId
);

uuid_identifier!(
    /// Unique identifier for a checklist item.
    ChecklistItemId
);
