//! Port contracts for task relationship management.
//!
//! Ports define infrastructure-agnostic interfaces used by the relationship
//! services.

pub mod access;
pub mod events;
pub mod repository;
pub mod users;

pub use access::{AccessError, AccessGate, AccessResult};
pub use events::{AssignmentNotifier, EventPublishError, NotificationError, TaskEventPublisher};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use users::{UserDirectory, UserDirectoryError, UserDirectoryResult};
