//! In-memory adapters for every task relationship port.

mod events;
mod repository;
mod users;

pub use events::{InMemoryAssignmentNotifier, InMemoryEventPublisher, SentNotification};
pub use repository::InMemoryTaskRepository;
pub use users::InMemoryUserDirectory;
