//! `PostgreSQL` adapters for task relationship persistence.

mod conversion;
mod models;
mod repository;
mod schema;
mod users;

pub use repository::{PostgresTaskRepository, TaskPgPool};
pub use users::PostgresUserDirectory;
