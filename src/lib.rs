//! Trellis: relationship core for project tasks.
//!
//! This crate maintains the structures that hang off a task: the dependency
//! graph between tasks of one project, the set of users assigned to a task,
//! and the ordered checklist inside it.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Authorized operations composed from ports
//!
//! # Modules
//!
//! - [`task`]: Dependencies, assignments, and checklists of tasks

pub mod task;
