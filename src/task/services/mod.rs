//! Application services for task relationship orchestration.
//!
//! Every operation authorizes the actor through an [`AccessGate`] first,
//! validates all preconditions, performs its write, and then broadcasts the
//! task's fresh snapshot.
//!
//! [`AccessGate`]: crate::task::ports::AccessGate

mod access;
mod assignment;
mod broadcast;
mod checklist;
mod config;
mod dependency;
mod error;

pub use access::MembershipAccessGate;
pub use assignment::{AssignUserRequest, AssignmentCollaborators, AssignmentSetService};
pub use checklist::{
    AddChecklistItemRequest, ChecklistSequencerService, UpdateChecklistItemRequest,
};
pub use config::TaskRelationConfig;
pub use dependency::{AddDependencyRequest, DependencyGraphService};
pub use error::{ForbiddenReason, MissingEntity, TaskRelationError, TaskRelationResult};
