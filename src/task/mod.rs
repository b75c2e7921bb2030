//! Task relationship management for Trellis.
//!
//! This module keeps three kinds of relationship consistent: the dependency
//! graph between tasks of one project, the assignee set of each task, and the
//! ordered checklist of each task. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
