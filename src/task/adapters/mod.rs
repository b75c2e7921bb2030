//! Adapter implementations for task relationship ports.

pub mod memory;
pub mod postgres;
