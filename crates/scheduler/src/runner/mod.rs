//! Scheduler runner -- owns the batch and drives runs.
//!
//! Split into focused submodules:
//! - `core`: Scheduler struct, constructor, task registration, and accessors
//! - `execution`: serial and parallel runs, result collection, and summaries

mod core;
mod execution;

pub use self::core::Scheduler;
