//! Execution engine for groupctl
//!
//! The engine orchestrates:
//! 1. Planning - Pair declared groups with stored state, optionally refreshed
//! 2. Diffing - Classify and display what would change
//! 3. Executing - Confirm, apply concurrently, record the observed result

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ApplyOptions, apply};
