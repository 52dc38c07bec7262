//! # Declarative
//!
//! A framework for declarative reconciliation of remote resources.
//!
//! This crate provides the core abstractions for comparing a declared
//! desired state with the last observed remote state, classifying the
//! difference, and issuing the remote calls that converge the two.
//!
//! ## Core Concepts
//!
//! - **Resource**: A snapshot of one remote entity, desired or observed
//! - **PlanDecision**: NoOp, Create, UpdateInPlace, Replace or Delete
//! - **Provider**: The remote API client for a resource type
//! - **Executor**: Runs the validate → normalize → plan → execute pipeline
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{Executor, PlanDecision, plan};
//!
//! // Pure planning, no remote calls
//! let decision = plan(observed.as_ref(), Some(&desired));
//! if let PlanDecision::Replace(changed) = &decision {
//!     println!("replacing because of {changed:?}");
//! }
//!
//! // Full pipeline against a provider
//! let executor = Executor::new(&client);
//! let outcome = executor.reconcile(observed.as_ref(), Some(&desired))?;
//! store(outcome.state);
//! ```
//!
//! ## Provider Traits
//!
//! The crate uses traits for dependency injection:
//!
//! - [`Provider`]: Issues create/read/update/delete calls
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific HTTP clients, UI frameworks, etc.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use context::{
    AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback, Provider,
};
pub use diff::{AttributeChange, DiffSummary, ResourceDiff, detect_drift};
pub use error::{Error, ErrorCategory, Result};
pub use executor::{
    Applied, ExecuteReport, Executor, Outcome, Reconciliation, execute, execute_simple, prepare,
};
pub use planner::{PlanDecision, plan};
pub use resource::{Resource, ResourceExt};
pub use types::{
    ApplyResult, ChangeKind, Deletion, ExecuteOptions, ExecuteSummary, Operation,
};
pub use validation::{ValidationError, check_exclusive, check_length};
