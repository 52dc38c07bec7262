//! Provider and callback traits
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific remote API client, UI, or prompt library.

use crate::error::Result;
use crate::resource::Resource;
use crate::types::{ApplyResult, Deletion};

/// Remote API client for one resource type
///
/// Implementations own transport, authentication and transient-error
/// retries. Every call either fully applies or fully fails; the executor
/// never retries.
pub trait Provider<R: Resource>: Send + Sync {
    /// Create a new remote object from the full desired state
    ///
    /// Returns the object as the remote service reports it.
    fn create(&self, desired: &R) -> Result<R>;

    /// Read a remote object by id, `None` when it does not exist
    fn read(&self, id: &str) -> Result<Option<R>>;

    /// Apply `changed` attributes of `desired` to the object `observed`
    ///
    /// Must never change the id.
    fn update(&self, observed: &R, desired: &R, changed: &[R::Attribute]) -> Result<R>;

    /// Delete a remote object by id
    ///
    /// Deleting an absent object may return either `Ok(Deletion::AlreadyAbsent)`
    /// or `Err(Error::NotFound)`; the executor treats both as success.
    fn delete(&self, id: &str) -> Result<Deletion>;
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting to apply a batch of resources
    fn on_batch_start(&mut self, count: usize);

    /// Called when a resource application completes
    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm the planned changes
    ///
    /// # Arguments
    /// * `changes` - `(id, action)` pairs for every instance that would change
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, changes: &[(String, String)]) -> anyhow::Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _changes: &[(String, String)]) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _changes: &[(String, String)]) -> anyhow::Result<bool> {
        Ok(false)
    }
}

