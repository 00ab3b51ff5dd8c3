/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Synchronization errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Native initialization failed: {0}")]
    #[diagnostic(
        code(sync::initialization_failure),
        help("The native mutex, condition or thread could not be allocated. Retry or report upward.")
    )]
    InitializationFailure(String),

    #[error("Critical section already locked by the calling thread")]
    #[diagnostic(
        code(sync::already_locked),
        help("Locks are not reentrant. Unlock before locking again.")
    )]
    AlreadyLocked,

    #[error("Calling thread does not own the critical section")]
    #[diagnostic(
        code(sync::not_owner),
        help("Only the thread that locked the section may unlock it or wait on it.")
    )]
    NotOwner,

    #[error("Resource is busy: critical section is still held")]
    #[diagnostic(
        code(sync::busy_resource),
        help("Unlock the section before destroying the primitive.")
    )]
    BusyResource,

    #[error("Native wait failed: {0}")]
    #[diagnostic(
        code(sync::wait_failed),
        help("Treat the primitive as unusable and abort this coordination attempt.")
    )]
    WaitFailed(String),

    #[error("Native destroy failed: {0}")]
    #[diagnostic(code(sync::destroy_failed))]
    DestroyFailed(String),

    #[error("Thread spawn failed: {0}")]
    #[diagnostic(
        code(sync::spawn_failed),
        help("Check thread limits and stack size configuration.")
    )]
    SpawnFailed(String),

    #[error("Native call failed: {0}")]
    #[diagnostic(code(sync::native))]
    Native(String),
}

impl SyncError {
    /// Misuse of the lock discipline by the caller
    pub fn is_lock_discipline(&self) -> bool {
        matches!(
            self,
            SyncError::AlreadyLocked | SyncError::NotOwner | SyncError::BusyResource
        )
    }

    /// Native wait failure, which callers treat like a discipline problem
    pub fn is_wait_failure(&self) -> bool {
        matches!(self, SyncError::WaitFailed(_))
    }
}

/// A failed `destroy` call
///
/// When the destroy was rejected before touching native resources the
/// primitive is handed back, still usable, so it can be destroyed again once
/// the blocking condition is cleared.
pub struct DestroyError<T> {
    error: SyncError,
    primitive: Option<T>,
}

impl<T> DestroyError<T> {
    /// Destroy refused, primitive untouched
    pub(crate) fn rejected(error: SyncError, primitive: T) -> Self {
        Self {
            error,
            primitive: Some(primitive),
        }
    }

    /// Native teardown failed, primitive is gone
    pub(crate) fn failed(error: SyncError) -> Self {
        Self {
            error,
            primitive: None,
        }
    }

    /// Why the destroy failed
    pub fn error(&self) -> &SyncError {
        &self.error
    }

    /// Take the primitive back, if it survived
    pub fn into_inner(self) -> Option<T> {
        self.primitive
    }

    /// Split into the error and the surviving primitive
    pub fn into_parts(self) -> (SyncError, Option<T>) {
        (self.error, self.primitive)
    }
}

impl<T> fmt::Debug for DestroyError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestroyError")
            .field("error", &self.error)
            .field("returned", &self.primitive.is_some())
            .finish()
    }
}

impl<T> fmt::Display for DestroyError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "destroy failed: {}", self.error)
    }
}

impl<T> std::error::Error for DestroyError<T> {}

impl<T> From<DestroyError<T>> for SyncError {
    fn from(err: DestroyError<T>) -> Self {
        err.error
    }
}
