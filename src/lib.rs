/*!
 * Native Sync Library
 * Ownership-checked condition variables, signalers and thread spawning
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::id::ThreadToken;
pub use crate::core::sync::{Backend, BackendType, OwnedConditionVariable, Signaler, SyncConfig, WaitOutcome};
pub use crate::core::thread::{spawn, EntryContext, ThreadHandle, ThreadSpawner};
pub use monitoring::init_tracing;
