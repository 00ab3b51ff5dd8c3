/*!
 * Native Backend Traits
 *
 * The contract every native mutex + condition implementation fulfils.
 * Caller-facing logic (ownership, generations, timeouts) is written once
 * against these traits; backends only supply the raw blocking behavior.
 *
 * # Design: Object-Safe Pair
 *
 * `NativePair` is used as `Box<dyn NativePair>` so that backends can be
 * injected at runtime. Locking hands out a boxed `PairGuard` that exposes
 * the shared bookkeeping and a single blocking wait.
 */

use crate::core::id::ThreadToken;
use std::time::Instant;
use thiserror::Error;

/// Result type for raw native calls
pub type NativeResult<T> = Result<T, NativeError>;

/// Failures reported by a native backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NativeError {
    #[error("native allocation failed: {0}")]
    Allocation(String),

    #[error("native lock poisoned")]
    Poisoned,

    #[error("native call failed: {0}")]
    Os(String),
}

/// Bookkeeping protected by the native mutex
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairState {
    /// Logical owner of the critical section
    pub owner: Option<ThreadToken>,
    /// Bumped by every broadcast that had waiters
    pub generation: u64,
    /// Threads currently blocked waiting for a broadcast
    pub waiters: usize,
}

/// How long a single native wait may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitLimit {
    /// Block until woken
    Forever,
    /// Block until woken or the monotonic deadline passes
    Until(Instant),
}

/// Outcome of a single native wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// Woken by a broadcast (or spuriously)
    Notified,
    /// The deadline passed
    TimedOut,
}

impl WaitStatus {
    #[inline(always)]
    pub fn timed_out(&self) -> bool {
        matches!(self, WaitStatus::TimedOut)
    }
}

/// The native mutex held, with access to the protected state
///
/// Dropping the guard releases the native mutex.
pub trait PairGuard {
    /// Protected bookkeeping
    fn state(&mut self) -> &mut PairState;

    /// Atomically release the mutex, block on the condition, re-acquire
    ///
    /// May return `Notified` spuriously. On error the guard still holds the
    /// mutex and remains usable.
    fn wait(&mut self, limit: WaitLimit) -> NativeResult<WaitStatus>;
}

/// A native mutex + condition pair
pub trait NativePair: Send + Sync {
    /// Acquire the native mutex
    fn lock(&self) -> NativeResult<Box<dyn PairGuard + '_>>;

    /// Wake every thread blocked in `PairGuard::wait`
    ///
    /// Does not require the mutex to be held.
    fn broadcast(&self) -> NativeResult<()>;

    /// Tear down both native objects
    fn destroy(self: Box<Self>) -> NativeResult<()>;
}

/// Factory for native pairs
///
/// # Implementation Notes
///
/// `create_pair` must either return a fully initialized pair or release
/// everything it allocated before returning an error.
pub trait NativeBackend: Send + Sync {
    fn create_pair(&self) -> NativeResult<Box<dyn NativePair>>;

    /// Backend name for debugging
    fn name(&self) -> &'static str;
}
