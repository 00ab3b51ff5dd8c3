/*!
 * Owned Condition Variable
 *
 * Mutex + condition pair that records which thread holds the critical
 * section. Misuse (double lock, unlock or wait by a non-owner, destroy while
 * held) is reported as an error value instead of undefined behavior.
 *
 * # Lock Model
 *
 * The critical section is a logical lock: the native mutex only guards the
 * owner field and is never held across calls. `lock` by the current owner
 * fails with `AlreadyLocked`; `lock` by another thread blocks until the
 * section is released, either by `unlock` or by the owner entering a wait.
 */

use super::backend::Backend;
use super::generation::{await_broadcast, publish};
use super::traits::{NativePair, NativeResult, PairGuard, PairState, WaitLimit};
use crate::core::errors::{DestroyError, SyncError, SyncResult};
use crate::core::handle::NativeHandle;
use crate::core::id::ThreadToken;
use crate::core::time::{self, Clock, SystemClock};
use crate::monitoring::span_primitive;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Outcome of a timed wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Woken by a notify; the caller owns the section again
    Woken,
    /// The deadline passed; the section is NOT re-acquired
    TimedOut,
    /// Caller was not the owner, or the native wait failed
    NotOwner,
}

impl WaitOutcome {
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WaitOutcome::Woken)
    }

    #[inline(always)]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// Condition variable with ownership tracking
///
/// # Example
///
/// ```
/// use native_sync::core::id;
/// use native_sync::core::sync::OwnedConditionVariable;
///
/// let cv = OwnedConditionVariable::create().unwrap();
/// let me = id::current();
///
/// cv.lock(me).unwrap();
/// assert!(cv.lock(me).is_err()); // not reentrant
/// cv.unlock(me).unwrap();
/// cv.destroy().unwrap();
/// ```
pub struct OwnedConditionVariable {
    native: NativeHandle<Box<dyn NativePair>>,
    backend: &'static str,
}

impl OwnedConditionVariable {
    /// Create with the default backend
    pub fn create() -> SyncResult<Self> {
        Self::with_backend(&Backend::default())
    }

    /// Create on a specific backend
    pub fn with_backend(backend: &Backend) -> SyncResult<Self> {
        let native = backend.allocate()?;
        debug!(handle = native.id(), backend = backend.name(), "Condition variable created");
        Ok(Self {
            native,
            backend: backend.name(),
        })
    }

    /// Release the native resources
    ///
    /// Rejected with `BusyResource` while any thread owns the section; the
    /// primitive is then returned inside the error, untouched.
    pub fn destroy(self) -> Result<(), DestroyError<Self>> {
        let state = match self.snapshot() {
            Ok(state) => state,
            Err(e) => return Err(DestroyError::rejected(e, self)),
        };

        if let Some(owner) = state.owner {
            warn!(handle = self.native.id(), owner = %owner, "Destroy rejected: critical section still held");
            return Err(DestroyError::rejected(SyncError::BusyResource, self));
        }

        let id = self.native.id();
        self.native.release().map_err(|e| {
            warn!(handle = id, error = %e, "Native destroy failed");
            DestroyError::failed(SyncError::DestroyFailed(e.to_string()))
        })?;
        debug!(handle = id, "Condition variable destroyed");
        Ok(())
    }

    /// Enter the critical section
    pub fn lock(&self, current: ThreadToken) -> SyncResult<()> {
        let mut guard = self.enter()?;

        loop {
            let owner = guard.state().owner;
            match owner {
                None => break,
                Some(owner) if owner == current => {
                    warn!(handle = self.native.id(), thread = %current, "Lock rejected: section already held by caller");
                    return Err(SyncError::AlreadyLocked);
                }
                Some(_) => guard
                    .wait(WaitLimit::Forever)
                    .map_err(|e| SyncError::Native(e.to_string()))?,
            };
        }

        guard.state().owner = Some(current);
        trace!(handle = self.native.id(), thread = %current, "Critical section entered");
        Ok(())
    }

    /// Enter the critical section only if nobody holds it
    pub fn try_lock(&self, current: ThreadToken) -> SyncResult<()> {
        let mut guard = self.enter()?;

        if let Some(owner) = guard.state().owner {
            trace!(handle = self.native.id(), thread = %current, owner = %owner, "Try-lock found section held");
            return Err(SyncError::AlreadyLocked);
        }

        guard.state().owner = Some(current);
        trace!(handle = self.native.id(), thread = %current, "Critical section entered");
        Ok(())
    }

    /// Leave the critical section
    pub fn unlock(&self, current: ThreadToken) -> SyncResult<()> {
        let mut guard = self.enter()?;
        self.check_owner(guard.state(), current, "Unlock")?;

        self.release_section(&mut *guard)
            .map_err(|e| SyncError::Native(e.to_string()))?;
        trace!(handle = self.native.id(), thread = %current, "Critical section left");
        Ok(())
    }

    /// Release the section, block until notified, re-acquire it
    pub fn wait(&self, current: ThreadToken) -> SyncResult<()> {
        let _span = span_primitive(self.native.kind(), self.native.id()).entered();
        let mut guard = self.enter()?;
        self.check_owner(guard.state(), current, "Wait")?;

        let seen = guard.state().generation;
        self.release_section(&mut *guard)
            .map_err(|e| SyncError::WaitFailed(e.to_string()))?;

        let result = await_broadcast(&mut *guard, seen, WaitLimit::Forever)
            .and_then(|_| reacquire(&mut *guard, current));
        if let Err(e) = result {
            warn!(handle = self.native.id(), thread = %current, error = %e, "Native wait failed");
            return Err(SyncError::WaitFailed(e.to_string()));
        }

        trace!(handle = self.native.id(), thread = %current, "Woken, critical section re-entered");
        Ok(())
    }

    /// Timed wait against caller-supplied epoch instants
    ///
    /// The relative timeout is `deadline - now`; a non-positive value does a
    /// single non-blocking check. On `TimedOut` the section is left released
    /// and the caller must lock again.
    pub fn wait_timeout(
        &self,
        current: ThreadToken,
        now_epoch_nanos: i64,
        deadline_epoch_nanos: i64,
    ) -> WaitOutcome {
        let timeout = time::relative_timeout(now_epoch_nanos, deadline_epoch_nanos);
        let limit = match time::monotonic_deadline(timeout) {
            Some(deadline) => WaitLimit::Until(deadline),
            None => WaitLimit::Forever,
        };
        let _span = span_primitive(self.native.kind(), self.native.id()).entered();

        let mut guard = match self.enter() {
            Ok(guard) => guard,
            Err(e) => {
                warn!(handle = self.native.id(), error = %e, "Timed wait could not enter native mutex");
                return WaitOutcome::NotOwner;
            }
        };
        if self.check_owner(guard.state(), current, "Timed wait").is_err() {
            return WaitOutcome::NotOwner;
        }

        let seen = guard.state().generation;
        if let Err(e) = self.release_section(&mut *guard) {
            warn!(handle = self.native.id(), error = %e, "Timed wait could not release section");
            return WaitOutcome::NotOwner;
        }

        match await_broadcast(&mut *guard, seen, limit) {
            Ok(true) => {}
            Ok(false) => {
                trace!(handle = self.native.id(), thread = %current, ?timeout, "Timed wait expired");
                return WaitOutcome::TimedOut;
            }
            Err(e) => {
                // Conservatively reported as an ownership problem
                warn!(handle = self.native.id(), thread = %current, error = %e, "Native timed wait failed");
                return WaitOutcome::NotOwner;
            }
        }

        match reacquire(&mut *guard, current) {
            Ok(()) => WaitOutcome::Woken,
            Err(e) => {
                warn!(handle = self.native.id(), thread = %current, error = %e, "Re-acquire after wake failed");
                WaitOutcome::NotOwner
            }
        }
    }

    /// Timed wait for a relative duration, read against the system clock
    pub fn wait_for(&self, current: ThreadToken, timeout: Duration) -> WaitOutcome {
        self.wait_for_with(&SystemClock, current, timeout)
    }

    /// Timed wait for a relative duration, read against `clock`
    pub fn wait_for_with(&self, clock: &dyn Clock, current: ThreadToken, timeout: Duration) -> WaitOutcome {
        let now = clock.epoch_nanos();
        self.wait_timeout(current, now, time::deadline_after(now, timeout))
    }

    /// Wake every thread blocked in `wait` or `wait_timeout`
    ///
    /// The caller does not need to own the section. With no waiters this has
    /// no effect and nothing is remembered for later waiters.
    pub fn notify_all(&self) -> SyncResult<()> {
        let mut guard = self.enter()?;
        let woke = publish(self.pair(), &mut *guard).map_err(|e| SyncError::Native(e.to_string()))?;
        trace!(handle = self.native.id(), woke, "Notify all");
        Ok(())
    }

    /// Current owner of the section
    pub fn owner(&self) -> Option<ThreadToken> {
        self.snapshot().ok().and_then(|state| state.owner)
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.owner().is_some()
    }

    /// Threads currently blocked waiting for a notify (for diagnostics)
    pub fn waiter_count(&self) -> usize {
        self.snapshot().map(|state| state.waiters).unwrap_or(0)
    }

    /// Name of the backend in use
    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    #[inline]
    fn pair(&self) -> &dyn NativePair {
        &**self.native.get()
    }

    fn enter(&self) -> SyncResult<Box<dyn PairGuard + '_>> {
        self.pair().lock().map_err(|e| SyncError::Native(e.to_string()))
    }

    fn snapshot(&self) -> SyncResult<PairState> {
        let mut guard = self.enter()?;
        Ok(guard.state().clone())
    }

    fn check_owner(&self, state: &PairState, current: ThreadToken, operation: &str) -> SyncResult<()> {
        if state.owner == Some(current) {
            return Ok(());
        }
        warn!(
            handle = self.native.id(),
            thread = %current,
            owner = ?state.owner,
            "{} rejected: caller is not the owner",
            operation
        );
        Err(SyncError::NotOwner)
    }

    /// Clear the owner and wake threads blocked in `lock`
    ///
    /// The broadcast goes out first so that a failure leaves the owner in
    /// place. Blocked lockers can't observe the state until the mutex drops.
    fn release_section(&self, guard: &mut (dyn PairGuard + '_)) -> NativeResult<()> {
        self.pair().broadcast()?;
        guard.state().owner = None;
        Ok(())
    }
}

/// Wait for the section to be free, then claim it
fn reacquire(guard: &mut (dyn PairGuard + '_), current: ThreadToken) -> NativeResult<()> {
    while guard.state().owner.is_some() {
        guard.wait(WaitLimit::Forever)?;
    }
    guard.state().owner = Some(current);
    Ok(())
}

impl fmt::Debug for OwnedConditionVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedConditionVariable")
            .field("handle", &self.native.id())
            .field("backend", &self.backend)
            .field("owner", &self.owner())
            .finish()
    }
}
