/*!
 * Signaler
 *
 * Bare mutex + condition rendezvous with no ownership bookkeeping. Any
 * thread may wait or broadcast at any time; the native mutex is taken
 * internally around each call and never held between calls.
 *
 * A broadcast only reaches threads already waiting. Callers that can't
 * afford a lost wakeup must check their own predicate before waiting.
 */

use super::backend::Backend;
use super::generation::{await_broadcast, publish};
use super::traits::{NativePair, PairGuard, WaitLimit};
use crate::core::errors::{SyncError, SyncResult};
use crate::core::handle::NativeHandle;
use crate::core::time;
use crate::monitoring::span_primitive;
use std::fmt;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Wait/broadcast rendezvous point
pub struct Signaler {
    native: NativeHandle<Box<dyn NativePair>>,
    backend: &'static str,
}

impl Signaler {
    /// Create with the default backend
    pub fn create() -> SyncResult<Self> {
        Self::with_backend(&Backend::default())
    }

    /// Create on a specific backend
    pub fn with_backend(backend: &Backend) -> SyncResult<Self> {
        let native = backend.allocate()?;
        debug!(handle = native.id(), backend = backend.name(), "Signaler created");
        Ok(Self {
            native,
            backend: backend.name(),
        })
    }

    /// Destroy both native objects
    ///
    /// Succeeds only if the native teardown reports no failure.
    pub fn destroy(self) -> SyncResult<()> {
        let id = self.native.id();
        self.native.release().map_err(|e| {
            warn!(handle = id, error = %e, "Native destroy failed");
            SyncError::DestroyFailed(e.to_string())
        })?;
        debug!(handle = id, "Signaler destroyed");
        Ok(())
    }

    /// Block until the next broadcast
    pub fn wait(&self) -> SyncResult<()> {
        let _span = span_primitive(self.native.kind(), self.native.id()).entered();
        let mut guard = self.enter()?;
        let seen = guard.state().generation;

        await_broadcast(&mut *guard, seen, WaitLimit::Forever).map_err(|e| {
            warn!(handle = self.native.id(), error = %e, "Native wait failed");
            SyncError::WaitFailed(e.to_string())
        })?;
        Ok(())
    }

    /// Block until the next broadcast or `relative_nanos` elapse
    ///
    /// Returns `true` exactly when a broadcast arrived before the deadline.
    /// A non-positive timeout checks once without blocking.
    pub fn wait_timeout(&self, relative_nanos: i64) -> SyncResult<bool> {
        let timeout = time::nanos_to_duration(relative_nanos);
        let limit = match time::monotonic_deadline(timeout) {
            Some(deadline) => WaitLimit::Until(deadline),
            None => WaitLimit::Forever,
        };
        let _span = span_primitive(self.native.kind(), self.native.id()).entered();

        let mut guard = self.enter()?;
        let seen = guard.state().generation;

        let woken = await_broadcast(&mut *guard, seen, limit).map_err(|e| {
            warn!(handle = self.native.id(), error = %e, "Native timed wait failed");
            SyncError::WaitFailed(e.to_string())
        })?;
        if !woken {
            trace!(handle = self.native.id(), ?timeout, "Signaler wait expired");
        }
        Ok(woken)
    }

    /// `wait_timeout` taking a `Duration`
    pub fn wait_for(&self, timeout: Duration) -> SyncResult<bool> {
        self.wait_timeout(time::duration_to_nanos(timeout))
    }

    /// Wake every thread currently waiting
    pub fn broadcast(&self) -> SyncResult<()> {
        let mut guard = self.enter()?;
        let woke = publish(self.pair(), &mut *guard).map_err(|e| SyncError::Native(e.to_string()))?;
        trace!(handle = self.native.id(), woke, "Signaler broadcast");
        Ok(())
    }

    /// Threads currently waiting (for diagnostics)
    pub fn waiter_count(&self) -> usize {
        match self.enter() {
            Ok(mut guard) => guard.state().waiters,
            Err(_) => 0,
        }
    }

    #[inline]
    pub fn backend_name(&self) -> &'static str {
        self.backend
    }

    #[inline]
    fn pair(&self) -> &dyn NativePair {
        &**self.native.get()
    }

    fn enter(&self) -> SyncResult<Box<dyn PairGuard + '_>> {
        self.pair().lock().map_err(|e| SyncError::WaitFailed(e.to_string()))
    }
}

impl fmt::Debug for Signaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signaler")
            .field("handle", &self.native.id())
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_signaler_wake_one_waiter() {
        let signaler = Arc::new(Signaler::create().unwrap());
        let signaler_clone = signaler.clone();

        let handle = thread::spawn(move || signaler_clone.wait());

        while signaler.waiter_count() == 0 {
            thread::yield_now();
        }
        signaler.broadcast().unwrap();

        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_signaler_timeout() {
        let signaler = Signaler::create().unwrap();
        let start = Instant::now();
        let woken = signaler.wait_timeout(50_000_000).unwrap();
        let elapsed = start.elapsed();

        assert!(!woken); // Should timeout
        assert!(elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn test_signaler_non_positive_timeout() {
        let signaler = Signaler::create().unwrap();
        let start = Instant::now();
        assert!(!signaler.wait_timeout(0).unwrap());
        assert!(!signaler.wait_timeout(-1_000).unwrap());
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_signaler_timed_wait_woken() {
        let signaler = Arc::new(Signaler::create().unwrap());
        let signaler_clone = signaler.clone();

        let handle = thread::spawn(move || signaler_clone.wait_for(Duration::from_secs(5)));

        while signaler.waiter_count() == 0 {
            thread::yield_now();
        }
        signaler.broadcast().unwrap();

        assert_eq!(handle.join().unwrap(), Ok(true));
    }

    #[test]
    fn test_signaler_destroy() {
        let signaler = Signaler::create().unwrap();
        assert_eq!(signaler.waiter_count(), 0);
        assert!(signaler.destroy().is_ok());
    }
}
