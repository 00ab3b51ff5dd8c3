/*!
 * std Backend
 *
 * Mutex + condition built on `std::sync`. Timed waits take a relative
 * timeout (`Condvar::wait_timeout`), recomputed from the caller's deadline on
 * every call. A poisoned mutex is this backend's native failure.
 */

use crate::core::sync::traits::{
    NativeBackend, NativeError, NativePair, NativeResult, PairGuard, PairState, WaitLimit,
    WaitStatus,
};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Instant;

/// Backend using `std::sync` primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct StdBackend;

impl NativeBackend for StdBackend {
    fn create_pair(&self) -> NativeResult<Box<dyn NativePair>> {
        Ok(Box::new(StdPair {
            mutex: Mutex::new(PairState::default()),
            condvar: Condvar::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "std"
    }
}

struct StdPair {
    mutex: Mutex<PairState>,
    condvar: Condvar,
}

struct StdGuard<'a> {
    // Vacated only for the duration of a condvar wait
    guard: Option<MutexGuard<'a, PairState>>,
    condvar: &'a Condvar,
}

impl PairGuard for StdGuard<'_> {
    fn state(&mut self) -> &mut PairState {
        match self.guard.as_deref_mut() {
            Some(state) => state,
            None => unreachable!("std pair guard vacated outside of wait"),
        }
    }

    fn wait(&mut self, limit: WaitLimit) -> NativeResult<WaitStatus> {
        let guard = match self.guard.take() {
            Some(guard) => guard,
            None => unreachable!("std pair guard vacated outside of wait"),
        };

        match limit {
            WaitLimit::Forever => match self.condvar.wait(guard) {
                Ok(guard) => {
                    self.guard = Some(guard);
                    Ok(WaitStatus::Notified)
                }
                Err(poisoned) => {
                    self.guard = Some(poisoned.into_inner());
                    Err(NativeError::Poisoned)
                }
            },
            WaitLimit::Until(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match self.condvar.wait_timeout(guard, timeout) {
                    Ok((guard, result)) => {
                        self.guard = Some(guard);
                        if result.timed_out() {
                            Ok(WaitStatus::TimedOut)
                        } else {
                            Ok(WaitStatus::Notified)
                        }
                    }
                    Err(poisoned) => {
                        let (guard, _) = poisoned.into_inner();
                        self.guard = Some(guard);
                        Err(NativeError::Poisoned)
                    }
                }
            }
        }
    }
}

impl NativePair for StdPair {
    fn lock(&self) -> NativeResult<Box<dyn PairGuard + '_>> {
        let guard = self.mutex.lock().map_err(|_| NativeError::Poisoned)?;
        Ok(Box::new(StdGuard {
            guard: Some(guard),
            condvar: &self.condvar,
        }))
    }

    fn broadcast(&self) -> NativeResult<()> {
        self.condvar.notify_all();
        Ok(())
    }

    fn destroy(self: Box<Self>) -> NativeResult<()> {
        let StdPair { mutex, condvar } = *self;
        drop(condvar);
        mutex
            .into_inner()
            .map(|_| ())
            .map_err(|_| NativeError::Poisoned)
    }
}
