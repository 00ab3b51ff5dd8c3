/*!
 * parking_lot Backend
 *
 * Mutex + condition built on parking_lot. Timed waits take an absolute
 * monotonic deadline (`Condvar::wait_until`), so the deadline computed by the
 * caller is passed through unchanged across spurious wakeups.
 */

use crate::core::sync::traits::{
    NativeBackend, NativeError, NativePair, NativeResult, PairGuard, PairState, WaitLimit,
    WaitStatus,
};
use parking_lot::{Condvar, Mutex, MutexGuard};

/// Backend using parking_lot primitives
#[derive(Debug, Clone, Copy, Default)]
pub struct ParkingLotBackend;

impl NativeBackend for ParkingLotBackend {
    fn create_pair(&self) -> NativeResult<Box<dyn NativePair>> {
        Ok(Box::new(ParkingLotPair {
            mutex: Mutex::new(PairState::default()),
            condvar: Condvar::new(),
        }))
    }

    fn name(&self) -> &'static str {
        "parking_lot"
    }
}

struct ParkingLotPair {
    mutex: Mutex<PairState>,
    condvar: Condvar,
}

struct ParkingLotGuard<'a> {
    guard: MutexGuard<'a, PairState>,
    condvar: &'a Condvar,
}

impl PairGuard for ParkingLotGuard<'_> {
    #[inline]
    fn state(&mut self) -> &mut PairState {
        &mut self.guard
    }

    fn wait(&mut self, limit: WaitLimit) -> NativeResult<WaitStatus> {
        match limit {
            WaitLimit::Forever => {
                self.condvar.wait(&mut self.guard);
                Ok(WaitStatus::Notified)
            }
            WaitLimit::Until(deadline) => {
                if self.condvar.wait_until(&mut self.guard, deadline).timed_out() {
                    Ok(WaitStatus::TimedOut)
                } else {
                    Ok(WaitStatus::Notified)
                }
            }
        }
    }
}

impl NativePair for ParkingLotPair {
    fn lock(&self) -> NativeResult<Box<dyn PairGuard + '_>> {
        Ok(Box::new(ParkingLotGuard {
            guard: self.mutex.lock(),
            condvar: &self.condvar,
        }))
    }

    fn broadcast(&self) -> NativeResult<()> {
        self.condvar.notify_all();
        Ok(())
    }

    fn destroy(self: Box<Self>) -> NativeResult<()> {
        if self.mutex.is_locked() {
            return Err(NativeError::Os("mutex destroyed while locked".into()));
        }
        Ok(())
    }
}
