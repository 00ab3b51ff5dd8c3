/*!
 * Shared Test Utilities
 * Fault-injecting backend wrapped around the parking_lot backend
 */

#![allow(dead_code)]

use native_sync::core::sync::{
    NativeBackend, NativeError, NativePair, NativeResult, PairGuard, PairState, ParkingLotBackend,
    WaitLimit, WaitStatus,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Switches shared between a `FaultyBackend` and the test driving it
#[derive(Debug, Default)]
pub struct Faults {
    pub fail_create: AtomicBool,
    pub fail_lock: AtomicBool,
    pub fail_wait: AtomicBool,
    pub destroyed: AtomicUsize,
}

impl Faults {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// Backend whose native calls fail on demand
pub struct FaultyBackend {
    inner: ParkingLotBackend,
    faults: Arc<Faults>,
}

impl FaultyBackend {
    pub fn new(faults: Arc<Faults>) -> Self {
        Self {
            inner: ParkingLotBackend,
            faults,
        }
    }
}

impl NativeBackend for FaultyBackend {
    fn create_pair(&self) -> NativeResult<Box<dyn NativePair>> {
        if self.faults.fail_create.load(Ordering::SeqCst) {
            return Err(NativeError::Allocation("ENOMEM".into()));
        }
        Ok(Box::new(FaultyPair {
            inner: self.inner.create_pair()?,
            faults: self.faults.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "faulty"
    }
}

struct FaultyPair {
    inner: Box<dyn NativePair>,
    faults: Arc<Faults>,
}

impl NativePair for FaultyPair {
    fn lock(&self) -> NativeResult<Box<dyn PairGuard + '_>> {
        if self.faults.fail_lock.load(Ordering::SeqCst) {
            return Err(NativeError::Os("EINVAL".into()));
        }
        Ok(Box::new(FaultyGuard {
            inner: self.inner.lock()?,
            faults: &self.faults,
        }))
    }

    fn broadcast(&self) -> NativeResult<()> {
        self.inner.broadcast()
    }

    fn destroy(self: Box<Self>) -> NativeResult<()> {
        self.faults.destroyed.fetch_add(1, Ordering::SeqCst);
        self.inner.destroy()
    }
}

struct FaultyGuard<'a> {
    inner: Box<dyn PairGuard + 'a>,
    faults: &'a Faults,
}

impl PairGuard for FaultyGuard<'_> {
    fn state(&mut self) -> &mut PairState {
        self.inner.state()
    }

    fn wait(&mut self, limit: WaitLimit) -> NativeResult<WaitStatus> {
        if self.faults.fail_wait.load(Ordering::SeqCst) {
            return Err(NativeError::Os("EINVAL".into()));
        }
        self.inner.wait(limit)
    }
}

/// Spin until `probe` reports at least `count`
pub fn wait_until_waiting(probe: impl Fn() -> usize, count: usize) {
    while probe() < count {
        std::thread::yield_now();
    }
}
