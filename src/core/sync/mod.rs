/*!
 * Synchronization Primitives
 *
 * Ownership-checked mutex + condition pairs and a plain wait/broadcast
 * signaler, built on a pluggable native backend:
 * - parking_lot (default on unix) with absolute deadlines
 * - std::sync (portable) with relative timeouts
 * - any caller-supplied `NativeBackend`
 *
 * # Architecture
 *
 * Each primitive owns exactly one native pair through a `NativeHandle`, so
 * the pair is torn down exactly once. Waits and broadcasts are ordered by a
 * generation counter kept under the native mutex.
 */

mod backend;
mod condvar;
mod config;
mod generation;
mod signaler;
mod traits;

pub use backend::{Backend, ParkingLotBackend, StdBackend};
pub use condvar::{OwnedConditionVariable, WaitOutcome};
pub use config::{BackendType, SyncConfig};
pub use signaler::Signaler;
pub use traits::{
    NativeBackend, NativeError, NativePair, NativeResult, PairGuard, PairState, WaitLimit, WaitStatus,
};
