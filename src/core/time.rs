/*!
 * Time Sources and Timeout Arithmetic
 *
 * Callers pass absolute epoch-nanosecond instants or relative nanosecond
 * counts; backends want either a relative `Duration` or an absolute
 * monotonic `Instant`. Everything converting between the two lives here.
 */

use crate::core::limits::NANOS_PER_SECOND;
use std::sync::OnceLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Nanoseconds since the UNIX epoch (wall clock)
    fn epoch_nanos(&self) -> i64;

    /// Nanoseconds on a monotonic clock with an arbitrary origin
    fn monotonic_nanos(&self) -> i64;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

fn anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

impl Clock for SystemClock {
    fn epoch_nanos(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => duration_to_nanos(since),
            // Wall clock before 1970
            Err(err) => -duration_to_nanos(err.duration()),
        }
    }

    fn monotonic_nanos(&self) -> i64 {
        duration_to_nanos(anchor().elapsed())
    }
}

/// Saturating conversion into signed nanoseconds
#[inline]
pub fn duration_to_nanos(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX)
}

/// Split a nanosecond count into whole seconds and the sub-second remainder
///
/// Negative counts clamp to zero.
#[inline]
pub fn split_nanos(nanos: i64) -> (u64, u32) {
    if nanos <= 0 {
        return (0, 0);
    }
    let secs = (nanos / NANOS_PER_SECOND) as u64;
    let subsec = (nanos % NANOS_PER_SECOND) as u32;
    (secs, subsec)
}

/// Relative nanoseconds as a `Duration`, zero when not positive
#[inline]
pub fn nanos_to_duration(nanos: i64) -> Duration {
    let (secs, subsec) = split_nanos(nanos);
    Duration::new(secs, subsec)
}

/// Time left between two epoch instants, zero if the deadline has passed
#[inline]
pub fn relative_timeout(now_epoch_nanos: i64, deadline_epoch_nanos: i64) -> Duration {
    nanos_to_duration(deadline_epoch_nanos.saturating_sub(now_epoch_nanos))
}

/// Epoch deadline `timeout` after `now_epoch_nanos`
#[inline]
pub fn deadline_after(now_epoch_nanos: i64, timeout: Duration) -> i64 {
    now_epoch_nanos.saturating_add(duration_to_nanos(timeout))
}

/// Monotonic deadline `timeout` from now
///
/// `None` when the deadline is too far out to represent, which callers treat
/// as "wait forever".
#[inline]
pub fn monotonic_deadline(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
