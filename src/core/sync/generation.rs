/*!
 * Notification Generations
 *
 * Broadcasts are published by bumping `PairState::generation` under the
 * native mutex. A waiter snapshots the generation on entry and only returns
 * once it has changed, which filters spurious native wakeups and makes a
 * broadcast with no waiters a no-op.
 */

use super::traits::{NativePair, NativeResult, PairGuard, WaitLimit};
use std::time::Instant;

/// Block until the generation moves past `seen` or `limit` expires
///
/// Registers the caller as a waiter for the duration. Always performs one
/// non-blocking check before giving up, so an expired limit never blocks.
/// Returns `Ok(true)` if a broadcast was observed, `Ok(false)` on timeout.
pub(super) fn await_broadcast(
    guard: &mut (dyn PairGuard + '_),
    seen: u64,
    limit: WaitLimit,
) -> NativeResult<bool> {
    guard.state().waiters += 1;

    let result = loop {
        if guard.state().generation != seen {
            break Ok(true);
        }
        if let WaitLimit::Until(deadline) = limit {
            if Instant::now() >= deadline {
                break Ok(false);
            }
        }
        if let Err(e) = guard.wait(limit) {
            break Err(e);
        }
    };

    guard.state().waiters -= 1;
    result
}

/// Wake every current waiter
///
/// Returns whether anyone was waiting. The generation is rolled back if the
/// native broadcast fails so that waiters are not left half-notified.
pub(super) fn publish(pair: &dyn NativePair, guard: &mut (dyn PairGuard + '_)) -> NativeResult<bool> {
    if guard.state().waiters == 0 {
        return Ok(false);
    }

    let seen = guard.state().generation;
    guard.state().generation = seen.wrapping_add(1);
    if let Err(e) = pair.broadcast() {
        guard.state().generation = seen;
        return Err(e);
    }
    Ok(true)
}
