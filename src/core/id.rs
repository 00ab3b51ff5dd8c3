/*!
 * Thread Identity
 * Type-safe thread tokens and the current-thread identity accessor
 */

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::limits::FIRST_THREAD_TOKEN;

// ============================================================================
// Type-Safe Token
// ============================================================================

/// Logical thread identity
///
/// Stable for the lifetime of the thread it was registered on. Only used
/// for equality ("is this the owner?") and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadToken(pub u64);

impl fmt::Display for ThreadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ============================================================================
// Token Generator
// ============================================================================

/// Atomic counter handing out unique tokens
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - Lock-free
#[repr(C, align(64))]
pub struct TokenGenerator {
    counter: AtomicU64,
}

impl TokenGenerator {
    /// Create new generator starting at given value
    #[inline]
    pub const fn new(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }

    #[inline]
    pub fn next(&self) -> ThreadToken {
        ThreadToken(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    /// Next value to be handed out (for debugging)
    #[inline]
    pub fn peek(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(FIRST_THREAD_TOKEN)
    }
}

static TOKENS: TokenGenerator = TokenGenerator::new(FIRST_THREAD_TOKEN);

thread_local! {
    static CURRENT: Cell<Option<ThreadToken>> = const { Cell::new(None) };
}

/// Allocate a fresh, never registered token
#[inline]
pub fn next_token() -> ThreadToken {
    TOKENS.next()
}

/// Token of the calling thread
///
/// Threads started by `ThreadSpawner` get theirs registered before user code
/// runs; any other thread is assigned one lazily on first call.
pub fn current() -> ThreadToken {
    CURRENT.with(|slot| match slot.get() {
        Some(token) => token,
        None => {
            let token = TOKENS.next();
            slot.set(Some(token));
            token
        }
    })
}

/// Token of the calling thread, if one was already assigned
pub fn try_current() -> Option<ThreadToken> {
    CURRENT.with(|slot| slot.get())
}

/// Bind `token` to the calling thread
///
/// Returns `false` and leaves the existing identity in place if the thread
/// already has one.
pub(crate) fn register(token: ThreadToken) -> bool {
    CURRENT.with(|slot| {
        if slot.get().is_some() {
            return false;
        }
        slot.set(Some(token));
        true
    })
}
