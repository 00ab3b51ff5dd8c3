/*!
 * Limits and Constants
 *
 * Centralized location for time ratios, defaults and environment keys.
 */

// =============================================================================
// TIME
// =============================================================================

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

// =============================================================================
// THREADS
// =============================================================================

/// First token handed out by the identity generator
/// Zero is never issued so it can't be confused with an unset value
pub const FIRST_THREAD_TOKEN: u64 = 1;

/// Name prefix for threads started by the spawner
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "native-sync";

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// Backend override (`auto`, `parking_lot`, `std`)
pub const ENV_BACKEND: &str = "NATIVE_SYNC_BACKEND";

/// Stack size override for spawned threads, in bytes
pub const ENV_STACK_SIZE: &str = "NATIVE_SYNC_STACK_SIZE";

/// Enable JSON trace output (`1` or `true`)
pub const ENV_TRACE_JSON: &str = "NATIVE_SYNC_TRACE_JSON";
