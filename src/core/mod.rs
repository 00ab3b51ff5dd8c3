/*!
 * Core Module
 * Identity, time, native handles, synchronization and threads
 */

pub mod errors;
pub mod handle;
pub mod id;
pub mod limits;
pub mod sync;
pub mod thread;
pub mod time;

// Re-export for convenience
pub use errors::*;
