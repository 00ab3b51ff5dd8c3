/*!
 * Thread Spawning
 *
 * Native thread creation behind a single `spawn` call. Every thread starts
 * in a trampoline that registers its identity inside the new thread before
 * any caller code runs.
 */

mod launcher;
mod spawner;

pub use launcher::{OsLauncher, ThreadLauncher};
pub use spawner::{spawn, EntryContext, ThreadHandle, ThreadSpawner};
