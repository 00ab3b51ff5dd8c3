/*!
 * Thread Spawner
 *
 * # Trampoline
 *
 * The spawner never hands the caller's entry straight to the OS. It wraps
 * it in a closure that, running on the new thread:
 * 1. registers the thread token allocated by the parent
 * 2. runs the optional bootstrap hook
 * 3. enters a tracing span named after the thread
 * 4. runs the caller's entry
 *
 * The token is allocated before launch so the returned handle and the
 * thread agree on identity without any handshake.
 */

use super::launcher::{OsLauncher, ThreadLauncher};
use crate::core::errors::{SyncError, SyncResult};
use crate::core::handle::NativeHandle;
use crate::core::id::{self, ThreadToken};
use crate::core::sync::SyncConfig;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use tracing::{debug, debug_span, instrument, warn};

/// Caller code run on the new thread
pub type EntryContext = Box<dyn FnOnce() + Send + 'static>;

type Bootstrap = Arc<dyn Fn(ThreadToken) + Send + Sync>;

/// A started thread
///
/// Compares by token: two handles are equal exactly when they name the same
/// thread. Dropping the handle detaches the thread.
pub struct ThreadHandle {
    token: ThreadToken,
    name: String,
    native: NativeHandle<JoinHandle<()>>,
}

impl ThreadHandle {
    /// Identity registered on the thread
    #[inline]
    pub fn token(&self) -> ThreadToken {
        self.token
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this handle names the calling thread
    pub fn is_current(&self) -> bool {
        id::try_current() == Some(self.token)
    }

    /// Hand the native thread to the caller (e.g. to join it)
    pub fn into_native(self) -> JoinHandle<()> {
        self.native.into_inner()
    }

    /// Release the handle, detaching the thread
    pub fn release(self) -> SyncResult<()> {
        self.native
            .release()
            .map_err(|e| SyncError::DestroyFailed(e.to_string()))
    }
}

impl PartialEq for ThreadHandle {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl Eq for ThreadHandle {}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("token", &self.token)
            .field("name", &self.name)
            .finish()
    }
}

/// Spawns threads through the identity trampoline
pub struct ThreadSpawner {
    name_prefix: String,
    stack_size: Option<usize>,
    launcher: Arc<dyn ThreadLauncher>,
    bootstrap: Option<Bootstrap>,
    spawned: AtomicU64,
}

impl ThreadSpawner {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            name_prefix: config.thread_name_prefix.clone(),
            stack_size: config.stack_size,
            launcher: Arc::new(OsLauncher),
            bootstrap: None,
            spawned: AtomicU64::new(0),
        }
    }

    /// Replace the OS launcher
    pub fn with_launcher<L: ThreadLauncher + 'static>(mut self, launcher: L) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    /// Run `hook` on each new thread after identity registration and
    /// before the entry
    pub fn with_bootstrap<F>(mut self, hook: F) -> Self
    where
        F: Fn(ThreadToken) + Send + Sync + 'static,
    {
        self.bootstrap = Some(Arc::new(hook));
        self
    }

    /// Start a thread running `entry`
    ///
    /// On failure nothing stays allocated and `entry` is dropped unrun.
    #[instrument(level = "trace", skip(self, entry), fields(prefix = %self.name_prefix))]
    pub fn try_spawn(&self, entry: EntryContext) -> SyncResult<ThreadHandle> {
        let token = id::next_token();
        let seq = self.spawned.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", self.name_prefix, seq);

        let body = trampoline(token, name.clone(), self.bootstrap.clone(), entry);
        let join = self
            .launcher
            .launch(name.clone(), self.stack_size, body)
            .map_err(|e| {
                warn!(thread = %token, thread_name = %name, error = %e, "Native thread creation failed");
                SyncError::SpawnFailed(e.to_string())
            })?;

        debug!(thread = %token, thread_name = %name, "Thread spawned");
        Ok(ThreadHandle {
            token,
            name,
            native: NativeHandle::new(join),
        })
    }

    /// Start a thread running `entry`, `None` if the OS refused
    pub fn spawn(&self, entry: EntryContext) -> Option<ThreadHandle> {
        self.try_spawn(entry).ok()
    }

    /// Threads launched so far, including failed attempts
    pub fn attempts(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }
}

impl Default for ThreadSpawner {
    /// Spawner configured by `SyncConfig::from_env`
    fn default() -> Self {
        Self::new(&SyncConfig::from_env())
    }
}

impl fmt::Debug for ThreadSpawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadSpawner")
            .field("name_prefix", &self.name_prefix)
            .field("stack_size", &self.stack_size)
            .field("bootstrap", &self.bootstrap.is_some())
            .finish()
    }
}

fn trampoline(
    token: ThreadToken,
    name: String,
    bootstrap: Option<Bootstrap>,
    entry: EntryContext,
) -> Box<dyn FnOnce() + Send + 'static> {
    Box::new(move || {
        if !id::register(token) {
            warn!(thread = %token, "Thread already had an identity before the trampoline");
        }
        if let Some(hook) = bootstrap {
            hook(token);
        }

        let span = debug_span!("thread", thread = %token, thread_name = %name);
        let _entered = span.enter();
        entry();
    })
}

/// Process-wide spawner behind the free `spawn`
fn shared() -> &'static ThreadSpawner {
    static SHARED: OnceLock<ThreadSpawner> = OnceLock::new();
    SHARED.get_or_init(ThreadSpawner::default)
}

/// Spawn with the process-wide default spawner
pub fn spawn(entry: EntryContext) -> Option<ThreadHandle> {
    shared().spawn(entry)
}
