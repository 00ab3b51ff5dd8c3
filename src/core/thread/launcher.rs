/*!
 * Thread Launchers
 * The seam between the spawner and the OS thread API
 */

use std::io;
use std::thread::{self, JoinHandle};

/// Starts a native thread running `body`
///
/// On failure `body` must be dropped without running, so nothing it
/// captured outlives the call.
pub trait ThreadLauncher: Send + Sync {
    fn launch(
        &self,
        name: String,
        stack_size: Option<usize>,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> io::Result<JoinHandle<()>>;
}

/// Launcher backed by `std::thread::Builder`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher;

impl ThreadLauncher for OsLauncher {
    fn launch(
        &self,
        name: String,
        stack_size: Option<usize>,
        body: Box<dyn FnOnce() + Send + 'static>,
    ) -> io::Result<JoinHandle<()>> {
        let mut builder = thread::Builder::new().name(name);
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }
        builder.spawn(body)
    }
}
