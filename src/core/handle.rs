/*!
 * Native Handles
 *
 * Exclusively owned native resources with guaranteed release. A handle is
 * created when a primitive allocates its native objects and consumed when
 * the primitive is destroyed; if the owner never destroys it explicitly,
 * drop releases it.
 */

use crate::core::sync::{NativePair, NativeResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

/// Kind of native resource behind a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Mutex + condition pair
    Condition,
    /// OS thread
    Thread,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Condition => write!(f, "condition"),
            ResourceKind::Thread => write!(f, "thread"),
        }
    }
}

/// A native resource that knows how to release itself
pub trait NativeResource {
    const KIND: ResourceKind;

    /// Release the underlying OS resource
    fn release(self) -> NativeResult<()>;
}

impl NativeResource for Box<dyn NativePair> {
    const KIND: ResourceKind = ResourceKind::Condition;

    fn release(self) -> NativeResult<()> {
        self.destroy()
    }
}

impl NativeResource for JoinHandle<()> {
    const KIND: ResourceKind = ResourceKind::Thread;

    /// Dropping a join handle detaches the thread
    fn release(self) -> NativeResult<()> {
        drop(self);
        Ok(())
    }
}

static HANDLE_IDS: AtomicU64 = AtomicU64::new(1);

/// Owning wrapper around a native resource
///
/// # Example
///
/// ```ignore
/// let handle = NativeHandle::new(pair);
/// handle.get().broadcast()?;
/// handle.release()?; // or released on drop
/// ```
pub struct NativeHandle<R: NativeResource> {
    id: u64,
    resource: Option<R>,
}

impl<R: NativeResource> NativeHandle<R> {
    /// Take ownership of a freshly allocated resource
    pub fn new(resource: R) -> Self {
        let id = HANDLE_IDS.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(id, kind = %R::KIND, "native handle created");
        Self {
            id,
            resource: Some(resource),
        }
    }

    /// Handle id (for diagnostics)
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        R::KIND
    }

    /// Borrow the resource
    #[inline]
    pub fn get(&self) -> &R {
        match self.resource.as_ref() {
            Some(resource) => resource,
            // Only consuming methods and drop take the resource
            None => unreachable!("native handle {} accessed after release", self.id),
        }
    }

    /// Release the resource now, reporting native failure
    pub fn release(mut self) -> NativeResult<()> {
        match self.resource.take() {
            Some(resource) => {
                tracing::trace!(id = self.id, kind = %R::KIND, "native handle released");
                resource.release()
            }
            None => Ok(()),
        }
    }

    /// Give up ownership without releasing
    pub fn into_inner(mut self) -> R {
        match self.resource.take() {
            Some(resource) => resource,
            None => unreachable!("native handle {} accessed after release", self.id),
        }
    }
}

impl<R: NativeResource> Drop for NativeHandle<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            if let Err(e) = resource.release() {
                log::error!("Native {} handle {} release failed on drop: {}", R::KIND, self.id, e);
            }
        }
    }
}

impl<R: NativeResource> fmt::Debug for NativeHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("id", &self.id)
            .field("kind", &R::KIND)
            .field("live", &self.resource.is_some())
            .finish()
    }
}
