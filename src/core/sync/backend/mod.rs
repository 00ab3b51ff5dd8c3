/*!
 * Native Backends
 *
 * # Design: Enum Dispatch for Built-in Backends
 *
 * The two built-in backends are dispatched through an enum; only injected
 * backends go through a vtable.
 */

mod parking;
mod std_sync;

pub use parking::ParkingLotBackend;
pub use std_sync::StdBackend;

use super::config::{BackendType, SyncConfig};
use super::traits::{NativeBackend, NativePair, NativeResult};
use crate::core::errors::{SyncError, SyncResult};
use crate::core::handle::NativeHandle;
use std::fmt;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Backend used to allocate native pairs
#[derive(Clone)]
pub enum Backend {
    ParkingLot(ParkingLotBackend),
    Std(StdBackend),
    /// Caller-supplied backend
    Custom(Arc<dyn NativeBackend>),
}

impl Backend {
    /// Backend selected by the configuration
    pub fn from_config(config: &SyncConfig) -> Self {
        match config.select_backend() {
            BackendType::ParkingLot => Backend::ParkingLot(ParkingLotBackend),
            BackendType::Std => Backend::Std(StdBackend),
            BackendType::Auto => {
                // Should have been resolved by select_backend
                #[cfg(unix)]
                {
                    Backend::ParkingLot(ParkingLotBackend)
                }
                #[cfg(not(unix))]
                {
                    Backend::Std(StdBackend)
                }
            }
        }
    }

    /// Wrap a caller-supplied backend
    pub fn custom<B: NativeBackend + 'static>(backend: B) -> Self {
        Backend::Custom(Arc::new(backend))
    }

    #[inline]
    pub fn create_pair(&self) -> NativeResult<Box<dyn NativePair>> {
        match self {
            Self::ParkingLot(b) => b.create_pair(),
            Self::Std(b) => b.create_pair(),
            Self::Custom(b) => b.create_pair(),
        }
    }

    /// Allocate a pair and take ownership of it
    ///
    /// The pair is probed once (lock + release) before it is handed out. A
    /// pair that fails the probe is torn down so nothing half-built escapes.
    #[instrument(level = "trace", skip(self), fields(backend = self.name()))]
    pub(crate) fn allocate(&self) -> SyncResult<NativeHandle<Box<dyn NativePair>>> {
        let pair = self.create_pair().map_err(|e| {
            warn!(backend = self.name(), error = %e, "Native pair allocation failed");
            SyncError::InitializationFailure(e.to_string())
        })?;

        let handle = NativeHandle::new(pair);
        let probe = handle.get().lock().map(drop);
        if let Err(e) = probe {
            warn!(backend = self.name(), error = %e, "Native pair failed probe, tearing down");
            if let Err(release) = handle.release() {
                warn!(backend = self.name(), error = %release, "Teardown after failed probe also failed");
            }
            return Err(SyncError::InitializationFailure(e.to_string()));
        }

        Ok(handle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ParkingLot(b) => b.name(),
            Self::Std(b) => b.name(),
            Self::Custom(b) => b.name(),
        }
    }
}

impl Default for Backend {
    /// Backend chosen by `SyncConfig::from_env`
    fn default() -> Self {
        Self::from_config(&SyncConfig::from_env())
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&self.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_config() {
        let config = SyncConfig {
            backend: BackendType::Std,
            ..Default::default()
        };
        assert_eq!(Backend::from_config(&config).name(), "std");

        let config = SyncConfig {
            backend: BackendType::ParkingLot,
            ..Default::default()
        };
        assert_eq!(Backend::from_config(&config).name(), "parking_lot");
    }

    #[test]
    fn test_auto_selection() {
        let name = Backend::from_config(&SyncConfig::default()).name();
        #[cfg(unix)]
        assert_eq!(name, "parking_lot");

        #[cfg(not(unix))]
        assert_eq!(name, "std");
    }

    #[test]
    fn test_allocate_probes_pair() {
        let handle = Backend::default().allocate().unwrap();
        assert!(handle.get().lock().is_ok());
        assert!(handle.release().is_ok());
    }

    #[test]
    fn test_custom_backend() {
        let backend = Backend::custom(StdBackend);
        assert_eq!(backend.name(), "std");
        assert!(backend.create_pair().is_ok());
    }
}
