/*!
 * Synchronization Configuration
 *
 * Runtime configuration for backend selection and thread spawning
 */

use crate::core::limits::{DEFAULT_THREAD_NAME_PREFIX, ENV_BACKEND, ENV_STACK_SIZE};
use std::str::FromStr;

/// Backend type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// parking_lot (absolute deadlines)
    ParkingLot,
    /// std::sync (relative timeouts)
    Std,
    /// Auto-select based on platform
    Auto,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parking_lot" | "parking-lot" | "parkinglot" => Ok(BackendType::ParkingLot),
            "std" => Ok(BackendType::Std),
            "auto" | "" => Ok(BackendType::Auto),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Preferred backend
    pub backend: BackendType,
    /// Name prefix for spawned threads
    pub thread_name_prefix: String,
    /// Stack size for spawned threads (platform default if unset)
    pub stack_size: Option<usize>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::Auto,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}

impl SyncConfig {
    /// Configuration pinned to the std backend
    pub fn portable() -> Self {
        Self {
            backend: BackendType::Std,
            ..Self::default()
        }
    }

    /// Defaults overridden by environment variables
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BACKEND) {
            match value.parse() {
                Ok(backend) => config.backend = backend,
                Err(e) => tracing::warn!(var = ENV_BACKEND, error = %e, "Ignoring backend override"),
            }
        }

        if let Some(value) = lookup(ENV_STACK_SIZE) {
            match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => config.stack_size = Some(size),
                _ => tracing::warn!(var = ENV_STACK_SIZE, value = %value, "Ignoring stack size override"),
            }
        }

        config
    }

    /// Select backend for current platform
    pub fn select_backend(&self) -> BackendType {
        match self.backend {
            BackendType::Auto => {
                #[cfg(unix)]
                {
                    BackendType::ParkingLot
                }
                #[cfg(not(unix))]
                {
                    BackendType::Std
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_backend() {
        assert_eq!("std".parse::<BackendType>(), Ok(BackendType::Std));
        assert_eq!("Parking_Lot".parse::<BackendType>(), Ok(BackendType::ParkingLot));
        assert_eq!("".parse::<BackendType>(), Ok(BackendType::Auto));
        assert!("futex".parse::<BackendType>().is_err());
    }

    #[test]
    fn test_auto_resolves() {
        let config = SyncConfig::default();
        assert_ne!(config.select_backend(), BackendType::Auto);
        assert_eq!(SyncConfig::portable().select_backend(), BackendType::Std);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [(ENV_BACKEND, "std"), (ENV_STACK_SIZE, "not-a-number")].into();
        let config = SyncConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend, BackendType::Std);
        assert_eq!(config.stack_size, None);

        let config = SyncConfig::from_lookup(|key| (key == ENV_STACK_SIZE).then(|| "65536".to_string()));
        assert_eq!(config.backend, BackendType::Auto);
        assert_eq!(config.stack_size, Some(65536));
    }

    #[test]
    fn test_unknown_backend_ignored() {
        let config = SyncConfig::from_lookup(|key| (key == ENV_BACKEND).then(|| "futex".to_string()));
        assert_eq!(config.backend, BackendType::Auto);
    }
}
