//! Engine-wide settings.
//!
//! An [`EngineConfig`] is built once by the application and handed to every trainer and to
//! [`EngineConcurrency`][crate::concurrency::EngineConcurrency] at construction.

#[cfg(feature = "json")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error_calc::ErrorMode;

/// Settings shared by trainers and the concurrency substrate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// The number of worker threads. `0` uses one per processor, `1` runs every task on the
    /// calling thread.
    pub thread_count: usize,
    /// How trainers report their error.
    pub error_mode: ErrorMode,
    /// Whether propagation training adds the flat spot constant to sigmoid derivatives.
    pub fix_flat_spot: bool,
    /// How long shutting down the thread pool waits for running tasks.
    pub shutdown_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thread_count: 0,
            error_mode: ErrorMode::Mse,
            fix_flat_spot: true,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Returns a configuration that runs everything on the calling thread.
    pub fn single_threaded() -> Self {
        Self {
            thread_count: 1,
            ..Self::default()
        }
    }

    /// Returns the shutdown timeout as a [`Duration`].
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Returns the number of worker threads to start, resolving `0` to the processor count.
    pub fn resolved_thread_count(&self) -> usize {
        match self.thread_count {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    /// Parses a configuration from JSON. Missing fields take their default values.
    #[cfg(feature = "json")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Reads a configuration from a JSON file.
    #[cfg(feature = "json")]
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

/// An error while loading an [`EngineConfig`].
#[cfg(feature = "json")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not a valid configuration.
    #[error("de/serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
