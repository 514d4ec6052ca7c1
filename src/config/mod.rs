//! Configuration management module
//!
//! Handles loading, saving, and validation of the canonical benchmark
//! inputs and worker pool sizing.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::{ParbenchError, Result, APP_NAME, CONFIG_FILE};

/// Default number of emails generated when used standalone
pub const DEFAULT_EMAIL_COUNT: usize = 1000;

/// Harness configuration containing the canonical workload inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Smallest circle radius (inclusive)
    pub radius_min: u32,
    /// Largest circle radius (inclusive)
    pub radius_max: u32,
    /// Number of emails generated per path
    pub email_count: usize,
    /// Number of integer tokens in the filter input string
    pub filter_token_count: usize,
    /// Filter tokens are drawn from [-bound, bound]
    pub filter_value_bound: i64,
    /// Worker count for the pools; `None` uses the host's available parallelism
    pub worker_threads: Option<usize>,
    /// Seed for email and filter input generation; `None` draws from entropy
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            radius_min: 10,
            radius_max: 100,
            email_count: DEFAULT_EMAIL_COUNT,
            filter_token_count: 100_000,
            filter_value_bound: 500,
            worker_threads: None,
            seed: None,
        }
    }
}

impl HarnessConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Small inputs for quick runs and tests
    pub fn quick() -> Self {
        Self {
            email_count: 100,
            filter_token_count: 1_000,
            ..Self::default()
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        const MAX_ITEMS: usize = 10_000_000;

        if self.radius_min > self.radius_max {
            return Err(ParbenchError::Config(format!(
                "Radius range is empty: {}..={}",
                self.radius_min, self.radius_max
            )));
        }

        let radius_count = (self.radius_max - self.radius_min) as usize + 1;
        if radius_count > MAX_ITEMS {
            return Err(ParbenchError::Config(format!(
                "Radius range must cover at most {} values",
                MAX_ITEMS
            )));
        }
        if self.email_count == 0 || self.email_count > MAX_ITEMS {
            return Err(ParbenchError::Config(format!(
                "Email count must be between 1 and {}",
                MAX_ITEMS
            )));
        }

        if self.filter_token_count == 0 || self.filter_token_count > MAX_ITEMS {
            return Err(ParbenchError::Config(format!(
                "Filter token count must be between 1 and {}",
                MAX_ITEMS
            )));
        }

        if self.filter_value_bound < 0 {
            return Err(ParbenchError::Config(
                "Filter value bound must not be negative".to_string(),
            ));
        }

        const MAX_THREADS: usize = 256;
        if let Some(threads) = self.worker_threads {
            if threads == 0 || threads > MAX_THREADS {
                return Err(ParbenchError::Config(format!(
                    "Worker threads must be between 1 and {}",
                    MAX_THREADS
                )));
            }
        }

        Ok(())
    }

    /// Set the inclusive radius range
    pub fn with_radius_range(mut self, min: u32, max: u32) -> Self {
        self.radius_min = min;
        self.radius_max = max;
        self
    }

    /// Set the number of generated emails
    pub fn with_email_count(mut self, count: usize) -> Self {
        self.email_count = count;
        self
    }

    /// Set the filter input size
    pub fn with_filter_token_count(mut self, count: usize) -> Self {
        self.filter_token_count = count;
        self
    }

    /// Set the filter value bound
    pub fn with_filter_value_bound(mut self, bound: i64) -> Self {
        self.filter_value_bound = bound;
        self
    }

    /// Pin the worker count
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Make random inputs reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            ParbenchError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ParbenchError::Config(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ParbenchError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| {
            ParbenchError::Config(format!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/parbench/parbench.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ParbenchError::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
