//! PARBENCH - Parallel Rust Bench
//!
//! Runs three small workloads sequentially and through worker pools,
//! times both paths and reports the speedup, with progress delivered
//! from a background task.

use thiserror::Error;

pub mod bench;
pub mod config;
pub mod models;
pub mod simple;
pub mod util;

// Common error types
#[derive(Debug, Error)]
pub enum ParbenchError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration validation or parsing error
    #[error("Configuration error: {0}")]
    Config(String),
    /// A filter token is not a valid integer
    #[error("Parse error: invalid integer token '{token}' at position {position}")]
    Parse { token: String, position: usize },
    /// A pooled worker failed or panicked
    #[error("Worker error: {0}")]
    Worker(String),
    /// The benchmark run stopped on its first error
    #[error("Run aborted: {0}")]
    RunAborted(String),
    /// The benchmark run was cancelled
    #[error("Benchmark cancelled")]
    Cancelled,
    /// Summary serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ParbenchError {
    fn from(err: serde_json::Error) -> Self {
        ParbenchError::Serialization(format!("JSON serialization error: {}", err))
    }
}

impl From<toml::de::Error> for ParbenchError {
    fn from(err: toml::de::Error) -> Self {
        ParbenchError::Config(format!("TOML parsing error: {}", err))
    }
}

impl From<toml::ser::Error> for ParbenchError {
    fn from(err: toml::ser::Error) -> Self {
        ParbenchError::Config(format!("TOML serialization error: {}", err))
    }
}

/// Result type alias for PARBENCH operations
pub type Result<T> = std::result::Result<T, ParbenchError>;

/// Error handling utilities
pub mod error {
    use super::ParbenchError;

    /// Convert error to user-friendly message with suggestions
    pub fn user_friendly_message(error: &ParbenchError) -> String {
        match error {
            ParbenchError::Config(msg) => {
                format!("Configuration error: {}. Check your settings.", msg)
            }
            ParbenchError::Parse { token, .. } => {
                format!("'{}' is not an integer. Use whitespace-separated integers only.", token)
            }
            ParbenchError::Worker(msg) => {
                format!("A parallel worker failed: {}. No partial results were kept.", msg)
            }
            ParbenchError::Cancelled => "Benchmark was cancelled by user.".to_string(),
            _ => error.to_string(),
        }
    }

    /// Render a caught panic payload as text
    pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
        if let Some(msg) = payload.downcast_ref::<&str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        }
    }
}

// Common types and constants
pub const APP_NAME: &str = "parbench";
pub const CONFIG_FILE: &str = "parbench.toml";
