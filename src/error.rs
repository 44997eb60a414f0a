//! # Error Types
//!
//! Custom error types for Controller Bridge using `thiserror`.
//!
//! Routing itself never fails: unresolved devices and unsupported actions are
//! reported through boolean results. These errors only surface at the edges
//! of the crate (configuration loading and host device I/O).

use thiserror::Error;

/// Main error type for Controller Bridge
#[derive(Debug, Error)]
pub enum ControllerBridgeError {
    /// Host input device errors
    #[error("Input device error: {0}")]
    Device(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Controller Bridge
pub type Result<T> = std::result::Result<T, ControllerBridgeError>;
