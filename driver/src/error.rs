//! Error types for the host driver.

use thiserror::Error;

/// Failures reported by the USB transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Device disconnected")]
    Disconnected,
    #[error("Transfer timed out")]
    Timeout,
    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("USB error: {0}")]
    Usb(String),
}

/// Errors that can occur while driving an acquisition
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Acquisition already running")]
    Busy,
}

/// Result type alias using DriverError
pub type Result<T> = std::result::Result<T, DriverError>;
