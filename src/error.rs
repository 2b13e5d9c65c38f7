//! Error types for the printer driver

use thiserror::Error;

/// Printer error types
///
/// Validation errors (`Value`, `Constant`) are always raised before any byte
/// reaches the wire, so the shadow state stays in sync with the printer.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// Argument out of range or of the wrong shape
    #[error("Invalid value: {0}")]
    Value(String),

    /// Value is not a member of a fixed enumeration
    #[error("Unknown constant: {0}")]
    Constant(String),

    /// The printer did not answer a status request
    #[error("Communication error: {0}")]
    Communication(String),

    /// Serial port open/read/write failure, fatal to the session
    #[error("Transport error: {0}")]
    Transport(String),

    /// Picture could not be loaded or converted
    #[error("Image error: {0}")]
    Image(String),

    /// Statistics file could not be read or written
    #[error("Statistics error: {0}")]
    Stats(String),
}

impl From<serial::Error> for PrinterError {
    fn from(err: serial::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<std::io::Error> for PrinterError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for printer operations
pub type PrinterResult<T> = Result<T, PrinterError>;
