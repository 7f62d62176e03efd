//! Error types for padslicer-core.

use thiserror::Error;

/// Error type for padslicer-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
