//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Slice index out of range.
    #[error("Slice index {index} out of range ({len} slices)")]
    InvalidIndex { index: usize, len: usize },

    /// The only remaining slice cannot be deleted.
    #[error("Cannot delete the last remaining slice")]
    LastSlice,

    /// The edit would not change anything.
    #[error("Edit has no effect")]
    Unchanged,

    /// No audio is loaded.
    #[error("No audio loaded")]
    NoAudio,

    /// A load is already in progress.
    #[error("A file is already loading")]
    Busy,

    /// The decoder rejected the file.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No decoder handles this file.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A saved state blob failed validation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Engine configuration rejected.
    #[error(transparent)]
    Config(#[from] padslicer_core::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hound error.
    #[cfg(feature = "wav")]
    #[error("Hound error: {0}")]
    Hound(#[from] hound::Error),

    /// State (de)serialization error.
    #[error("State encoding error: {0}")]
    State(#[from] bincode::Error),

    /// The loader thread panicked.
    #[error("Loader thread panicked")]
    LoaderPanicked,
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
