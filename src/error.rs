//! Error type for the padslicer umbrella crate.
//!
//! Wraps the subsystem errors so `?` works across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] padslicer_core::Error),

    #[error("Sampler: {0}")]
    Sampler(#[from] padslicer_sampler::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
