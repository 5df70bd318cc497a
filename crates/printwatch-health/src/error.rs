//! Probe error types.

use thiserror::Error;

/// Result type alias for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// A probe that could not be carried out at all.
///
/// An unresponsive printer is not an error; it is `Ok(false)`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe mechanism unavailable: {0}")]
    Unavailable(String),

    #[error("probe i/o error: {0}")]
    Io(#[from] std::io::Error),
}
