//! Error taxonomy for the tracking core.
//!
//! Library seams return [`SunError`]; the binary, configuration loading and the
//! runtime driver wrap it in `anyhow` with context.

use thiserror::Error;

/// Result type for tracking operations.
pub type SunResult<T> = Result<T, SunError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SunError {
    /// Observer location missing or invalid. Nothing is scheduled until fixed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The position provider could not produce a value for the given inputs.
    /// Contained to the firing that hit it.
    #[error("solar computation failed: {0}")]
    ProviderComputation(String),

    /// A scheduling invariant was broken. Always a logic defect.
    #[error("scheduling invariant violated: {0}")]
    SchedulingInvariant(String),
}

impl SunError {
    /// Whether the error is contained to one firing and the scheduler keeps running.
    pub fn is_contained(&self) -> bool {
        matches!(self, Self::ProviderComputation(_))
    }
}
