//! # Core Error Types
//!
//! Construction-time failures. Everything after construction is infallible
//! by design: capacity exhaustion and missing targets are silent
//! degradations, not errors.

use thiserror::Error;

/// Errors that can occur while building the stage runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tier thresholds are not strictly increasing.
    #[error("tier thresholds must increase: off {off}, low {low}, medium {medium}")]
    TierThresholdOrder {
        /// Width below which the field is disabled.
        off: f32,
        /// Width below which the low tier applies.
        low: f32,
        /// Width below which the medium tier applies.
        medium: f32,
    },

    /// A pool capacity of zero was configured for an enabled tier.
    #[error("pool capacity for tier {tier} must be greater than zero")]
    ZeroCapacity {
        /// Name of the offending tier.
        tier: &'static str,
    },
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
