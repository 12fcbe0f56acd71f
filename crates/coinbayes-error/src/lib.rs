//! Error type shared by every coinbayes crate.
//!
//! Every variant is recoverable: the operation that produced it has not
//! mutated any state, so the caller can surface the message and retry.

use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, BayesError>;

/// Errors raised by hypothesis configuration, editing and updating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesError {
    /// Hypothesis count outside the supported range.
    #[error("hypothesis count {count} out of range (expected {min}..={max})")]
    Configuration { count: usize, min: usize, max: usize },

    /// A single field edit was rejected; the field keeps its previous value.
    #[error("invalid {field} for hypothesis {index}: {value} ({reason})")]
    Validation {
        field: &'static str,
        index: usize,
        value: f64,
        reason: String,
    },

    /// Priors cannot be normalized because they sum to zero.
    #[error("cannot normalize priors: they sum to zero")]
    DegenerateState,

    /// Observation outside `1 <= flips <= max`, `heads <= flips`.
    #[error("invalid observation: {heads} heads in {flips} flips (flips must be 1..={max_flips}, heads 0..=flips)")]
    InvalidObservation {
        flips: u32,
        heads: u32,
        max_flips: u32,
    },

    /// Total probability of the observation failed the halt check.
    #[error("observed data is impossible under every hypothesis (total probability {total:e})")]
    ImpossibleData { total: f64 },

    /// Update policy failed validation.
    #[error("invalid update policy: {0}")]
    InvalidPolicy(String),
}

impl BayesError {
    /// Build a [`BayesError::Validation`] from its parts.
    pub fn validation(
        field: &'static str,
        index: usize,
        value: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field,
            index,
            value,
            reason: reason.into(),
        }
    }

    /// Stable snake_case code for structured logs.
    #[must_use]
    pub const fn error_kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Validation { .. } => "validation",
            Self::DegenerateState => "degenerate_state",
            Self::InvalidObservation { .. } => "invalid_observation",
            Self::ImpossibleData { .. } => "impossible_data",
            Self::InvalidPolicy(_) => "invalid_policy",
        }
    }

    /// Whether the caller may retry after surfacing the error.
    ///
    /// No operation in the workspace leaves partial state behind, so this is
    /// always `true`.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        true
    }
}
