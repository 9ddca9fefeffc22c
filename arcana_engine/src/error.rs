//! Domain-expected failures.
//!
//! Nothing here is raised as a panic. Cast rules report a single
//! `CastError` (the first rule violated); structural validation reports
//! every `ValidationError` it finds.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejected cast. Variants are listed in validation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("{castable} cannot be overclocked")]
    CannotOverclock { castable: String },

    #[error("no overclock uses remaining")]
    NoOverclockUses,

    #[error("{castable} cannot be overchanneled")]
    CannotOverchannel { castable: String },

    #[error("no overchannel uses remaining")]
    NoOverchannelUses,

    #[error("spell level {level} exceeds tier {tier}")]
    LevelExceedsTier { level: u32, tier: u32 },

    #[error("insufficient {resource}: need {cost}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        cost: i32,
        available: i32,
    },

    #[error("would exceed maximum heat ({total}/{maximum})")]
    ExceedsMaximumHeat { total: i32, maximum: i32 },

    #[error("would exceed maximum faith feedback ({total}/{maximum})")]
    ExceedsMaximumFaithFeedback { total: i32, maximum: i32 },
}

impl CastError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            CastError::CannotOverclock { .. } => "cannot_overclock",
            CastError::NoOverclockUses => "no_overclock_uses",
            CastError::CannotOverchannel { .. } => "cannot_overchannel",
            CastError::NoOverchannelUses => "no_overchannel_uses",
            CastError::LevelExceedsTier { .. } => "level_exceeds_tier",
            CastError::InsufficientResource { .. } => "insufficient_resource",
            CastError::ExceedsMaximumHeat { .. } => "exceeds_maximum_heat",
            CastError::ExceedsMaximumFaithFeedback { .. } => "exceeds_maximum_faith_feedback",
        }
    }
}

/// Serializable `{code, message}` pair surfaced verbatim to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorRecord {
    pub code: String,
    pub message: String,
}

impl From<&CastError> for ErrorRecord {
    fn from(err: &CastError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&ValidationError> for ErrorRecord {
    fn from(err: &ValidationError) -> Self {
        Self {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Structural validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    NegativePoolValue,
    NegativeEffectiveMaximum,
    PoolOverEffectiveMaximum,
    InvalidCasterLevel,
    InvalidEquilibriumTier,
    UsesOverMaximum,
    InvalidOverclockMultiplier,
    HeatOverMaximum,
    InvalidThreshold,
    NegativeDissipation,
    InvalidFeedbackLevel,
    FeedbackSourceMismatch,
    InvalidHarmony,
    StrayConcentrationEffect,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::NegativePoolValue => "negative_pool_value",
            ValidationCode::NegativeEffectiveMaximum => "negative_effective_maximum",
            ValidationCode::PoolOverEffectiveMaximum => "pool_over_effective_maximum",
            ValidationCode::InvalidCasterLevel => "invalid_caster_level",
            ValidationCode::InvalidEquilibriumTier => "invalid_equilibrium_tier",
            ValidationCode::UsesOverMaximum => "uses_over_maximum",
            ValidationCode::InvalidOverclockMultiplier => "invalid_overclock_multiplier",
            ValidationCode::HeatOverMaximum => "heat_over_maximum",
            ValidationCode::InvalidThreshold => "invalid_threshold",
            ValidationCode::NegativeDissipation => "negative_dissipation",
            ValidationCode::InvalidFeedbackLevel => "invalid_feedback_level",
            ValidationCode::FeedbackSourceMismatch => "feedback_source_mismatch",
            ValidationCode::InvalidHarmony => "invalid_harmony",
            ValidationCode::StrayConcentrationEffect => "stray_concentration_effect",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural problem found in a state record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{code}] {message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
