//! Core domain types.
//!
//! Pure data. No behaviour, no casting logic: the engines in
//! `overclock`, `harmonic` and `heat` transform these records by value.

use serde::{Deserialize, Serialize};

use crate::error::{CastError, ErrorRecord};
use crate::pool::ResourcePool;
use crate::utils::SpellComponents;

// ── Identifiers ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

/// Which engine produced a heat/feedback tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterKind {
    /// Overclocking caster; its side-effect resource is heat.
    Arcanist,
    /// Harmonic caster; its side-effect resource is faith feedback.
    Templar,
}

impl CasterKind {
    /// Display name of the side-effect resource.
    pub fn resource_name(self) -> &'static str {
        match self {
            CasterKind::Arcanist => "Heat",
            CasterKind::Templar => "Faith feedback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    Short,
    Long,
}

// ── Castables ──────────────────────────────────────────────────────

/// A formula (Arcanist) or miracle (Templar) from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Castable {
    pub name: String,
    /// Native spell level; casting above it scales cost and generation.
    pub level: u32,
    pub base_cost: i32,
    pub cost_scaling: i32,
    /// Heat (Arcanist) or faith feedback (Templar) per cast.
    pub base_generation: i32,
    pub generation_scaling: i32,
    /// Whether the overclock / overchannel modifier is allowed.
    pub can_overdrive: bool,
    #[serde(default)]
    pub enhancement: String,
    #[serde(default)]
    pub components: Option<SpellComponents>,
}

// ── Heat / feedback tracker ────────────────────────────────────────

/// Small per-rest counter (overclock / overchannel uses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UseCounter {
    pub current: u32,
    pub maximum: u32,
}

impl UseCounter {
    pub fn full(maximum: u32) -> Self {
        Self {
            current: maximum,
            maximum,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    AttackPenalty,
    ConcentrationPenalty,
    SaveDcPenalty,
    GenerationIncrease,
    /// Magnitude is a percentage.
    SpellFailureChance,
    /// Magnitude is in rounds.
    CastingTimeIncrease,
}

/// One derived penalty produced by the current feedback level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackEffect {
    pub kind: EffectKind,
    /// Signed: penalties are negative, increases positive.
    pub magnitude: i32,
    pub description: String,
}

/// Externally supplied modifiers (equipment, mods) that soften effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackModifiers {
    /// Subtracted from the magnitude of every effect.
    pub resistance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackRecord {
    /// 0 to 100.
    pub level: u8,
    pub effects: Vec<FeedbackEffect>,
    pub source: CasterKind,
    pub recovery_time: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConcentrationRecord {
    pub active: bool,
    pub effect: Option<String>,
    pub saves_this_turn: u32,
}

/// Caster-agnostic heat / faith feedback state machine data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatState {
    pub heat_points: ResourcePool,
    /// Feedback level is 0 below this value.
    pub threshold: i32,
    pub dissipation_rate: i32,
    #[serde(default)]
    pub modifiers: FeedbackModifiers,
    pub feedback: FeedbackRecord,
    #[serde(default)]
    pub concentration: ConcentrationRecord,
}

// ── Caster states ──────────────────────────────────────────────────

/// Overclocking caster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArcanistState {
    pub level: u32,
    pub primary_ability: Ability,
    /// Arcane flux points.
    pub afp: ResourcePool,
    /// Highest castable spell level.
    pub equilibrium_tier: u32,
    pub overclock_uses: UseCounter,
    pub overclock_multiplier: f64,
    pub heat: HeatState,
}

/// Harmonic caster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplarState {
    pub level: u32,
    pub primary_ability: Ability,
    pub charges: ResourcePool,
    pub overchannel_uses: UseCounter,
    pub faith_feedback: HeatState,
    pub resonance_harmony: i32,
}

/// Either caster, as stored on a character record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterRecord {
    Arcanist(ArcanistState),
    Templar(TemplarState),
}

impl CasterRecord {
    pub fn kind(&self) -> CasterKind {
        match self {
            CasterRecord::Arcanist(_) => CasterKind::Arcanist,
            CasterRecord::Templar(_) => CasterKind::Templar,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            CasterRecord::Arcanist(s) => s.level,
            CasterRecord::Templar(s) => s.level,
        }
    }

    /// The spendable pool (AFP or charges).
    pub fn resource(&self) -> &ResourcePool {
        match self {
            CasterRecord::Arcanist(s) => &s.afp,
            CasterRecord::Templar(s) => &s.charges,
        }
    }

    /// The side-effect tracker (heat or faith feedback).
    pub fn heat(&self) -> &HeatState {
        match self {
            CasterRecord::Arcanist(s) => &s.heat,
            CasterRecord::Templar(s) => &s.faith_feedback,
        }
    }
}

// ── Cast outcomes ──────────────────────────────────────────────────

/// Successful Arcanist cast.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcanistCast {
    pub state: ArcanistState,
    pub cost: i32,
    pub heat: i32,
    pub overclocked: bool,
}

/// Successful Templar cast.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplarCast {
    pub state: TemplarState,
    pub cost: i32,
    pub feedback: i32,
    pub overchanneled: bool,
    /// Present whenever a recent-cast history was supplied.
    pub harmony_bonus: Option<i32>,
}

/// Flattened cast outcome handed to the view-model layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CastReport {
    pub success: bool,
    pub cost: i32,
    /// Heat (Arcanist) or faith feedback (Templar) applied.
    pub generated: i32,
    /// Overclocked (Arcanist) or overchanneled (Templar).
    pub overclocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harmony_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_state: Option<CasterRecord>,
    #[serde(default)]
    pub errors: Vec<ErrorRecord>,
}

impl CastReport {
    fn failure(err: &CastError) -> Self {
        Self {
            success: false,
            cost: 0,
            generated: 0,
            overclocked: false,
            harmony_bonus: None,
            updated_state: None,
            errors: vec![ErrorRecord::from(err)],
        }
    }

    pub fn from_arcanist(result: &Result<ArcanistCast, CastError>) -> Self {
        match result {
            Ok(cast) => Self {
                success: true,
                cost: cast.cost,
                generated: cast.heat,
                overclocked: cast.overclocked,
                harmony_bonus: None,
                updated_state: Some(CasterRecord::Arcanist(cast.state.clone())),
                errors: Vec::new(),
            },
            Err(err) => Self::failure(err),
        }
    }

    pub fn from_templar(result: &Result<TemplarCast, CastError>) -> Self {
        match result {
            Ok(cast) => Self {
                success: true,
                cost: cast.cost,
                generated: cast.feedback,
                overclocked: cast.overchanneled,
                harmony_bonus: cast.harmony_bonus,
                updated_state: Some(CasterRecord::Templar(cast.state.clone())),
                errors: Vec::new(),
            },
            Err(err) => Self::failure(err),
        }
    }
}
