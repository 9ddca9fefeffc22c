//! Heat / feedback state machine.
//!
//! Shared by both caster kinds. Heat accumulates from casting; above the
//! threshold it maps to a 0..=100 feedback level, and the active effects
//! list is always rebuilt from that level rather than accumulated.
//!
//! Concentration is a separate Idle / Concentrating flag. The caller starts
//! and ends it; a failed save never ends it here.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dice::DieRoller;
use crate::domain::{
    CasterKind, ConcentrationRecord, EffectKind, FeedbackEffect, FeedbackModifiers,
    FeedbackRecord, HeatState, RestKind,
};
use crate::pool::{self, ResourcePool};

/// Attack and concentration penalties start here.
pub const BAND_MINOR: u8 = 25;
/// Adds DC penalty and generation increase.
pub const BAND_MODERATE: u8 = 50;
/// Attack penalty escalates.
pub const BAND_SEVERE: u8 = 75;
/// Adds spell failure and casting time increase.
pub const BAND_CRITICAL: u8 = 90;

/// Feedback level points per hour of recovery.
const RECOVERY_DIVISOR: u8 = 25;
/// Minimum DC for a concentration save.
pub const MIN_CONCENTRATION_DC: i32 = 10;

/// Result of a concentration save. `roll` is the raw die for auditing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveOutcome {
    pub success: bool,
    pub dc: i32,
    pub roll: i32,
    pub total: i32,
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// 0 below `threshold`; otherwise the distance from threshold to maximum
/// as a floored percentage, clamped to `0..=100`.
pub fn feedback_level(current: i32, maximum: i32, threshold: i32) -> u8 {
    if current < threshold {
        return 0;
    }
    let span = i64::from(maximum) - i64::from(threshold);
    if span <= 0 {
        return 100;
    }
    let scaled = (i64::from(current) - i64::from(threshold)) * 100 / span;
    scaled.clamp(0, 100) as u8
}

/// Effects for a feedback level. Higher bands replace or extend lower ones.
pub fn feedback_effects(
    level: u8,
    kind: CasterKind,
    modifiers: &FeedbackModifiers,
) -> Vec<FeedbackEffect> {
    if level < BAND_MINOR {
        return Vec::new();
    }

    let mut raw = Vec::with_capacity(6);
    raw.push((
        EffectKind::AttackPenalty,
        if level >= BAND_SEVERE { -3 } else { -1 },
    ));
    raw.push((EffectKind::ConcentrationPenalty, -2));
    if level >= BAND_MODERATE {
        raw.push((EffectKind::SaveDcPenalty, -1));
        raw.push((EffectKind::GenerationIncrease, 1));
    }
    if level >= BAND_CRITICAL {
        raw.push((EffectKind::SpellFailureChance, 20));
        raw.push((EffectKind::CastingTimeIncrease, 1));
    }

    raw.into_iter()
        .filter_map(|(effect_kind, magnitude)| {
            let magnitude = soften(magnitude, modifiers.resistance);
            (magnitude != 0).then(|| FeedbackEffect {
                kind: effect_kind,
                magnitude,
                description: describe(effect_kind, magnitude, kind),
            })
        })
        .collect()
}

/// Sum of active concentration penalties (zero or negative).
pub fn concentration_penalty(state: &HeatState) -> i32 {
    state
        .feedback
        .effects
        .iter()
        .filter(|e| e.kind == EffectKind::ConcentrationPenalty)
        .map(|e| e.magnitude)
        .sum()
}

/// Sum of active generation-increase effects.
pub fn generation_increase(state: &HeatState) -> i32 {
    state
        .feedback
        .effects
        .iter()
        .filter(|e| e.kind == EffectKind::GenerationIncrease)
        .map(|e| e.magnitude)
        .sum()
}

fn soften(magnitude: i32, resistance: i32) -> i32 {
    let resistance = resistance.max(0);
    if magnitude < 0 {
        (magnitude + resistance).min(0)
    } else {
        (magnitude - resistance).max(0)
    }
}

fn describe(effect: EffectKind, magnitude: i32, kind: CasterKind) -> String {
    let name = kind.resource_name();
    match effect {
        EffectKind::AttackPenalty => format!("{name}: {magnitude} to attack rolls"),
        EffectKind::ConcentrationPenalty => {
            format!("{name}: {magnitude} to concentration saves")
        }
        EffectKind::SaveDcPenalty => format!("{name}: {magnitude} to spell save DC"),
        EffectKind::GenerationIncrease => {
            format!("{name}: +{magnitude} generated per cast")
        }
        EffectKind::SpellFailureChance => {
            format!("{name}: {magnitude}% chance of spell failure")
        }
        EffectKind::CastingTimeIncrease => {
            format!("{name}: casting time +{magnitude} round(s)")
        }
    }
}

/// Recompute level and effects from the current heat.
fn refresh(state: &mut HeatState) {
    let hp = &state.heat_points;
    state.feedback.level = feedback_level(hp.current, hp.effective_maximum(), state.threshold);
    state.feedback.effects =
        feedback_effects(state.feedback.level, state.feedback.source, &state.modifiers);
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Fresh, cold tracker.
pub fn new_heat_state(
    maximum: i32,
    threshold: i32,
    dissipation_rate: i32,
    source: CasterKind,
) -> HeatState {
    HeatState {
        heat_points: ResourcePool::empty(maximum),
        threshold,
        dissipation_rate,
        modifiers: FeedbackModifiers::default(),
        feedback: FeedbackRecord {
            level: 0,
            effects: Vec::new(),
            source,
            recovery_time: 0,
        },
        concentration: ConcentrationRecord::default(),
    }
}

/// Fold `amount` in, clamped at the maximum, and rebuild feedback.
pub fn add_heat(state: &HeatState, amount: i32) -> HeatState {
    let mut next = state.clone();
    next.heat_points = pool::restore(&state.heat_points, amount);
    refresh(&mut next);
    next.feedback.recovery_time = next
        .feedback
        .recovery_time
        .max(u32::from(next.feedback.level / RECOVERY_DIVISOR));
    trace!(
        source = ?next.feedback.source,
        amount,
        heat = next.heat_points.current,
        level = next.feedback.level,
        "heat folded in"
    );
    next
}

/// Replace the external modifiers and rebuild effects.
pub fn with_modifiers(state: &HeatState, modifiers: FeedbackModifiers) -> HeatState {
    let mut next = state.clone();
    next.modifiers = modifiers;
    refresh(&mut next);
    next
}

pub fn apply_rest(state: &HeatState, kind: RestKind) -> HeatState {
    let mut next = state.clone();
    match kind {
        RestKind::Short => {
            next.heat_points = pool::spend(&state.heat_points, state.dissipation_rate);
            refresh(&mut next);
            next.feedback.recovery_time = next.feedback.recovery_time.saturating_sub(1);
        }
        RestKind::Long => {
            next.heat_points = pool::set_current(&state.heat_points, 0);
            next.feedback.level = 0;
            next.feedback.effects.clear();
            next.feedback.recovery_time = 0;
        }
    }
    debug!(
        source = ?next.feedback.source,
        ?kind,
        before = state.heat_points.current,
        after = next.heat_points.current,
        "rest applied to heat"
    );
    next
}

// ---------------------------------------------------------------------------
// Concentration
// ---------------------------------------------------------------------------

pub fn start_concentration(state: &HeatState, effect: &str) -> HeatState {
    let mut next = state.clone();
    next.concentration = ConcentrationRecord {
        active: true,
        effect: Some(effect.to_string()),
        saves_this_turn: 0,
    };
    next
}

pub fn end_concentration(state: &HeatState) -> HeatState {
    let mut next = state.clone();
    next.concentration.active = false;
    next.concentration.effect = None;
    next
}

pub fn reset_turn_saves(state: &HeatState) -> HeatState {
    let mut next = state.clone();
    next.concentration.saves_this_turn = 0;
    next
}

/// Roll to keep concentration after taking damage.
///
/// Not concentrating: trivially succeeds with DC 0 and roll 0, and the
/// state comes back unchanged. Otherwise `DC = max(10, damage / 2)` and the
/// total is `d20 + ability_modifier + proficiency_bonus + penalties`. The
/// per-turn counter increments on every real save.
pub fn concentration_save(
    state: &HeatState,
    damage_taken: i32,
    ability_modifier: i32,
    proficiency_bonus: i32,
    roller: &mut dyn DieRoller,
) -> (HeatState, SaveOutcome) {
    if !state.concentration.active {
        let outcome = SaveOutcome {
            success: true,
            dc: 0,
            roll: 0,
            total: 0,
        };
        return (state.clone(), outcome);
    }

    let dc = MIN_CONCENTRATION_DC.max(damage_taken.max(0) / 2);
    let roll = roller.roll_d20();
    let total = roll
        .saturating_add(ability_modifier)
        .saturating_add(proficiency_bonus)
        .saturating_add(concentration_penalty(state));
    let success = total >= dc;

    let mut next = state.clone();
    next.concentration.saves_this_turn = next.concentration.saves_this_turn.saturating_add(1);

    debug!(
        effect = ?state.concentration.effect,
        dc,
        roll,
        total,
        success,
        "concentration save"
    );
    (next, SaveOutcome { success, dc, roll, total })
}
