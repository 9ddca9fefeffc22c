//! Harmonic caster engine (Templar).
//!
//! Charges pay for miracles; faith feedback is the side effect.
//! Overchanneling doubles feedback flat instead of using a decaying
//! multiplier. Resonance harmony tracks how thematically consistent recent
//! casting has been and feeds a cast bonus.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Castable, RestKind, TemplarCast, TemplarState};
use crate::error::CastError;
use crate::heat;
use crate::pool;
use crate::utils::scale_for_level;

pub const MAX_RESONANCE_TIER: u32 = 9;
pub const MAX_OVERCHANNEL_USES: u32 = 4;
pub const MAX_HARMONY: i32 = 20;
pub const HARMONY_FAILURE_PENALTY: i32 = 1;
const HARMONY_MATCH_CAP: usize = 3;
const HARMONY_GAIN_CAP: usize = 2;
const HARMONY_PER_BONUS: i32 = 5;
const OVERCHANNEL_FACTOR: i32 = 2;

/// Cast type plus the caller's recent history, for harmony bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct CastHistory<'a> {
    pub cast_type: &'a str,
    pub recent: &'a [String],
}

/// Penalties applied externally to attack rolls and save DCs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FaithPenalties {
    pub attack: i32,
    pub save_dc: i32,
}

// ---------------------------------------------------------------------------
// Step functions
// ---------------------------------------------------------------------------

pub fn resonance_tier(level: u32) -> u32 {
    (level.saturating_add(1) / 2).min(MAX_RESONANCE_TIER)
}

pub fn max_overchannel_uses(level: u32) -> u32 {
    (1 + level / 5).min(MAX_OVERCHANNEL_USES)
}

pub fn max_faith_feedback(level: u32, ability_modifier: i32) -> i32 {
    10 + level as i32 + ability_modifier.max(0)
}

// ---------------------------------------------------------------------------
// Per-cast math
// ---------------------------------------------------------------------------

pub fn charges_for_level(castable: &Castable, effective_level: u32) -> i32 {
    scale_for_level(
        castable.base_cost,
        castable.cost_scaling,
        castable.level,
        effective_level,
    )
}

/// Faith feedback for one cast, never below 1.
///
/// Miracles that declare no generation at all fall back to half their
/// charge cost. Overchanneling doubles the normal value.
pub fn feedback_for_cast(castable: &Castable, effective_level: u32, overchanneled: bool) -> i32 {
    let computed = if castable.base_generation == 0 && castable.generation_scaling == 0 {
        charges_for_level(castable, effective_level) / 2
    } else {
        scale_for_level(
            castable.base_generation,
            castable.generation_scaling,
            castable.level,
            effective_level,
        )
    };
    let normal = computed.max(1);

    if overchanneled {
        normal.saturating_mul(OVERCHANNEL_FACTOR)
    } else {
        normal
    }
}

// ---------------------------------------------------------------------------
// Harmony
// ---------------------------------------------------------------------------

/// `min(3, matches of cast_type in recent) + harmony / 5`.
pub fn harmony_bonus(harmony: i32, cast_type: &str, recent: &[String]) -> i32 {
    let matches = recent.iter().filter(|t| t.as_str() == cast_type).count();
    matches.min(HARMONY_MATCH_CAP) as i32 + harmony.max(0) / HARMONY_PER_BONUS
}

/// Success adds up to 2 for diversity among the other recent types;
/// failure subtracts a fixed penalty. Result stays in `0..=MAX_HARMONY`.
pub fn update_harmony(harmony: i32, cast_type: &str, recent: &[String], succeeded: bool) -> i32 {
    let next = if succeeded {
        let others: BTreeSet<&str> = recent
            .iter()
            .map(String::as_str)
            .filter(|t| *t != cast_type)
            .collect();
        harmony.saturating_add(others.len().min(HARMONY_GAIN_CAP) as i32)
    } else {
        harmony.saturating_sub(HARMONY_FAILURE_PENALTY)
    };
    next.clamp(0, MAX_HARMONY)
}

pub fn apply_harmony_update(
    state: &TemplarState,
    cast_type: &str,
    recent: &[String],
    succeeded: bool,
) -> TemplarState {
    let mut next = state.clone();
    next.resonance_harmony = update_harmony(state.resonance_harmony, cast_type, recent, succeeded);
    next
}

// ---------------------------------------------------------------------------
// Penalties
// ---------------------------------------------------------------------------

/// Bands at 50%, 75% and 100% of the maximum; nothing below 50%.
pub fn faith_feedback_penalties(current: i32, maximum: i32) -> FaithPenalties {
    if maximum <= 0 {
        return FaithPenalties::default();
    }
    let percent = i64::from(current.max(0)) * 100 / i64::from(maximum);
    let penalty = match percent {
        p if p >= 100 => -3,
        p if p >= 75 => -2,
        p if p >= 50 => -1,
        _ => 0,
    };
    FaithPenalties {
        attack: penalty,
        save_dc: penalty,
    }
}

// ---------------------------------------------------------------------------
// Cast
// ---------------------------------------------------------------------------

/// Same ordered validation as the Arcanist cast, with charges and faith
/// feedback. `harmony_bonus` is reported only when `history` is supplied.
pub fn cast(
    state: &TemplarState,
    castable: &Castable,
    effective_level: u32,
    overchanneled: bool,
    history: Option<CastHistory<'_>>,
) -> Result<TemplarCast, CastError> {
    let result = validate_and_apply(state, castable, effective_level, overchanneled, history);
    if let Err(err) = &result {
        debug!(
            castable = %castable.name,
            effective_level,
            overchanneled,
            code = err.code(),
            "templar cast rejected: {err}"
        );
    }
    result
}

fn validate_and_apply(
    state: &TemplarState,
    castable: &Castable,
    effective_level: u32,
    overchanneled: bool,
    history: Option<CastHistory<'_>>,
) -> Result<TemplarCast, CastError> {
    if overchanneled && !castable.can_overdrive {
        return Err(CastError::CannotOverchannel {
            castable: castable.name.clone(),
        });
    }
    if overchanneled && state.overchannel_uses.current == 0 {
        return Err(CastError::NoOverchannelUses);
    }
    let tier = resonance_tier(state.level);
    if effective_level > tier {
        return Err(CastError::LevelExceedsTier {
            level: effective_level,
            tier,
        });
    }

    let cost = charges_for_level(castable, effective_level);
    if !pool::has_at_least(&state.charges, cost) {
        return Err(CastError::InsufficientResource {
            resource: "charges",
            cost,
            available: state.charges.current,
        });
    }

    let feedback = feedback_for_cast(castable, effective_level, overchanneled);
    let tracker = &state.faith_feedback.heat_points;
    let total = tracker.current.saturating_add(feedback);
    let maximum = tracker.effective_maximum();
    if total > maximum {
        return Err(CastError::ExceedsMaximumFaithFeedback { total, maximum });
    }

    let mut next = state.clone();
    next.charges = pool::spend(&state.charges, cost);
    next.faith_feedback = heat::add_heat(&state.faith_feedback, feedback);
    if overchanneled {
        next.overchannel_uses.current -= 1;
    }

    Ok(TemplarCast {
        state: next,
        cost,
        feedback,
        overchanneled,
        harmony_bonus: history
            .map(|h| harmony_bonus(state.resonance_harmony, h.cast_type, h.recent)),
    })
}

// ---------------------------------------------------------------------------
// Restoration
// ---------------------------------------------------------------------------

pub fn restore_overchannel_uses(state: &TemplarState) -> TemplarState {
    let mut next = state.clone();
    next.overchannel_uses.current = next.overchannel_uses.maximum;
    next
}

/// Short rest: overchannel uses back, feedback dissipates.
/// Long rest: also refills charges and clears feedback.
pub fn apply_rest(state: &TemplarState, kind: RestKind) -> TemplarState {
    let mut next = restore_overchannel_uses(state);
    next.faith_feedback = heat::apply_rest(&state.faith_feedback, kind);
    if kind == RestKind::Long {
        next.charges = pool::set_current(&state.charges, state.charges.effective_maximum());
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ability, CasterKind, UseCounter};
    use crate::pool::ResourcePool;

    fn smite() -> Castable {
        Castable {
            name: "Radiant Smite".into(),
            level: 1,
            base_cost: 1,
            cost_scaling: 1,
            base_generation: 1,
            generation_scaling: 1,
            can_overdrive: true,
            enhancement: String::new(),
            components: None,
        }
    }

    fn templar(feedback: i32, feedback_max: i32) -> TemplarState {
        let tracker = heat::new_heat_state(feedback_max, 9, 2, CasterKind::Templar);
        TemplarState {
            level: 5,
            primary_ability: Ability::Wisdom,
            charges: ResourcePool::full(6),
            overchannel_uses: UseCounter::full(2),
            faith_feedback: heat::add_heat(&tracker, feedback),
            resonance_harmony: 10,
        }
    }

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_step_functions() {
        assert_eq!(resonance_tier(5), 3);
        assert_eq!(max_overchannel_uses(1), 1);
        assert_eq!(max_overchannel_uses(10), 3);
        assert_eq!(max_overchannel_uses(20), 4);
        assert_eq!(max_faith_feedback(5, 3), 18);
        assert_eq!(max_faith_feedback(5, -2), 15);
    }

    #[test]
    fn test_feedback_floor_and_doubling() {
        assert_eq!(feedback_for_cast(&smite(), 2, false), 2);
        assert_eq!(feedback_for_cast(&smite(), 2, true), 4);

        let mut quiet = smite();
        quiet.base_generation = 0;
        quiet.generation_scaling = 0;
        // cost 1 / 2 == 0, floored to 1.
        assert_eq!(feedback_for_cast(&quiet, 1, false), 1);
        // cost 5 / 2 == 2.
        assert_eq!(feedback_for_cast(&quiet, 5, false), 2);
    }

    #[test]
    fn test_harmony_bonus() {
        let recent = types(&["light", "light", "light", "light", "ward"]);
        assert_eq!(harmony_bonus(0, "light", &recent), 3);
        assert_eq!(harmony_bonus(10, "light", &recent), 5);
        assert_eq!(harmony_bonus(4, "storm", &recent), 0);
    }

    #[test]
    fn test_update_harmony() {
        let recent = types(&["light", "ward", "storm", "ward"]);
        assert_eq!(update_harmony(3, "light", &recent, true), 5);
        assert_eq!(update_harmony(3, "light", &types(&["ward"]), true), 4);
        assert_eq!(update_harmony(3, "light", &types(&["light"]), true), 3);
        assert_eq!(update_harmony(3, "light", &recent, false), 2);
        assert_eq!(update_harmony(0, "light", &recent, false), 0);
        assert_eq!(update_harmony(MAX_HARMONY, "light", &recent, true), MAX_HARMONY);
    }

    #[test]
    fn test_penalty_bands() {
        assert_eq!(faith_feedback_penalties(7, 15), FaithPenalties::default());
        assert_eq!(faith_feedback_penalties(8, 16).attack, -1);
        assert_eq!(faith_feedback_penalties(12, 16).save_dc, -2);
        assert_eq!(faith_feedback_penalties(16, 16).attack, -3);
        assert_eq!(faith_feedback_penalties(5, 0), FaithPenalties::default());
    }

    #[test]
    fn test_cast_reports_harmony_only_with_history() {
        let s = templar(0, 15);
        let out = cast(&s, &smite(), 2, false, None).unwrap();
        assert_eq!(out.harmony_bonus, None);
        assert_eq!(out.cost, 2);
        assert_eq!(out.feedback, 2);
        assert_eq!(out.state.charges.current, 4);

        let recent = types(&["light", "light"]);
        let history = CastHistory {
            cast_type: "light",
            recent: &recent,
        };
        let out = cast(&s, &smite(), 2, true, Some(history)).unwrap();
        assert_eq!(out.harmony_bonus, Some(4));
        assert_eq!(out.feedback, 4);
        assert_eq!(out.state.overchannel_uses.current, 1);
        // Casting never touches harmony; that is an explicit step.
        assert_eq!(out.state.resonance_harmony, 10);
    }

    #[test]
    fn test_faith_feedback_ceiling_leaves_state_unchanged() {
        let s = templar(14, 15);
        let before = s.clone();
        let err = cast(&s, &smite(), 2, false, None).unwrap_err();
        assert_eq!(err.to_string(), "would exceed maximum faith feedback (16/15)");
        assert_eq!(s, before);
    }

    #[test]
    fn test_validation_order() {
        let mut s = templar(0, 15);
        s.overchannel_uses.current = 0;
        let mut locked = smite();
        locked.can_overdrive = false;
        assert_eq!(cast(&s, &locked, 1, true, None).unwrap_err().code(), "cannot_overchannel");
        assert_eq!(cast(&s, &smite(), 1, true, None).unwrap_err(), CastError::NoOverchannelUses);
        assert_eq!(
            cast(&s, &smite(), 4, false, None).unwrap_err(),
            CastError::LevelExceedsTier { level: 4, tier: 3 }
        );
        s.charges.current = 1;
        assert_eq!(
            cast(&s, &smite(), 3, false, None).unwrap_err(),
            CastError::InsufficientResource {
                resource: "charges",
                cost: 3,
                available: 1
            }
        );

        // Feedback at its ceiling as well: charges are checked first.
        let mut full = templar(15, 15);
        full.charges.current = 0;
        assert_eq!(
            cast(&full, &smite(), 2, false, None).unwrap_err(),
            CastError::InsufficientResource {
                resource: "charges",
                cost: 2,
                available: 0
            }
        );
    }

    #[test]
    fn test_rests_and_harmony_step() {
        let s = cast(&templar(0, 15), &smite(), 3, true, None).unwrap().state;
        assert_eq!(s.faith_feedback.heat_points.current, 6);
        let short = apply_rest(&s, RestKind::Short);
        assert_eq!(short.overchannel_uses.current, 2);
        assert_eq!(short.faith_feedback.heat_points.current, 4);
        let long = apply_rest(&s, RestKind::Long);
        assert_eq!(long.charges.current, 6);
        assert_eq!(long.faith_feedback.heat_points.current, 0);

        let tuned = apply_harmony_update(&s, "light", &types(&["ward", "storm"]), true);
        assert_eq!(tuned.resonance_harmony, 12);
    }
}
