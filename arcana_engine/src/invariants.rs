//! Structural validation of state records.
//!
//! Used after deserialization and by the runtime after each action.
//! Every check appends to the same list, so a single call reports all
//! problems at once. Invalid data is never coerced.

use crate::domain::{ArcanistState, CasterKind, CasterRecord, HeatState, TemplarState, UseCounter};
use crate::error::{ValidationCode, ValidationError};
use crate::harmonic::MAX_HARMONY;
use crate::overclock::{MAX_EQUILIBRIUM_TIER, MAX_OVERCLOCK_MULTIPLIER, MIN_OVERCLOCK_MULTIPLIER};
use crate::pool::ResourcePool;

pub const MIN_CASTER_LEVEL: u32 = 1;
pub const MAX_CASTER_LEVEL: u32 = 20;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn validate_pool(pool: &ResourcePool, field: &str) -> Result<(), Vec<ValidationError>> {
    finish(|errors| check_pool(pool, field, errors))
}

pub fn validate_heat_state(
    state: &HeatState,
    expected_source: CasterKind,
    field: &str,
) -> Result<(), Vec<ValidationError>> {
    finish(|errors| check_heat(state, expected_source, field, errors))
}

pub fn validate_arcanist(state: &ArcanistState) -> Result<(), Vec<ValidationError>> {
    finish(|errors| check_arcanist(state, errors))
}

pub fn validate_templar(state: &TemplarState) -> Result<(), Vec<ValidationError>> {
    finish(|errors| check_templar(state, errors))
}

pub fn validate_record(record: &CasterRecord) -> Result<(), Vec<ValidationError>> {
    match record {
        CasterRecord::Arcanist(s) => validate_arcanist(s),
        CasterRecord::Templar(s) => validate_templar(s),
    }
}

fn finish(check: impl FnOnce(&mut Vec<ValidationError>)) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check(&mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_pool(pool: &ResourcePool, field: &str, errors: &mut Vec<ValidationError>) {
    if pool.current < 0 || pool.maximum < 0 {
        errors.push(ValidationError::new(
            ValidationCode::NegativePoolValue,
            format!(
                "{field}: current={} maximum={} must not be negative",
                pool.current, pool.maximum
            ),
        ));
    }
    check_cap(pool, field, errors);
    if pool.current > pool.effective_maximum() {
        errors.push(ValidationError::new(
            ValidationCode::PoolOverEffectiveMaximum,
            format!(
                "{field}: current={} exceeds effective maximum={}",
                pool.current,
                pool.effective_maximum()
            ),
        ));
    }
}

/// `effective_maximum()` clamps at 0 for the pool operations; the record
/// itself must never carry a negative cap.
fn check_cap(pool: &ResourcePool, field: &str, errors: &mut Vec<ValidationError>) {
    let cap = i64::from(pool.maximum) + i64::from(pool.temporary);
    if cap < 0 {
        errors.push(ValidationError::new(
            ValidationCode::NegativeEffectiveMaximum,
            format!(
                "{field}: maximum={} temporary={} gives a negative cap of {cap}",
                pool.maximum, pool.temporary
            ),
        ));
    }
}

fn check_uses(uses: &UseCounter, field: &str, errors: &mut Vec<ValidationError>) {
    if uses.current > uses.maximum {
        errors.push(ValidationError::new(
            ValidationCode::UsesOverMaximum,
            format!("{field}: current={} exceeds maximum={}", uses.current, uses.maximum),
        ));
    }
}

fn check_level(level: u32, errors: &mut Vec<ValidationError>) {
    if !(MIN_CASTER_LEVEL..=MAX_CASTER_LEVEL).contains(&level) {
        errors.push(ValidationError::new(
            ValidationCode::InvalidCasterLevel,
            format!("caster level {level} outside {MIN_CASTER_LEVEL}..={MAX_CASTER_LEVEL}"),
        ));
    }
}

fn check_heat(
    state: &HeatState,
    expected_source: CasterKind,
    field: &str,
    errors: &mut Vec<ValidationError>,
) {
    let hp = &state.heat_points;
    if hp.current < 0 || hp.maximum < 0 {
        errors.push(ValidationError::new(
            ValidationCode::NegativePoolValue,
            format!(
                "{field}: current={} maximum={} must not be negative",
                hp.current, hp.maximum
            ),
        ));
    }
    check_cap(hp, field, errors);
    if hp.current > hp.effective_maximum() {
        errors.push(ValidationError::new(
            ValidationCode::HeatOverMaximum,
            format!(
                "{field}: current={} exceeds maximum={}",
                hp.current,
                hp.effective_maximum()
            ),
        ));
    }
    if state.threshold < 0 || state.threshold > hp.maximum {
        errors.push(ValidationError::new(
            ValidationCode::InvalidThreshold,
            format!(
                "{field}: threshold={} outside 0..={}",
                state.threshold, hp.maximum
            ),
        ));
    }
    if state.dissipation_rate < 0 {
        errors.push(ValidationError::new(
            ValidationCode::NegativeDissipation,
            format!("{field}: dissipation_rate={} is negative", state.dissipation_rate),
        ));
    }
    if state.feedback.level > 100 {
        errors.push(ValidationError::new(
            ValidationCode::InvalidFeedbackLevel,
            format!("{field}: feedback level {} above 100", state.feedback.level),
        ));
    }
    if state.feedback.source != expected_source {
        errors.push(ValidationError::new(
            ValidationCode::FeedbackSourceMismatch,
            format!(
                "{field}: feedback source {:?} on a {:?} caster",
                state.feedback.source, expected_source
            ),
        ));
    }
    if !state.concentration.active && state.concentration.effect.is_some() {
        errors.push(ValidationError::new(
            ValidationCode::StrayConcentrationEffect,
            format!(
                "{field}: concentration effect {:?} recorded while idle",
                state.concentration.effect
            ),
        ));
    }
}

fn check_arcanist(state: &ArcanistState, errors: &mut Vec<ValidationError>) {
    check_level(state.level, errors);
    check_pool(&state.afp, "afp", errors);
    if state.equilibrium_tier > MAX_EQUILIBRIUM_TIER {
        errors.push(ValidationError::new(
            ValidationCode::InvalidEquilibriumTier,
            format!(
                "equilibrium tier {} outside 0..={MAX_EQUILIBRIUM_TIER}",
                state.equilibrium_tier
            ),
        ));
    }
    check_uses(&state.overclock_uses, "overclock_uses", errors);
    let m = state.overclock_multiplier;
    if !m.is_finite() || !(MIN_OVERCLOCK_MULTIPLIER..=MAX_OVERCLOCK_MULTIPLIER).contains(&m) {
        errors.push(ValidationError::new(
            ValidationCode::InvalidOverclockMultiplier,
            format!(
                "overclock multiplier {m} outside {MIN_OVERCLOCK_MULTIPLIER}..={MAX_OVERCLOCK_MULTIPLIER}"
            ),
        ));
    }
    check_heat(&state.heat, CasterKind::Arcanist, "heat", errors);
}

fn check_templar(state: &TemplarState, errors: &mut Vec<ValidationError>) {
    check_level(state.level, errors);
    check_pool(&state.charges, "charges", errors);
    check_uses(&state.overchannel_uses, "overchannel_uses", errors);
    check_heat(&state.faith_feedback, CasterKind::Templar, "faith_feedback", errors);
    if !(0..=MAX_HARMONY).contains(&state.resonance_harmony) {
        errors.push(ValidationError::new(
            ValidationCode::InvalidHarmony,
            format!(
                "resonance harmony {} outside 0..={MAX_HARMONY}",
                state.resonance_harmony
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ability;
    use crate::state::{new_arcanist, new_templar};

    fn codes(result: Result<(), Vec<ValidationError>>) -> Vec<ValidationCode> {
        result.unwrap_err().into_iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_fresh_records_are_valid() {
        assert!(validate_arcanist(&new_arcanist(5, Ability::Intelligence, 3, 8)).is_ok());
        assert!(validate_templar(&new_templar(12, Ability::Wisdom, 4, 10)).is_ok());
    }

    #[test]
    fn test_pool_checks() {
        let pool = ResourcePool {
            current: 9,
            maximum: 8,
            temporary: 0,
        };
        assert_eq!(
            codes(validate_pool(&pool, "afp")),
            vec![ValidationCode::PoolOverEffectiveMaximum]
        );
        let boosted = ResourcePool {
            temporary: 2,
            ..pool
        };
        assert!(validate_pool(&boosted, "afp").is_ok());
    }

    #[test]
    fn test_negative_cap_is_rejected_even_when_empty() {
        let drained = ResourcePool {
            current: 0,
            maximum: 2,
            temporary: -5,
        };
        let errors = validate_pool(&drained, "afp").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ValidationCode::NegativeEffectiveMaximum);
        assert!(errors[0].message.contains("cap of -3"));

        let at_zero = ResourcePool {
            temporary: -2,
            ..drained
        };
        assert!(validate_pool(&at_zero, "afp").is_ok());

        let mut s = new_templar(5, Ability::Wisdom, 0, 6);
        s.charges = drained;
        assert_eq!(
            codes(validate_record(&CasterRecord::Templar(s))),
            vec![ValidationCode::NegativeEffectiveMaximum]
        );

        let mut s = new_arcanist(5, Ability::Intelligence, 3, 8);
        s.heat.heat_points.temporary = -(s.heat.heat_points.maximum + 1);
        s.heat.threshold = 0;
        assert_eq!(
            codes(validate_arcanist(&s)),
            vec![ValidationCode::NegativeEffectiveMaximum]
        );
    }

    #[test]
    fn test_all_arcanist_problems_reported_together() {
        let mut s = new_arcanist(5, Ability::Intelligence, 3, 8);
        s.equilibrium_tier = 12;
        s.overclock_multiplier = 0.5;
        s.afp.current = -1;
        s.heat.heat_points.current = s.heat.heat_points.maximum + 1;
        assert_eq!(
            codes(validate_arcanist(&s)),
            vec![
                ValidationCode::NegativePoolValue,
                ValidationCode::InvalidEquilibriumTier,
                ValidationCode::InvalidOverclockMultiplier,
                ValidationCode::HeatOverMaximum,
            ]
        );
    }

    #[test]
    fn test_nan_multiplier_is_invalid() {
        let mut s = new_arcanist(5, Ability::Intelligence, 3, 8);
        s.overclock_multiplier = f64::NAN;
        assert_eq!(
            codes(validate_arcanist(&s)),
            vec![ValidationCode::InvalidOverclockMultiplier]
        );
    }

    #[test]
    fn test_templar_checks() {
        let mut s = new_templar(5, Ability::Wisdom, 0, 6);
        s.level = 0;
        s.resonance_harmony = -2;
        s.overchannel_uses.current = 9;
        s.faith_feedback.feedback.source = CasterKind::Arcanist;
        s.faith_feedback.concentration.effect = Some("shield of faith".into());
        assert_eq!(
            codes(validate_templar(&s)),
            vec![
                ValidationCode::InvalidCasterLevel,
                ValidationCode::UsesOverMaximum,
                ValidationCode::FeedbackSourceMismatch,
                ValidationCode::StrayConcentrationEffect,
                ValidationCode::InvalidHarmony,
            ]
        );
    }

    #[test]
    fn test_validate_record_dispatches() {
        let mut s = new_templar(5, Ability::Wisdom, 0, 6);
        s.resonance_harmony = 21;
        let record = CasterRecord::Templar(s);
        assert_eq!(codes(validate_record(&record)), vec![ValidationCode::InvalidHarmony]);
    }
}
