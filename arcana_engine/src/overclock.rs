//! Overclocking caster engine (Arcanist).
//!
//! AFP pays for casts; heat is the side effect. Overclocking multiplies
//! heat by a factor that shrinks with level and primary-ability modifier,
//! so experienced casters overclock more efficiently.

use tracing::debug;

use crate::domain::{ArcanistCast, ArcanistState, Castable, RestKind};
use crate::error::CastError;
use crate::heat;
use crate::pool;
use crate::utils::scale_for_level;

pub const MAX_EQUILIBRIUM_TIER: u32 = 9;
pub const MAX_OVERCLOCK_USES: u32 = 5;

// Multiplier math runs in hundredths so floors are exact.
const MULTIPLIER_BASE: i64 = 200;
const MULTIPLIER_STEP_PER_3_LEVELS: i64 = 10;
const MULTIPLIER_STEP_PER_2_MODIFIER: i64 = 5;
const MULTIPLIER_FLOOR: i64 = 120;

pub const MIN_OVERCLOCK_MULTIPLIER: f64 = MULTIPLIER_FLOOR as f64 / 100.0;
pub const MAX_OVERCLOCK_MULTIPLIER: f64 = MULTIPLIER_BASE as f64 / 100.0;

// ---------------------------------------------------------------------------
// Step functions
// ---------------------------------------------------------------------------

/// Highest castable level: one tier per two caster levels, capped at 9.
pub fn equilibrium_tier(level: u32) -> u32 {
    (level.saturating_add(1) / 2).min(MAX_EQUILIBRIUM_TIER)
}

/// One use, plus one every four levels.
pub fn max_overclock_uses(level: u32) -> u32 {
    (1 + level / 4).min(MAX_OVERCLOCK_USES)
}

pub fn overclock_multiplier(level: u32, ability_modifier: i32) -> f64 {
    let hundredths = MULTIPLIER_BASE
        - MULTIPLIER_STEP_PER_3_LEVELS * i64::from(level / 3)
        - MULTIPLIER_STEP_PER_2_MODIFIER * i64::from(ability_modifier.max(0) / 2);
    hundredths.max(MULTIPLIER_FLOOR) as f64 / 100.0
}

// ---------------------------------------------------------------------------
// Per-cast math
// ---------------------------------------------------------------------------

pub fn cost_for_level(castable: &Castable, effective_level: u32) -> i32 {
    scale_for_level(
        castable.base_cost,
        castable.cost_scaling,
        castable.level,
        effective_level,
    )
}

/// Normal heat scales like cost; overclocked heat is `floor(normal * multiplier)`.
pub fn heat_for_cast(
    castable: &Castable,
    effective_level: u32,
    overclocked: bool,
    multiplier: f64,
) -> i32 {
    let normal = scale_for_level(
        castable.base_generation,
        castable.generation_scaling,
        castable.level,
        effective_level,
    );
    if !overclocked {
        return normal;
    }
    let hundredths = (multiplier * 100.0).round() as i64;
    let scaled = i64::from(normal) * hundredths;
    scaled.div_euclid(100).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// ---------------------------------------------------------------------------
// Cast
// ---------------------------------------------------------------------------

/// Validate and apply one cast. Rules run in a fixed order and the first
/// failure is returned; nothing is mutated unless every rule passes.
pub fn cast(
    state: &ArcanistState,
    castable: &Castable,
    effective_level: u32,
    overclocked: bool,
) -> Result<ArcanistCast, CastError> {
    let result = validate_and_apply(state, castable, effective_level, overclocked);
    if let Err(err) = &result {
        debug!(
            castable = %castable.name,
            effective_level,
            overclocked,
            code = err.code(),
            "arcanist cast rejected: {err}"
        );
    }
    result
}

fn validate_and_apply(
    state: &ArcanistState,
    castable: &Castable,
    effective_level: u32,
    overclocked: bool,
) -> Result<ArcanistCast, CastError> {
    if overclocked && !castable.can_overdrive {
        return Err(CastError::CannotOverclock {
            castable: castable.name.clone(),
        });
    }
    if overclocked && state.overclock_uses.current == 0 {
        return Err(CastError::NoOverclockUses);
    }
    if effective_level > state.equilibrium_tier {
        return Err(CastError::LevelExceedsTier {
            level: effective_level,
            tier: state.equilibrium_tier,
        });
    }

    let cost = cost_for_level(castable, effective_level);
    if !pool::has_at_least(&state.afp, cost) {
        return Err(CastError::InsufficientResource {
            resource: "AFP",
            cost,
            available: state.afp.current,
        });
    }

    let heat = heat_for_cast(
        castable,
        effective_level,
        overclocked,
        state.overclock_multiplier,
    );
    let total = state.heat.heat_points.current.saturating_add(heat);
    let maximum = state.heat.heat_points.effective_maximum();
    if total > maximum {
        return Err(CastError::ExceedsMaximumHeat { total, maximum });
    }

    let mut next = state.clone();
    next.afp = pool::spend(&state.afp, cost);
    next.heat = heat::add_heat(&state.heat, heat);
    if overclocked {
        next.overclock_uses.current -= 1;
    }

    Ok(ArcanistCast {
        state: next,
        cost,
        heat,
        overclocked,
    })
}

// ---------------------------------------------------------------------------
// Restoration
// ---------------------------------------------------------------------------

pub fn restore_overclock_uses(state: &ArcanistState) -> ArcanistState {
    let mut next = state.clone();
    next.overclock_uses.current = next.overclock_uses.maximum;
    next
}

/// Short rest: overclock uses back, heat dissipates.
/// Long rest: also refills AFP and clears heat.
pub fn apply_rest(state: &ArcanistState, kind: RestKind) -> ArcanistState {
    let mut next = restore_overclock_uses(state);
    next.heat = heat::apply_rest(&state.heat, kind);
    if kind == RestKind::Long {
        next.afp = pool::set_current(&state.afp, state.afp.effective_maximum());
    }
    next
}
