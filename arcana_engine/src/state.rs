//! Fresh caster construction.
//!
//! Builds a rested, cold record from the class-table inputs using the
//! engines' step functions.

use crate::domain::{Ability, ArcanistState, CasterKind, TemplarState, UseCounter};
use crate::harmonic::{max_faith_feedback, max_overchannel_uses};
use crate::heat::new_heat_state;
use crate::overclock::{equilibrium_tier, max_overclock_uses, overclock_multiplier};
use crate::pool::ResourcePool;
use crate::utils::{dissipation_rate, heat_threshold, max_heat};

pub fn new_arcanist(
    level: u32,
    primary_ability: Ability,
    ability_modifier: i32,
    afp_maximum: i32,
) -> ArcanistState {
    let heat_max = max_heat(level, ability_modifier);
    ArcanistState {
        level,
        primary_ability,
        afp: ResourcePool::full(afp_maximum),
        equilibrium_tier: equilibrium_tier(level),
        overclock_uses: UseCounter::full(max_overclock_uses(level)),
        overclock_multiplier: overclock_multiplier(level, ability_modifier),
        heat: new_heat_state(
            heat_max,
            heat_threshold(heat_max),
            dissipation_rate(level, ability_modifier),
            CasterKind::Arcanist,
        ),
    }
}

pub fn new_templar(
    level: u32,
    primary_ability: Ability,
    ability_modifier: i32,
    charge_maximum: i32,
) -> TemplarState {
    let feedback_max = max_faith_feedback(level, ability_modifier);
    TemplarState {
        level,
        primary_ability,
        charges: ResourcePool::full(charge_maximum),
        overchannel_uses: UseCounter::full(max_overchannel_uses(level)),
        faith_feedback: new_heat_state(
            feedback_max,
            heat_threshold(feedback_max),
            dissipation_rate(level, ability_modifier),
            CasterKind::Templar,
        ),
        resonance_harmony: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_arcanist_uses_step_functions() {
        let s = new_arcanist(5, Ability::Intelligence, 4, 8);
        assert_eq!(s.equilibrium_tier, 3);
        assert_eq!(s.overclock_uses, UseCounter::full(2));
        assert_eq!(s.overclock_multiplier, 1.8);
        assert_eq!(s.afp, ResourcePool::full(8));
        assert_eq!(s.heat.heat_points.maximum, 24);
        assert_eq!(s.heat.threshold, 14);
        assert_eq!(s.heat.dissipation_rate, 4);
        assert_eq!(s.heat.feedback.source, CasterKind::Arcanist);
    }

    #[test]
    fn test_new_templar_starts_cold_and_unharmonized() {
        let s = new_templar(5, Ability::Wisdom, 0, 6);
        assert_eq!(s.faith_feedback.heat_points.maximum, 15);
        assert_eq!(s.faith_feedback.threshold, 9);
        assert_eq!(s.faith_feedback.heat_points.current, 0);
        assert_eq!(s.resonance_harmony, 0);
        assert_eq!(s.overchannel_uses.current, 2);
    }
}
