//! Drift detection: determinism checks and record comparison.
//!
//! Every numeric field in a report is an integer.

use std::collections::BTreeSet;

use serde::Serialize;

use arcana_engine::domain::{CasterRecord, EffectKind};

use crate::replay::{self, ReplayError};
use crate::session::LogEntry;

/// Replay the same log twice and compare hashes.
pub fn verify_determinism(initial: &CasterRecord, entries: &[LogEntry]) -> Result<bool, ReplayError> {
    let h1 = replay::rebuild_hash(initial, entries)?;
    let h2 = replay::rebuild_hash(initial, entries)?;
    Ok(h1 == h2)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub resource_a: i32,
    pub resource_b: i32,
    pub resource_delta: i32,
    pub heat_a: i32,
    pub heat_b: i32,
    pub heat_delta: i32,
    pub feedback_level_a: i32,
    pub feedback_level_b: i32,
    pub feedback_level_delta: i32,
    pub effects_added: Vec<EffectKind>,
    pub effects_removed: Vec<EffectKind>,
}

impl DriftReport {
    /// True when the two records agree on every compared quantity.
    pub fn is_clean(&self) -> bool {
        self.resource_delta == 0
            && self.heat_delta == 0
            && self.feedback_level_delta == 0
            && self.effects_added.is_empty()
            && self.effects_removed.is_empty()
    }
}

/// Deltas are `b - a`. Effects are compared by kind.
pub fn compare_records(a: &CasterRecord, b: &CasterRecord) -> DriftReport {
    let kinds = |r: &CasterRecord| -> BTreeSet<EffectKind> {
        r.heat().feedback.effects.iter().map(|e| e.kind).collect()
    };
    let kinds_a = kinds(a);
    let kinds_b = kinds(b);

    let resource_a = a.resource().current;
    let resource_b = b.resource().current;
    let heat_a = a.heat().heat_points.current;
    let heat_b = b.heat().heat_points.current;
    let level_a = i32::from(a.heat().feedback.level);
    let level_b = i32::from(b.heat().feedback.level);

    DriftReport {
        resource_a,
        resource_b,
        resource_delta: resource_b - resource_a,
        heat_a,
        heat_b,
        heat_delta: heat_b - heat_a,
        feedback_level_a: level_a,
        feedback_level_b: level_b,
        feedback_level_delta: level_b - level_a,
        effects_added: kinds_b.difference(&kinds_a).copied().collect(),
        effects_removed: kinds_a.difference(&kinds_b).copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcana_engine::domain::Ability;
    use arcana_engine::heat::add_heat;
    use arcana_engine::state::new_arcanist;

    #[test]
    fn identical_records_are_clean() {
        let r = CasterRecord::Arcanist(new_arcanist(5, Ability::Intelligence, 2, 8));
        assert!(compare_records(&r, &r).is_clean());
    }

    #[test]
    fn heat_and_effects_drift() {
        let cold = new_arcanist(5, Ability::Intelligence, 2, 8);
        let mut hot = cold.clone();
        hot.afp.current = 5;
        hot.heat = add_heat(&hot.heat, 18);
        let report = compare_records(
            &CasterRecord::Arcanist(cold),
            &CasterRecord::Arcanist(hot),
        );
        assert_eq!(report.resource_delta, -3);
        assert_eq!(report.heat_delta, 18);
        assert_eq!(report.feedback_level_a, 0);
        assert_eq!(report.feedback_level_delta, 55);
        assert_eq!(
            report.effects_added,
            vec![
                EffectKind::AttackPenalty,
                EffectKind::ConcentrationPenalty,
                EffectKind::SaveDcPenalty,
                EffectKind::GenerationIncrease,
            ]
        );
        assert!(report.effects_removed.is_empty());
        assert!(!report.is_clean());
    }
}
