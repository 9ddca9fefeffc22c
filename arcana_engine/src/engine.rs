//! Record-level dispatcher.
//!
//! Routes a `CasterAction` to the right engine for the record's caster
//! kind and returns `(new_record, outcome)`. The input record is never
//! mutated; a rejected cast returns a clone of it unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::CasterAction;
use crate::dice::DieRoller;
use crate::domain::{CastReport, CasterKind, CasterRecord, HeatState, RestKind};
use crate::harmonic::{self, CastHistory};
use crate::heat::{self, SaveOutcome};
use crate::overclock;

/// What an applied action produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    Cast(CastReport),
    Rested { kind: RestKind },
    UsesRestored { uses: u32 },
    HarmonyUpdated { from: i32, to: i32 },
    ModifiersSet,
    ConcentrationStarted { effect: String },
    ConcentrationEnded,
    Save(SaveOutcome),
    TurnSavesReset,
}

/// An action that makes no sense for the record it was sent to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("{action} does not apply to {kind:?} casters")]
    NotApplicable {
        action: &'static str,
        kind: CasterKind,
    },
}

pub fn apply_action(
    record: &CasterRecord,
    action: &CasterAction,
    roller: &mut dyn DieRoller,
) -> Result<(CasterRecord, ActionOutcome), ActionError> {
    match action {
        CasterAction::Cast {
            castable,
            effective_level,
            overdrive,
            cast_type,
            recent,
        } => {
            let report = match record {
                CasterRecord::Arcanist(s) => CastReport::from_arcanist(&overclock::cast(
                    s,
                    castable,
                    *effective_level,
                    *overdrive,
                )),
                CasterRecord::Templar(s) => {
                    let history = cast_type.as_deref().map(|t| CastHistory {
                        cast_type: t,
                        recent,
                    });
                    let mut report = CastReport::from_templar(&harmonic::cast(
                        s,
                        castable,
                        *effective_level,
                        *overdrive,
                        history,
                    ));
                    // Reported for rejected casts too, whenever history is given.
                    if let Some(h) = history {
                        report.harmony_bonus =
                            Some(harmonic::harmony_bonus(s.resonance_harmony, h.cast_type, h.recent));
                    }
                    report
                }
            };
            let next = report
                .updated_state
                .clone()
                .unwrap_or_else(|| record.clone());
            Ok((next, ActionOutcome::Cast(report)))
        }

        CasterAction::Rest { kind } => {
            let next = match record {
                CasterRecord::Arcanist(s) => CasterRecord::Arcanist(overclock::apply_rest(s, *kind)),
                CasterRecord::Templar(s) => CasterRecord::Templar(harmonic::apply_rest(s, *kind)),
            };
            Ok((next, ActionOutcome::Rested { kind: *kind }))
        }

        CasterAction::RestoreUses => {
            let (next, uses) = match record {
                CasterRecord::Arcanist(s) => {
                    let n = overclock::restore_overclock_uses(s);
                    let uses = n.overclock_uses.current;
                    (CasterRecord::Arcanist(n), uses)
                }
                CasterRecord::Templar(s) => {
                    let n = harmonic::restore_overchannel_uses(s);
                    let uses = n.overchannel_uses.current;
                    (CasterRecord::Templar(n), uses)
                }
            };
            Ok((next, ActionOutcome::UsesRestored { uses }))
        }

        CasterAction::UpdateHarmony {
            cast_type,
            recent,
            succeeded,
        } => match record {
            CasterRecord::Templar(s) => {
                let n = harmonic::apply_harmony_update(s, cast_type, recent, *succeeded);
                let outcome = ActionOutcome::HarmonyUpdated {
                    from: s.resonance_harmony,
                    to: n.resonance_harmony,
                };
                Ok((CasterRecord::Templar(n), outcome))
            }
            CasterRecord::Arcanist(_) => Err(ActionError::NotApplicable {
                action: action.name(),
                kind: record.kind(),
            }),
        },

        CasterAction::SetModifiers { modifiers } => Ok((
            map_heat(record, |h| heat::with_modifiers(h, *modifiers)),
            ActionOutcome::ModifiersSet,
        )),

        CasterAction::StartConcentration { effect } => Ok((
            map_heat(record, |h| heat::start_concentration(h, effect)),
            ActionOutcome::ConcentrationStarted {
                effect: effect.clone(),
            },
        )),

        CasterAction::EndConcentration => Ok((
            map_heat(record, heat::end_concentration),
            ActionOutcome::ConcentrationEnded,
        )),

        CasterAction::ConcentrationSave {
            damage_taken,
            ability_modifier,
            proficiency_bonus,
        } => {
            let (h, outcome) = heat::concentration_save(
                record.heat(),
                *damage_taken,
                *ability_modifier,
                *proficiency_bonus,
                roller,
            );
            Ok((replace_heat(record, h), ActionOutcome::Save(outcome)))
        }

        CasterAction::ResetTurnSaves => Ok((
            map_heat(record, heat::reset_turn_saves),
            ActionOutcome::TurnSavesReset,
        )),
    }
}

fn map_heat(record: &CasterRecord, f: impl FnOnce(&HeatState) -> HeatState) -> CasterRecord {
    replace_heat(record, f(record.heat()))
}

fn replace_heat(record: &CasterRecord, heat: HeatState) -> CasterRecord {
    match record {
        CasterRecord::Arcanist(s) => {
            let mut n = s.clone();
            n.heat = heat;
            CasterRecord::Arcanist(n)
        }
        CasterRecord::Templar(s) => {
            let mut n = s.clone();
            n.faith_feedback = heat;
            CasterRecord::Templar(n)
        }
    }
}
