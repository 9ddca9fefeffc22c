//! Caster actions.
//!
//! Pure data: intent and payload only, no transition logic. The
//! dispatcher in `engine` turns an action into a new record.

use serde::{Deserialize, Serialize};

use crate::domain::{Castable, FeedbackModifiers, RestKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CasterAction {
    /// Cast a resolved castable. `overdrive` is overclock (Arcanist) or
    /// overchannel (Templar). `cast_type` and `recent` feed the harmony
    /// bonus and are ignored for Arcanists.
    Cast {
        castable: Castable,
        effective_level: u32,
        #[serde(default)]
        overdrive: bool,
        #[serde(default)]
        cast_type: Option<String>,
        #[serde(default)]
        recent: Vec<String>,
    },
    Rest {
        kind: RestKind,
    },
    /// Restore overclock / overchannel uses without resting.
    RestoreUses,
    /// Templar only.
    UpdateHarmony {
        cast_type: String,
        recent: Vec<String>,
        succeeded: bool,
    },
    SetModifiers {
        modifiers: FeedbackModifiers,
    },
    StartConcentration {
        effect: String,
    },
    EndConcentration,
    ConcentrationSave {
        damage_taken: i32,
        ability_modifier: i32,
        proficiency_bonus: i32,
    },
    ResetTurnSaves,
}

impl CasterAction {
    /// Snake-case action name, as used in logs and serialized tags.
    pub fn name(&self) -> &'static str {
        match self {
            CasterAction::Cast { .. } => "cast",
            CasterAction::Rest { .. } => "rest",
            CasterAction::RestoreUses => "restore_uses",
            CasterAction::UpdateHarmony { .. } => "update_harmony",
            CasterAction::SetModifiers { .. } => "set_modifiers",
            CasterAction::StartConcentration { .. } => "start_concentration",
            CasterAction::EndConcentration => "end_concentration",
            CasterAction::ConcentrationSave { .. } => "concentration_save",
            CasterAction::ResetTurnSaves => "reset_turn_saves",
        }
    }
}
