//! Shared utilities consumed by both caster engines and by external callers.
//!
//! Heat threshold / dissipation math, per-level scaling, component
//! affordability, spell-level naming and multiclass slot aggregation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Heat math
// ---------------------------------------------------------------------------

/// Percentage of the maximum below which heat produces no feedback.
pub const HEAT_THRESHOLD_PERCENT: i32 = 60;

/// Feedback threshold for a heat/feedback maximum. `max * 60 / 100`.
pub fn heat_threshold(maximum: i32) -> i32 {
    maximum.max(0) * HEAT_THRESHOLD_PERCENT / 100
}

/// Heat shed per short rest.
pub fn dissipation_rate(level: u32, ability_modifier: i32) -> i32 {
    1 + level as i32 / 4 + ability_modifier.max(0) / 2
}

/// Arcanist heat ceiling.
pub fn max_heat(level: u32, ability_modifier: i32) -> i32 {
    10 + 2 * level as i32 + ability_modifier.max(0)
}

/// `base + per_level * (effective_level - base_level)`, with casting below
/// the native level treated as casting at it.
pub fn scale_for_level(base: i32, per_level: i32, base_level: u32, effective_level: u32) -> i32 {
    let extra = effective_level.saturating_sub(base_level) as i32;
    base.saturating_add(per_level.saturating_mul(extra))
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaterialComponent {
    pub description: String,
    /// Gold-piece cost; 0 means a focus or pouch covers it.
    pub cost_gp: u32,
    pub consumed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpellComponents {
    pub verbal: bool,
    pub somatic: bool,
    pub material: Option<MaterialComponent>,
}

/// What the caster currently has available to satisfy components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CasterReadiness {
    pub can_speak: bool,
    pub free_hand: bool,
    pub has_focus: bool,
    pub gold_gp: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentShortfall {
    Verbal,
    Somatic,
    MaterialCost { needed: u32, available: u32 },
    MaterialFocus,
}

/// Every requirement in `components` the caster cannot currently meet.
pub fn check_components(
    components: &SpellComponents,
    caster: &CasterReadiness,
) -> Vec<ComponentShortfall> {
    let mut missing = Vec::new();
    if components.verbal && !caster.can_speak {
        missing.push(ComponentShortfall::Verbal);
    }
    if components.somatic && !caster.free_hand {
        missing.push(ComponentShortfall::Somatic);
    }
    if let Some(material) = &components.material {
        if material.cost_gp > 0 {
            if caster.gold_gp < material.cost_gp {
                missing.push(ComponentShortfall::MaterialCost {
                    needed: material.cost_gp,
                    available: caster.gold_gp,
                });
            }
        } else if !caster.has_focus {
            missing.push(ComponentShortfall::MaterialFocus);
        }
    }
    missing
}

pub fn can_afford_components(components: &SpellComponents, caster: &CasterReadiness) -> bool {
    check_components(components, caster).is_empty()
}

// ---------------------------------------------------------------------------
// Spell levels
// ---------------------------------------------------------------------------

pub const MAX_SPELL_LEVEL: u32 = 9;

pub fn is_valid_spell_level(level: u32) -> bool {
    level <= MAX_SPELL_LEVEL
}

pub fn spell_level_name(level: u32) -> Option<&'static str> {
    const NAMES: [&str; 10] = [
        "Cantrip", "1st", "2nd", "3rd", "4th", "5th", "6th", "7th", "8th", "9th",
    ];
    NAMES.get(level as usize).copied()
}

// ---------------------------------------------------------------------------
// Multiclass slot aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    Full,
    Half,
    Third,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassLevels {
    pub progression: Progression,
    pub level: u32,
}

/// Slots per spell level (index 0 = 1st) for combined caster levels 1..=20.
const MULTICLASS_SLOTS: [[u32; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

pub fn combined_caster_level(classes: &[ClassLevels]) -> u32 {
    classes
        .iter()
        .map(|c| match c.progression {
            Progression::Full => c.level,
            Progression::Half => c.level / 2,
            Progression::Third => c.level / 3,
            Progression::None => 0,
        })
        .sum()
}

pub fn multiclass_spell_slots(classes: &[ClassLevels]) -> [u32; 9] {
    let level = combined_caster_level(classes).min(20);
    if level == 0 {
        return [0; 9];
    }
    MULTICLASS_SLOTS[level as usize - 1]
}
