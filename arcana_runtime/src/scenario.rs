//! Scenario files for the harness.
//!
//! A scenario is an initial record, a catalog of castables, a list of
//! steps and optionally the expected final hash. A step either names a castable from the catalog or is a raw
//! `CasterAction`:
//!
//! ```json
//! {"spell": "Ember", "effective_level": 2, "overdrive": true}
//! {"type": "rest", "kind": "short"}
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use arcana_engine::actions::CasterAction;
use arcana_engine::domain::{CasterRecord, Castable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub record: CasterRecord,
    #[serde(default)]
    pub catalog: Vec<Castable>,
    pub steps: Vec<ScenarioStep>,
    /// Canonical hash the final record must reach, if pinned.
    #[serde(default)]
    pub expected_hash: Option<String>,
}

/// A cast looked up by name in the scenario catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpellStep {
    pub spell: String,
    pub effective_level: u32,
    #[serde(default)]
    pub overdrive: bool,
    #[serde(default)]
    pub cast_type: Option<String>,
    #[serde(default)]
    pub recent: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioStep {
    Spell(SpellStep),
    Action(CasterAction),
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: no castable named {name:?} in the catalog")]
    UnknownSpell { step: usize, name: String },
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Resolve every step against the catalog.
    pub fn actions(&self) -> Result<Vec<CasterAction>, ScenarioError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| self.resolve(i + 1, step))
            .collect()
    }

    fn resolve(&self, step: usize, s: &ScenarioStep) -> Result<CasterAction, ScenarioError> {
        match s {
            ScenarioStep::Action(action) => Ok(action.clone()),
            ScenarioStep::Spell(spell) => {
                let castable = self
                    .catalog
                    .iter()
                    .find(|c| c.name == spell.spell)
                    .ok_or_else(|| ScenarioError::UnknownSpell {
                        step,
                        name: spell.spell.clone(),
                    })?;
                Ok(CasterAction::Cast {
                    castable: castable.clone(),
                    effective_level: spell.effective_level,
                    overdrive: spell.overdrive,
                    cast_type: spell.cast_type.clone(),
                    recent: spell.recent.clone(),
                })
            }
        }
    }
}
