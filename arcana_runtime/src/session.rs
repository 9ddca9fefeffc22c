//! Caster sessions.
//!
//! A session owns one record, a die roller and the ordered log of the
//! actions it accepted. Apply order:
//!   1. kernel `apply_action` on the current record
//!   2. optional `validate_record` on the result
//!   3. commit the record and append the log entry
//!
//! A step that fails leaves both record and log untouched. A rejected
//! cast is not a failure: the kernel reports it and the record stays put.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use arcana_engine::actions::CasterAction;
use arcana_engine::dice::{DieRoller, SeededRoller};
use arcana_engine::domain::CasterRecord;
use arcana_engine::engine::{apply_action, ActionError, ActionOutcome};
use arcana_engine::error::ValidationError;
use arcana_engine::hashing::canonical_hash;
use arcana_engine::invariants::validate_record;

use crate::config::RuntimeConfig;

/// One accepted action plus the raw d20 it consumed, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEntry {
    pub action: CasterAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<i32>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("record failed validation: {}", describe(.0))]
    InvalidRecord(Vec<ValidationError>),
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Passes rolls through and remembers them.
struct RecordingRoller<'a> {
    inner: &'a mut dyn DieRoller,
    rolls: Vec<i32>,
}

impl DieRoller for RecordingRoller<'_> {
    fn roll_d20(&mut self) -> i32 {
        let roll = self.inner.roll_d20();
        self.rolls.push(roll);
        roll
    }
}

pub struct CasterSession {
    record: CasterRecord,
    roller: Box<dyn DieRoller>,
    log: Vec<LogEntry>,
    validate_after_each_action: bool,
}

impl CasterSession {
    /// Start a session. The initial record is validated up front.
    pub fn new(
        record: CasterRecord,
        roller: Box<dyn DieRoller>,
        validate_after_each_action: bool,
    ) -> Result<Self, SessionError> {
        validate_record(&record).map_err(SessionError::InvalidRecord)?;
        info!(kind = ?record.kind(), level = record.level(), "session started");
        Ok(Self {
            record,
            roller,
            log: Vec::new(),
            validate_after_each_action,
        })
    }

    /// Seeded roller and validation flag taken from `config`.
    pub fn from_config(record: CasterRecord, config: &RuntimeConfig) -> Result<Self, SessionError> {
        Self::new(
            record,
            Box::new(SeededRoller::new(config.seed)),
            config.validate_after_each_action,
        )
    }

    pub fn apply(&mut self, action: CasterAction) -> Result<ActionOutcome, SessionError> {
        let mut recording = RecordingRoller {
            inner: self.roller.as_mut(),
            rolls: Vec::new(),
        };
        let (next, outcome) = apply_action(&self.record, &action, &mut recording)?;
        let roll = recording.rolls.last().copied();

        if self.validate_after_each_action {
            if let Err(errors) = validate_record(&next) {
                warn!(action = action.name(), count = errors.len(), "action produced an invalid record");
                return Err(SessionError::InvalidRecord(errors));
            }
        }

        info!(
            action = action.name(),
            step = self.log.len() + 1,
            resource = next.resource().current,
            heat = next.heat().heat_points.current,
            feedback = next.heat().feedback.level,
            "action applied"
        );
        self.record = next;
        self.log.push(LogEntry { action, roll });
        Ok(outcome)
    }

    pub fn record(&self) -> &CasterRecord {
        &self.record
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn current_hash(&self) -> Result<String, serde_json::Error> {
        canonical_hash(&self.record)
    }
}
