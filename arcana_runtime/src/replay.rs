//! Replay: rebuild a record from a session log.
//!
//! Feeds the recorded rolls back through a `FixedRoller`, so a replay
//! never touches the original seed. All rules come from the kernel.

use thiserror::Error;

use arcana_engine::dice::FixedRoller;
use arcana_engine::domain::CasterRecord;
use arcana_engine::engine::{apply_action, ActionError};
use arcana_engine::hashing::canonical_hash;

use crate::session::LogEntry;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("step {step}: {source}")]
    Action {
        step: usize,
        #[source]
        source: ActionError,
    },
    #[error("hashing failed: {0}")]
    Hash(#[from] serde_json::Error),
}

/// Apply `entries` in order to `initial` and return the final record and
/// its canonical hash.
pub fn rebuild_record(
    initial: &CasterRecord,
    entries: &[LogEntry],
) -> Result<(CasterRecord, String), ReplayError> {
    let mut roller = FixedRoller::new(entries.iter().filter_map(|e| e.roll));
    let mut record = initial.clone();
    for (i, entry) in entries.iter().enumerate() {
        let (next, _) = apply_action(&record, &entry.action, &mut roller)
            .map_err(|source| ReplayError::Action { step: i + 1, source })?;
        record = next;
    }
    let hash = canonical_hash(&record)?;
    Ok((record, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(initial: &CasterRecord, entries: &[LogEntry]) -> Result<String, ReplayError> {
    rebuild_record(initial, entries).map(|(_, hash)| hash)
}
