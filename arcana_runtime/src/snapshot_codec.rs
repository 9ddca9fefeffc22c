//! Snapshot codec for CasterRecord.
//!
//! Pure codec layer. No timestamps, no envelope.
//!
//! - `encode_snapshot`:  CasterRecord → compact JSON string
//! - `decode_snapshot`:  JSON string → CasterRecord (strict, no defaults)
//! - `restore_snapshot`: decode + `validate_record`
//! - `export_snapshot_to_file` / `import_snapshot_from_file`: file I/O
//! - `snapshot_hash`:    SHA-256 of the encoded JSON (lowercase hex)

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;

use arcana_engine::domain::CasterRecord;
use arcana_engine::error::ValidationError;
use arcana_engine::invariants::validate_record;

/// All possible snapshot codec failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
    /// Malformed JSON, missing fields or unknown fields.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
    /// The record decoded but breaks one or more structural rules.
    #[error("invariant violation: {}", describe(.0))]
    InvariantViolation(Vec<ValidationError>),
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

fn describe(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Encoder / decoder
// ---------------------------------------------------------------------------

/// Field order follows declaration order; no whitespace.
pub fn encode_snapshot(record: &CasterRecord) -> Result<String, SnapshotError> {
    serde_json::to_string(record).map_err(SnapshotError::Serialization)
}

/// Strict decode: `deny_unknown_fields` throughout, missing required
/// fields fail. No invariant validation; see `restore_snapshot`.
pub fn decode_snapshot(json: &str) -> Result<CasterRecord, SnapshotError> {
    serde_json::from_str(json).map_err(SnapshotError::Deserialization)
}

/// Decode and validate. The entry point for records from untrusted
/// sources; every violated rule is reported, not just the first.
pub fn restore_snapshot(json: &str) -> Result<CasterRecord, SnapshotError> {
    let record = decode_snapshot(json)?;
    validate_record(&record).map_err(SnapshotError::InvariantViolation)?;
    Ok(record)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Creates parent directories if needed. Identical records produce
/// byte-identical files.
pub fn export_snapshot_to_file(record: &CasterRecord, path: &Path) -> Result<(), SnapshotError> {
    let json = encode_snapshot(record)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json.as_bytes())?;
    Ok(())
}

pub fn import_snapshot_from_file(path: &Path) -> Result<CasterRecord, SnapshotError> {
    let content = fs::read_to_string(path)?;
    restore_snapshot(&content)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of `encode_snapshot` output. Unlike `canonical_hash` this
/// carries no engine version; it identifies the snapshot bytes only.
pub fn snapshot_hash(record: &CasterRecord) -> Result<String, SnapshotError> {
    let json = encode_snapshot(record)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
