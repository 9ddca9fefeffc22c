//! Canonical hashing.
//!
//! Deterministic serialization + SHA-256. Field order follows struct
//! declaration order (serde_json with `preserve_order`), JSON is compact,
//! and every payload is wrapped with the engine version as its first field
//! so a hash is bound to the rules that produced the record.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ENGINE_VERSION;

#[derive(Serialize)]
struct Canonical<'a, T: Serialize> {
    engine_version: u32,
    state: &'a T,
}

/// Compact canonical JSON bytes for any serializable record.
pub fn canonical_serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&Canonical {
        engine_version: ENGINE_VERSION,
        state: value,
    })
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = canonical_serialize(value)?;
    Ok(hex_digest(&bytes))
}

/// Lowercase hex SHA-256 of raw bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Ability, CasterRecord};
    use crate::state::new_arcanist;

    #[test]
    fn test_hash_is_deterministic_and_hex() {
        let record = CasterRecord::Arcanist(new_arcanist(7, Ability::Intelligence, 2, 12));
        let h1 = canonical_hash(&record).unwrap();
        let h2 = canonical_hash(&record.clone()).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_changes_with_state() {
        let a = new_arcanist(7, Ability::Intelligence, 2, 12);
        let mut b = a.clone();
        b.afp.current -= 1;
        assert_ne!(canonical_hash(&a).unwrap(), canonical_hash(&b).unwrap());
    }

    #[test]
    fn test_envelope_leads_with_engine_version() {
        let a = new_arcanist(1, Ability::Intelligence, 0, 2);
        let json = String::from_utf8(canonical_serialize(&a).unwrap()).unwrap();
        assert!(json.starts_with(&format!("{{\"engine_version\":{ENGINE_VERSION},\"state\":{{\"level\":1")));
    }
}
