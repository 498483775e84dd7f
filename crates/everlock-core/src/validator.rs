use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Hash28;

// ── ScriptKind ───────────────────────────────────────────────────────────────

/// Ledger script language tag. The client never evaluates script bytes; the
/// tag only participates in hashing and travels verbatim with the script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    V1,
    V2,
    V3,
}

impl ScriptKind {
    fn tag(&self) -> u8 {
        match self {
            ScriptKind::V1 => 1,
            ScriptKind::V2 => 2,
            ScriptKind::V3 => 3,
        }
    }
}

// ── SpendingValidator ────────────────────────────────────────────────────────

/// An opaque, pre-compiled on-chain predicate. The client hashes it for
/// address derivation and attaches it verbatim to spending transactions;
/// it never interprets the bytes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingValidator {
    pub kind: ScriptKind,
    #[serde(with = "hex_script")]
    pub script: Vec<u8>,
}

impl SpendingValidator {
    pub fn new(kind: ScriptKind, script: Vec<u8>) -> Self {
        Self { kind, script }
    }

    /// Validator identity: hash over the language tag byte followed by the
    /// script bytes, so the same bytes under two languages never collide.
    pub fn script_hash(&self) -> Hash28 {
        let mut preimage = Vec::with_capacity(1 + self.script.len());
        preimage.push(self.kind.tag());
        preimage.extend_from_slice(&self.script);
        Hash28::digest(&preimage)
    }
}

impl fmt::Debug for SpendingValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpendingValidator({:?}, {} bytes, hash {})",
            self.kind,
            self.script.len(),
            self.script_hash()
        )
    }
}

/// Scripts serialize as hex strings so validator configuration files stay
/// readable and diffable.
mod hex_script {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        hex::decode(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_hash_is_deterministic() {
        let v = SpendingValidator::new(ScriptKind::V3, vec![0x58, 0x85, 0x01]);
        assert_eq!(v.script_hash(), v.script_hash());
    }

    #[test]
    fn script_hash_separates_languages() {
        let bytes = vec![0xab; 16];
        let v1 = SpendingValidator::new(ScriptKind::V1, bytes.clone());
        let v3 = SpendingValidator::new(ScriptKind::V3, bytes);
        assert_ne!(v1.script_hash(), v3.script_hash());
    }

    #[test]
    fn config_form_uses_hex() {
        let v = SpendingValidator::new(ScriptKind::V3, vec![0xde, 0xad]);
        let json = serde_json::to_string(&v).unwrap();
        assert!(json.contains("\"dead\""));
        let back: SpendingValidator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
