use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;

use crate::error::LockError;

/// Unix timestamp (seconds, UTC). Ledger time as reported by the indexer tip.
pub type Timestamp = i64;

// ── Network ──────────────────────────────────────────────────────────────────

/// The ledger network an address or transaction belongs to.
///
/// Always an explicit parameter of address derivation, never inferred from
/// ambient state, so a validator + stake credential pair can never silently
/// produce a cross-network address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Network id carried in the address header nibble.
    pub fn id(&self) -> u8 {
        match self {
            Network::Testnet => 0,
            Network::Mainnet => 1,
        }
    }
}

// ── Hash28 ───────────────────────────────────────────────────────────────────

/// 28-byte credential / script hash: BLAKE3 extended output truncated to 28
/// bytes. Used for payment keys, stake keys, and validator script hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hash28(pub [u8; 28]);

impl Hash28 {
    /// Hash arbitrary bytes down to a 28-byte identifier.
    pub fn digest(data: &[u8]) -> Self {
        let mut out = [0u8; 28];
        blake3::Hasher::new()
            .update(data)
            .finalize_xof()
            .fill(&mut out);
        Self(out)
    }

    pub fn from_bytes(b: [u8; 28]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 28] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, LockError> {
        let bytes = hex::decode(s).map_err(|e| LockError::InvalidHex {
            what: "hash",
            detail: e.to_string(),
        })?;
        if bytes.len() != 28 {
            return Err(LockError::InvalidHex {
                what: "hash",
                detail: format!("expected 28 bytes, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 28];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for Hash28 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash28 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash28({}…)", &self.to_hex()[..12])
    }
}

// ── Digest32 ─────────────────────────────────────────────────────────────────

/// 32-byte SHA3-256 commitment digest. Password locks store one of these;
/// the protocol never sees the preimage until unlock.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest32(pub [u8; 32]);

impl Digest32 {
    /// Commit to arbitrary bytes.
    pub fn commit(data: &[u8]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest32({}…)", &self.to_hex()[..12])
    }
}

// ── TxId ─────────────────────────────────────────────────────────────────────

/// 32-byte transaction identifier: BLAKE3 of the canonical serialized tx body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxId(pub [u8; 32]);

impl TxId {
    pub fn from_body(body_bytes: &[u8]) -> Self {
        Self(*blake3::hash(body_bytes).as_bytes())
    }

    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, LockError> {
        let bytes = hex::decode(s).map_err(|e| LockError::InvalidHex {
            what: "transaction id",
            detail: e.to_string(),
        })?;
        if bytes.len() != 32 {
            return Err(LockError::InvalidHex {
                what: "transaction id",
                detail: format!("expected 32 bytes, got {}", bytes.len()),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}…)", &self.to_hex()[..16])
    }
}
