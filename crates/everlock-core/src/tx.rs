use serde::{Deserialize, Serialize};

use crate::types::{Hash28, Timestamp, TxId};
use crate::utxo::{TxOutput, Utxo};
use crate::validator::SpendingValidator;

// ── ValidityInterval ─────────────────────────────────────────────────────────

/// Transaction validity window in ledger time (Unix seconds). A `None` bound
/// leaves that side open. Computed explicitly from chain time and datum
/// fields, never parsed out of display strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityInterval {
    pub not_before: Option<Timestamp>,
    pub not_after: Option<Timestamp>,
}

impl ValidityInterval {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn starting_at(not_before: Timestamp, not_after: Timestamp) -> Self {
        Self {
            not_before: Some(not_before),
            not_after: Some(not_after),
        }
    }
}

// ── Redeemer ─────────────────────────────────────────────────────────────────

/// Action data supplied for one script-guarded input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redeemer {
    pub input_index: u32,
    pub data: Vec<u8>,
}

// ── UnsignedTx ───────────────────────────────────────────────────────────────

/// A balanced, unsigned transaction ready for the confirm → sign → submit
/// sequence. The transaction id is BLAKE3 of the canonical bincode body;
/// witnesses are not part of the body, so the id is stable across signing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTx {
    pub inputs: Vec<Utxo>,
    pub outputs: Vec<TxOutput>,
    pub fee: u64,
    pub validity: ValidityInterval,
    pub required_signers: Vec<Hash28>,
    pub scripts: Vec<SpendingValidator>,
    pub redeemers: Vec<Redeemer>,
}

impl UnsignedTx {
    /// Canonical body bytes covered by the transaction id and signatures.
    pub fn body_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("transaction body serialization is infallible")
    }

    pub fn tx_id(&self) -> TxId {
        TxId::from_body(&self.body_bytes())
    }
}

// ── SignedTx ─────────────────────────────────────────────────────────────────

/// One key witness: serialized public key plus signature over the body bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A signed transaction ready for submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub tx: UnsignedTx,
    pub witnesses: Vec<Witness>,
}

impl SignedTx {
    pub fn tx_id(&self) -> TxId {
        self.tx.tx_id()
    }

    /// Wire form: hex-encoded canonical serialization.
    pub fn to_hex(&self) -> String {
        hex::encode(bincode::serialize(self).expect("transaction serialization is infallible"))
    }
}
