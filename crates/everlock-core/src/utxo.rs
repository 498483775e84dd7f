use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::types::TxId;
use crate::value::{AssetId, Value};

// ── OutPoint ─────────────────────────────────────────────────────────────────

/// Reference to one transaction output. Total ordering makes "the first
/// match" well defined wherever several outputs qualify.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub tx_id: TxId,
    pub index: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_id, self.index)
    }
}

impl fmt::Debug for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPoint({}…#{})", &self.tx_id.to_hex()[..12], self.index)
    }
}

// ── Utxo ─────────────────────────────────────────────────────────────────────

/// An unspent transaction output as observed from the chain. Immutable once
/// observed; consumed wholesale by exactly one later transaction, never
/// partially.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub outpoint: OutPoint,
    pub address: Address,
    pub value: Value,
    /// Inline datum bytes, present on contract-address outputs.
    pub datum: Option<Vec<u8>>,
}

impl Utxo {
    /// True when this output carries exactly `quantity` of `asset`.
    pub fn holds_asset(&self, asset: &AssetId, quantity: u64) -> bool {
        self.value.asset_quantity(asset) == quantity
    }
}

// ── TxOutput ─────────────────────────────────────────────────────────────────

/// An output under construction: where the value goes and, for contract
/// outputs, the inline datum the validator will inspect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: Address,
    pub value: Value,
    pub datum: Option<Vec<u8>>,
}

impl TxOutput {
    pub fn new(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
        }
    }

    pub fn with_datum(mut self, datum: Vec<u8>) -> Self {
        self.datum = Some(datum);
        self
    }
}
