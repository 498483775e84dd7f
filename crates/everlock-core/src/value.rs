use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::LockError;
use crate::types::Hash28;

// ── PolicyId ─────────────────────────────────────────────────────────────────

/// Minting-policy script hash identifying an asset class.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PolicyId(pub Hash28);

impl PolicyId {
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub fn from_hex(s: &str) -> Result<Self, LockError> {
        Ok(Self(Hash28::from_hex(s)?))
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyId({}…)", &self.to_hex()[..12])
    }
}

// ── AssetName ────────────────────────────────────────────────────────────────

/// Raw asset name bytes. Displayed in hex, matching the wire form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetName(pub Vec<u8>);

impl AssetName {
    /// Name from human-readable text, e.g. "05PROPHE7".
    pub fn from_text(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, LockError> {
        let bytes = hex::decode(s).map_err(|e| LockError::InvalidHex {
            what: "asset name",
            detail: e.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({})", self.to_hex())
    }
}

// ── AssetId ──────────────────────────────────────────────────────────────────

/// Full asset identity: minting policy hash plus name. The textual "unit"
/// form is the hex concatenation `policy_id || name`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId {
    pub policy_id: PolicyId,
    pub name: AssetName,
}

impl AssetId {
    pub fn new(policy_id: PolicyId, name: AssetName) -> Self {
        Self { policy_id, name }
    }

    pub fn unit(&self) -> String {
        format!("{}{}", self.policy_id.to_hex(), self.name.to_hex())
    }

    /// Parse a unit string: first 56 hex chars are the policy id, the rest
    /// the asset name.
    pub fn from_unit(s: &str) -> Result<Self, LockError> {
        if s.len() < 56 {
            return Err(LockError::InvalidHex {
                what: "asset unit",
                detail: format!("unit shorter than a policy id: {} chars", s.len()),
            });
        }
        let (policy, name) = s.split_at(56);
        Ok(Self {
            policy_id: PolicyId::from_hex(policy)?,
            name: AssetName::from_hex(name)?,
        })
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unit())
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetId({}…)", &self.unit()[..16])
    }
}

// ── Value ────────────────────────────────────────────────────────────────────

/// A transaction output value: the base-unit coin reserve plus native asset
/// quantities. Quantities are unsigned, so a negative amount is
/// unrepresentable; subtraction that would go negative is an error.
///
/// The asset map is ordered, which gives every iteration over a value a
/// deterministic order.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub coin: u64,
    pub assets: BTreeMap<AssetId, u64>,
}

impl Value {
    pub fn from_coin(coin: u64) -> Self {
        Self {
            coin,
            assets: BTreeMap::new(),
        }
    }

    /// Builder-style: add `quantity` of `asset` to this value.
    pub fn with_asset(mut self, asset: AssetId, quantity: u64) -> Self {
        if quantity > 0 {
            *self.assets.entry(asset).or_insert(0) += quantity;
        }
        self
    }

    pub fn asset_quantity(&self, asset: &AssetId) -> u64 {
        self.assets.get(asset).copied().unwrap_or(0)
    }

    /// True when this value carries no coin and no assets.
    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.assets.is_empty()
    }

    /// True when this value carries any native asset at all.
    pub fn has_assets(&self) -> bool {
        !self.assets.is_empty()
    }

    pub fn checked_add(&self, other: &Value) -> Result<Value, LockError> {
        let coin = self
            .coin
            .checked_add(other.coin)
            .ok_or_else(|| LockError::ValueOverflow("coin".into()))?;
        let mut assets = self.assets.clone();
        for (id, qty) in &other.assets {
            let entry = assets.entry(id.clone()).or_insert(0);
            *entry = entry
                .checked_add(*qty)
                .ok_or_else(|| LockError::ValueOverflow(id.unit()))?;
        }
        Ok(Value { coin, assets })
    }

    /// Subtract `other` from `self`. Zeroed asset entries are pruned so two
    /// values with the same content always compare equal.
    pub fn checked_sub(&self, other: &Value) -> Result<Value, LockError> {
        let coin = self
            .coin
            .checked_sub(other.coin)
            .ok_or_else(|| LockError::ValueUnderflow("coin".into()))?;
        let mut assets = self.assets.clone();
        for (id, qty) in &other.assets {
            let have = assets.get_mut(id).ok_or_else(|| {
                LockError::ValueUnderflow(id.unit())
            })?;
            *have = have
                .checked_sub(*qty)
                .ok_or_else(|| LockError::ValueUnderflow(id.unit()))?;
            if *have == 0 {
                assets.remove(id);
            }
        }
        Ok(Value { coin, assets })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({} coin, {} assets)", self.coin, self.assets.len())
    }
}
