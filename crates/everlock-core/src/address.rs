use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LockError;
use crate::types::{Hash28, Network};

// ── Credential ───────────────────────────────────────────────────────────────

/// One of the two independent sub-components of a ledger address. A key
/// credential can countersign a transaction; a script credential is satisfied
/// by attaching and satisfying the validator it hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub enum Credential {
    Key(Hash28),
    Script(Hash28),
}

impl Credential {
    pub fn hash(&self) -> &Hash28 {
        match self {
            Credential::Key(h) | Credential::Script(h) => h,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Credential::Script(_))
    }

    /// The key hash, or an error where a key credential is mandated (an
    /// unlocking transaction must be countersigned by that key).
    pub fn require_key(&self) -> Result<Hash28, LockError> {
        match self {
            Credential::Key(h) => Ok(*h),
            Credential::Script(_) => Err(LockError::UnsupportedCredentialType),
        }
    }
}

// ── Address ──────────────────────────────────────────────────────────────────

/// A ledger address: payment and/or stake credential plus an explicit network
/// tag. The three shapes are a closed union; there is no "other" case.
///
/// Text form is bech32. Payload layout: one header byte followed by the
/// credential hashes in payment-then-stake order.
///
///   bits 7-6  shape      (00 base, 01 enterprise, 10 reward)
///   bit  5    payment credential is a script hash
///   bit  4    stake credential is a script hash
///   bits 3-0  network id
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Address {
    /// Payment plus stake credential.
    Base {
        network: Network,
        payment: Credential,
        stake: Credential,
    },
    /// Payment credential only.
    Enterprise {
        network: Network,
        payment: Credential,
    },
    /// Stake credential only (a reward account address).
    Reward {
        network: Network,
        stake: Credential,
    },
}

const SHAPE_BASE: u8 = 0b00;
const SHAPE_ENTERPRISE: u8 = 0b01;
const SHAPE_REWARD: u8 = 0b10;

impl Address {
    pub fn network(&self) -> Network {
        match self {
            Address::Base { network, .. }
            | Address::Enterprise { network, .. }
            | Address::Reward { network, .. } => *network,
        }
    }

    pub fn payment_credential(&self) -> Option<&Credential> {
        match self {
            Address::Base { payment, .. } | Address::Enterprise { payment, .. } => Some(payment),
            Address::Reward { .. } => None,
        }
    }

    pub fn stake_credential(&self) -> Option<&Credential> {
        match self {
            Address::Base { stake, .. } | Address::Reward { stake, .. } => Some(stake),
            Address::Enterprise { .. } => None,
        }
    }

    /// Extract both credentials. Pure and deterministic; callers decide which
    /// absences are errors.
    pub fn details(&self) -> AddressDetails {
        AddressDetails {
            payment: self.payment_credential().copied(),
            stake: self.stake_credential().copied(),
        }
    }

    fn hrp(&self) -> &'static str {
        match (self, self.network()) {
            (Address::Reward { .. }, Network::Mainnet) => "stake",
            (Address::Reward { .. }, Network::Testnet) => "stake_test",
            (_, Network::Mainnet) => "addr",
            (_, Network::Testnet) => "addr_test",
        }
    }

    fn header(&self) -> u8 {
        let (shape, pay_script, stake_script) = match self {
            Address::Base { payment, stake, .. } => {
                (SHAPE_BASE, payment.is_script(), stake.is_script())
            }
            Address::Enterprise { payment, .. } => (SHAPE_ENTERPRISE, payment.is_script(), false),
            Address::Reward { stake, .. } => (SHAPE_REWARD, false, stake.is_script()),
        };
        shape << 6
            | (pay_script as u8) << 5
            | (stake_script as u8) << 4
            | (self.network().id() & 0x0f)
    }

    pub fn to_bech32(&self) -> String {
        let mut payload = vec![self.header()];
        match self {
            Address::Base { payment, stake, .. } => {
                payload.extend_from_slice(payment.hash().as_bytes());
                payload.extend_from_slice(stake.hash().as_bytes());
            }
            Address::Enterprise { payment, .. } => {
                payload.extend_from_slice(payment.hash().as_bytes());
            }
            Address::Reward { stake, .. } => {
                payload.extend_from_slice(stake.hash().as_bytes());
            }
        }
        bech32::encode(self.hrp(), payload.to_base32(), Variant::Bech32)
            .expect("static hrp is always valid")
    }

    pub fn from_bech32(s: &str) -> Result<Self, LockError> {
        let (hrp, data, variant) =
            bech32::decode(s).map_err(|e| LockError::MalformedAddress(e.to_string()))?;
        if variant != Variant::Bech32 {
            return Err(LockError::MalformedAddress("wrong bech32 variant".into()));
        }
        let bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| LockError::MalformedAddress(e.to_string()))?;
        let (&header, rest) = bytes
            .split_first()
            .ok_or_else(|| LockError::MalformedAddress("empty payload".into()))?;

        let network = match header & 0x0f {
            0 => Network::Testnet,
            1 => Network::Mainnet,
            other => {
                return Err(LockError::MalformedAddress(format!(
                    "unknown network id {other}"
                )))
            }
        };
        let pay_script = header & 0x20 != 0;
        let stake_script = header & 0x10 != 0;

        let credential = |bytes: &[u8], script: bool| {
            let mut arr = [0u8; 28];
            arr.copy_from_slice(bytes);
            let h = Hash28::from_bytes(arr);
            if script {
                Credential::Script(h)
            } else {
                Credential::Key(h)
            }
        };

        let address = match header >> 6 {
            SHAPE_BASE if rest.len() == 56 => Address::Base {
                network,
                payment: credential(&rest[..28], pay_script),
                stake: credential(&rest[28..], stake_script),
            },
            SHAPE_ENTERPRISE if rest.len() == 28 => Address::Enterprise {
                network,
                payment: credential(rest, pay_script),
            },
            SHAPE_REWARD if rest.len() == 28 => Address::Reward {
                network,
                stake: credential(rest, stake_script),
            },
            shape => {
                return Err(LockError::MalformedAddress(format!(
                    "shape {shape:#04b} with {} payload bytes",
                    rest.len()
                )))
            }
        };

        if hrp != address.hrp() {
            return Err(LockError::MalformedAddress(format!(
                "prefix {hrp} does not match address header"
            )));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_bech32();
        write!(f, "Address({}…{})", &text[..12], &text[text.len() - 6..])
    }
}

// ── AddressDetails ───────────────────────────────────────────────────────────

/// Resolved credentials of an address; each side is optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressDetails {
    pub payment: Option<Credential>,
    pub stake: Option<Credential>,
}

impl AddressDetails {
    pub fn require_stake(&self) -> Result<Credential, LockError> {
        self.stake.ok_or(LockError::MissingStakeCredential)
    }

    pub fn require_payment(&self) -> Result<Credential, LockError> {
        self.payment.ok_or(LockError::MissingPaymentCredential)
    }

    /// The payment key hash, for flows that must countersign.
    pub fn require_payment_key(&self) -> Result<Hash28, LockError> {
        self.require_payment()?.require_key()
    }
}
