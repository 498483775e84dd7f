//! everlock-core
//!
//! Shared data model for the Everlock client: hashes, addresses and
//! credentials, asset values, UTXOs, transactions, validators, protocol
//! parameters, and the error taxonomy. Pure data and arithmetic; no I/O.

pub mod address;
pub mod constants;
pub mod error;
pub mod params;
pub mod tx;
pub mod types;
pub mod utxo;
pub mod validator;
pub mod value;

pub use address::{Address, AddressDetails, Credential};
pub use error::LockError;
pub use params::{min_output_coin, ProtocolParameters};
pub use tx::{Redeemer, SignedTx, UnsignedTx, ValidityInterval, Witness};
pub use types::{Digest32, Hash28, Network, Timestamp, TxId};
pub use utxo::{OutPoint, TxOutput, Utxo};
pub use validator::{ScriptKind, SpendingValidator};
pub use value::{AssetId, AssetName, PolicyId, Value};
