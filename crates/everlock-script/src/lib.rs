//! everlock-script
//!
//! The validator side of the locking protocol: the closed set of lock
//! policies, the configuration table binding each policy to its compiled
//! validator, and contract-address derivation from a validator script hash
//! and an owner's stake credential.

pub mod config;
pub mod derive;

pub use config::{LockConfig, LockKind, ValidatorTable};
pub use derive::{contract_address_for_owner, derive_contract_address};
