//! everlock-provider
//!
//! The client's external boundaries as async traits (chain queries, the
//! wallet session, and the pre-signature confirmation gate) plus a JSON-RPC
//! indexer client implementing the chain side over HTTP.
//!
//! Every flow re-fetches authoritative UTXO state through these traits
//! rather than trusting a stale local copy; no caching happens here.

pub mod http;

use everlock_core::{
    Address, LockError, ProtocolParameters, SignedTx, Timestamp, TxId, UnsignedTx, Utxo,
};

pub use http::IndexerClient;

// ── Chain query boundary ─────────────────────────────────────────────────────

/// Read-only view of chain state: UTXO sets, ledger time, protocol
/// parameters. The minimum-value calculation is a pure function of the
/// parameters and lives in `everlock_core::params`.
#[allow(async_fn_in_trait)]
pub trait ChainQuery {
    async fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LockError>;

    /// Current ledger time (Unix seconds) at the indexer's tip.
    async fn current_time(&self) -> Result<Timestamp, LockError>;

    async fn protocol_parameters(&self) -> Result<ProtocolParameters, LockError>;
}

// ── Wallet boundary ──────────────────────────────────────────────────────────

/// An enabled wallet session. Key custody and signing internals stay behind
/// this boundary; the engine only ever sees the five operations below.
#[allow(async_fn_in_trait)]
pub trait WalletSession {
    async fn utxos(&self) -> Result<Vec<Utxo>, LockError>;

    async fn change_address(&self) -> Result<Address, LockError>;

    /// Sign the transaction body. A refusal maps to `SigningDeclined`; a
    /// wallet that does not hold a required signer key must refuse rather
    /// than return a partial witness set.
    async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, LockError>;

    /// Submit a signed transaction. Implementations must report a duplicate
    /// submission of an already-accepted transaction id as success, and
    /// classify spent-input rejections as `UtxoConflict`.
    async fn submit(&self, tx: &SignedTx) -> Result<TxId, LockError>;
}

// ── Confirmation boundary ────────────────────────────────────────────────────

/// The explicit user decision point before signing. Declining aborts the
/// flow with no chain effect; this is the only cancellation point. Once
/// submitted, a transaction can only lapse via its validity bound.
#[allow(async_fn_in_trait)]
pub trait ConfirmationGate {
    async fn confirm(&self, tx: &UnsignedTx) -> bool;
}
