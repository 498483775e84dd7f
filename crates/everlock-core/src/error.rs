use thiserror::Error;

/// The single error taxonomy for the Everlock client.
///
/// Every variant carries a short, user-presentable message; raw provider
/// errors are wrapped into the transport section rather than surfaced
/// verbatim. All errors are recovered at the flow boundary: a lock or
/// unlock action either never submits a transaction or submits it as one
/// atomic unit, so there is never partial on-chain state to roll back.
#[derive(Debug, Error)]
pub enum LockError {
    // ── Credentials ──────────────────────────────────────────────────────────
    #[error("address has no stake credential")]
    MissingStakeCredential,

    #[error("address has no payment credential")]
    MissingPaymentCredential,

    #[error("a key credential is required here; got a script credential")]
    UnsupportedCredentialType,

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("invalid {what} hex: {detail}")]
    InvalidHex { what: &'static str, detail: String },

    // ── Asset lookup ─────────────────────────────────────────────────────────
    #[error("asset {unit} not found in wallet")]
    AssetNotFound { unit: String },

    #[error("no locked output holding {unit} at contract address {address}")]
    LockedAssetNotFound { unit: String, address: String },

    // ── Datum codec ──────────────────────────────────────────────────────────
    #[error("unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    #[error("input truncated at offset {0}")]
    Truncated(usize),

    #[error("{0} trailing bytes after a complete value")]
    TrailingBytes(usize),

    #[error("integer does not fit in 128 bits")]
    IntegerOverflow,

    #[error("datum does not match the {kind} lock shape")]
    DatumShape { kind: &'static str },

    // ── Preconditions ────────────────────────────────────────────────────────
    #[error("lock is sealed; no unlock path exists")]
    SealedLock,

    #[error("time-lock not yet reached (unlocks at {unlock_after}, now {now})")]
    TimeNotReached { unlock_after: i64, now: i64 },

    #[error("password does not match the lock commitment")]
    PasswordMismatch,

    // ── Build / balance ──────────────────────────────────────────────────────
    #[error("insufficient funds: need {need} coin, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("balancing did not converge after {0} rounds")]
    BalancingFailed(u32),

    #[error("value arithmetic underflow for unit {0}")]
    ValueUnderflow(String),

    #[error("value arithmetic overflow for unit {0}")]
    ValueOverflow(String),

    // ── Submission ───────────────────────────────────────────────────────────
    #[error("signing declined by the wallet")]
    SigningDeclined,

    #[error("wallet does not hold the required signing key {0}")]
    MissingSigningKey(String),

    #[error("an input was already spent; re-query UTXO state and retry")]
    UtxoConflict,

    #[error("transaction rejected: {0}")]
    Rejected(String),

    // ── Provider transport ───────────────────────────────────────────────────
    #[error("indexer error: {0}")]
    Indexer(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LockError {
    /// Taxonomy class of this error, for UI grouping.
    pub fn class(&self) -> &'static str {
        use LockError::*;
        match self {
            MissingStakeCredential
            | MissingPaymentCredential
            | UnsupportedCredentialType
            | MalformedAddress(_)
            | InvalidHex { .. } => "CredentialError",
            AssetNotFound { .. } | LockedAssetNotFound { .. } => "AssetNotFound",
            UnexpectedByte { .. } | Truncated(_) | TrailingBytes(_) | IntegerOverflow
            | DatumShape { .. } => "DatumCodecError",
            SealedLock | TimeNotReached { .. } | PasswordMismatch => "PreconditionNotMet",
            InsufficientFunds { .. } | BalancingFailed(_) | ValueUnderflow(_)
            | ValueOverflow(_) => "BuildError",
            SigningDeclined | MissingSigningKey(_) | UtxoConflict | Rejected(_) => {
                "SubmissionError"
            }
            Indexer(_) | Serialization(_) => "ProviderError",
        }
    }
}
