/// ─── Everlock client constants ──────────────────────────────────────────────
///
/// The client moves exactly one unit of a non-fungible asset per lock or
/// unlock transaction; everything else here drives fee and reserve math.

// ── Minimum output reserve ────────────────────────────────────────────────────

/// Fixed overhead (bytes) charged on top of an output's serialized size when
/// computing its minimum base-unit reserve.
pub const OUTPUT_OVERHEAD_BYTES: u64 = 160;

// ── Default protocol parameters ───────────────────────────────────────────────
// Fallbacks matching the network defaults; the indexer's live values win.

pub const DEFAULT_COINS_PER_UTXO_BYTE: u64 = 4_310;

pub const DEFAULT_MIN_FEE_COEFFICIENT: u64 = 44;

pub const DEFAULT_MIN_FEE_CONSTANT: u64 = 155_381;

// ── Transaction building ──────────────────────────────────────────────────────

/// Estimated wire size of one witness (public key + signature + framing).
/// Fees are computed against the signed size before witnesses exist.
pub const WITNESS_SIZE_ESTIMATE: u64 = 102;

/// Default time-to-live (seconds) for transactions that carry a bounded
/// validity window. A never-included transaction expires at the ledger level.
pub const TX_TTL_SECS: i64 = 7_200;

/// Upper bound on fee/change fixpoint iterations during balancing.
pub const MAX_BALANCE_ROUNDS: u32 = 8;
