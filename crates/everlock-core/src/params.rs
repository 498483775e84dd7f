use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COINS_PER_UTXO_BYTE, DEFAULT_MIN_FEE_COEFFICIENT, DEFAULT_MIN_FEE_CONSTANT,
    OUTPUT_OVERHEAD_BYTES,
};
use crate::utxo::TxOutput;

/// Ledger protocol parameters driving fee and minimum-reserve math. Fetched
/// live from the indexer; the defaults mirror current network values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    pub coins_per_utxo_byte: u64,
    pub min_fee_coefficient: u64,
    pub min_fee_constant: u64,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            coins_per_utxo_byte: DEFAULT_COINS_PER_UTXO_BYTE,
            min_fee_coefficient: DEFAULT_MIN_FEE_COEFFICIENT,
            min_fee_constant: DEFAULT_MIN_FEE_CONSTANT,
        }
    }
}

impl ProtocolParameters {
    /// Linear fee for a transaction of `size` bytes.
    pub fn fee_for_size(&self, size: u64) -> u64 {
        self.min_fee_constant + self.min_fee_coefficient * size
    }
}

/// The protocol-mandated minimum base-unit reserve for `output`: a function
/// of its serialized size and the per-byte coin price. Integer quantities
/// serialize at fixed width, so the result does not depend on the coin
/// amount already set on the output.
pub fn min_output_coin(params: &ProtocolParameters, output: &TxOutput) -> u64 {
    let size =
        bincode::serialized_size(output).expect("output serialization is infallible");
    (OUTPUT_OVERHEAD_BYTES + size) * params.coins_per_utxo_byte
}
