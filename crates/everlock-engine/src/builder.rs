use tracing::debug;

use everlock_core::{
    constants::{MAX_BALANCE_ROUNDS, WITNESS_SIZE_ESTIMATE},
    min_output_coin, Address, Hash28, LockError, ProtocolParameters, Redeemer, SpendingValidator,
    TxOutput, UnsignedTx, Utxo, ValidityInterval, Value,
};

use crate::planner::{LockPlan, UnlockPlan};

/// Build the unsigned transaction moving an asset into the contract address:
/// the planned wallet output as primary input, the contract output with its
/// inline datum, fee and change balanced from coin-only wallet outputs.
pub fn build_lock_tx(
    plan: &LockPlan,
    wallet_utxos: &[Utxo],
    change_address: &Address,
    params: &ProtocolParameters,
) -> Result<UnsignedTx, LockError> {
    let output = TxOutput::new(plan.contract_address.clone(), plan.output_value.clone())
        .with_datum(plan.datum.clone());
    balance(
        vec![plan.input.clone()],
        vec![output],
        wallet_utxos,
        change_address,
        params,
        ValidityInterval::unbounded(),
        vec![],
        vec![],
        vec![],
    )
}

/// Build the unsigned transaction reclaiming an asset from the contract
/// address. The wallet output mirrors the consumed contract output's value
/// exactly; the validator rides along verbatim with its redeemer, plus the
/// required signer and validity window the plan mandates.
pub fn build_unlock_tx(
    plan: &UnlockPlan,
    wallet_utxos: &[Utxo],
    change_address: &Address,
    params: &ProtocolParameters,
) -> Result<UnsignedTx, LockError> {
    let output = TxOutput::new(plan.destination.clone(), plan.input.value.clone());
    balance(
        vec![plan.input.clone()],
        vec![output],
        wallet_utxos,
        change_address,
        params,
        plan.validity,
        plan.required_signer.into_iter().collect(),
        vec![plan.validator.clone()],
        vec![Redeemer {
            input_index: 0,
            data: plan.redeemer.clone(),
        }],
    )
}

/// Standard UTXO balancing: keep the primary inputs, pull coin-only wallet
/// outputs (largest first, outpoint order on ties) until the declared
/// outputs and the size-derived fee are covered, and return the remainder
/// to the change address. Change below its own minimum-reserve floor is
/// absorbed into the fee; change carrying assets must clear the floor.
#[allow(clippy::too_many_arguments)]
fn balance(
    primary: Vec<Utxo>,
    outputs: Vec<TxOutput>,
    wallet_utxos: &[Utxo],
    change_address: &Address,
    params: &ProtocolParameters,
    validity: ValidityInterval,
    required_signers: Vec<Hash28>,
    scripts: Vec<SpendingValidator>,
    redeemers: Vec<Redeemer>,
) -> Result<UnsignedTx, LockError> {
    let mut candidates: Vec<&Utxo> = wallet_utxos
        .iter()
        .filter(|u| !primary.iter().any(|p| p.outpoint == u.outpoint))
        .filter(|u| !u.value.has_assets())
        .collect();
    candidates.sort_by(|a, b| {
        b.value
            .coin
            .cmp(&a.value.coin)
            .then(a.outpoint.cmp(&b.outpoint))
    });
    let mut candidates = candidates.into_iter();

    let out_sum = sum_values(outputs.iter().map(|o| &o.value))?;
    let mut inputs = primary;
    // One witness for the spending wallet key plus one per required signer.
    let witness_estimate = WITNESS_SIZE_ESTIMATE * (1 + required_signers.len() as u64);

    for _ in 0..MAX_BALANCE_ROUNDS {
        let total_in = sum_values(inputs.iter().map(|u| &u.value))?;

        // Everything the inputs carry beyond the declared outputs; must pay
        // the fee and flow back as change.
        let residual = match total_in.checked_sub(&out_sum) {
            Ok(v) => v,
            Err(_) => {
                take_candidate(&mut candidates, &mut inputs, &total_in, &out_sum, 0)?;
                continue;
            }
        };

        // Size the fee against a draft that already carries a change output.
        let draft = UnsignedTx {
            inputs: inputs.clone(),
            outputs: {
                let mut all = outputs.clone();
                all.push(TxOutput::new(change_address.clone(), residual.clone()));
                all
            },
            fee: 0,
            validity,
            required_signers: required_signers.clone(),
            scripts: scripts.clone(),
            redeemers: redeemers.clone(),
        };
        let size = draft.body_bytes().len() as u64 + witness_estimate;
        let fee = params.fee_for_size(size);

        if residual.coin < fee {
            take_candidate(&mut candidates, &mut inputs, &total_in, &out_sum, fee)?;
            continue;
        }

        let change = Value {
            coin: residual.coin - fee,
            assets: residual.assets,
        };

        let mut final_outputs = outputs.clone();
        let mut final_fee = fee;
        if change.has_assets() {
            let change_out = TxOutput::new(change_address.clone(), change.clone());
            if change.coin < min_output_coin(params, &change_out) {
                take_candidate(&mut candidates, &mut inputs, &total_in, &out_sum, fee)?;
                continue;
            }
            final_outputs.push(change_out);
        } else if change.coin > 0 {
            let change_out = TxOutput::new(change_address.clone(), change.clone());
            if change.coin < min_output_coin(params, &change_out) {
                // Too small to stand alone as an output.
                final_fee += change.coin;
            } else {
                final_outputs.push(change_out);
            }
        }

        let tx = UnsignedTx {
            inputs,
            outputs: final_outputs,
            fee: final_fee,
            validity,
            required_signers,
            scripts,
            redeemers,
        };
        debug!(tx_id = %tx.tx_id(), fee = tx.fee, inputs = tx.inputs.len(), "balanced");
        return Ok(tx);
    }

    Err(LockError::BalancingFailed(MAX_BALANCE_ROUNDS))
}

/// Pull the next fee candidate into the input set, or report how short the
/// transaction is.
fn take_candidate<'a>(
    candidates: &mut impl Iterator<Item = &'a Utxo>,
    inputs: &mut Vec<Utxo>,
    total_in: &Value,
    out_sum: &Value,
    fee: u64,
) -> Result<(), LockError> {
    match candidates.next() {
        Some(utxo) => {
            inputs.push(utxo.clone());
            Ok(())
        }
        None => Err(LockError::InsufficientFunds {
            need: out_sum.coin + fee,
            have: total_in.coin,
        }),
    }
}

fn sum_values<'a>(values: impl Iterator<Item = &'a Value>) -> Result<Value, LockError> {
    let mut total = Value::default();
    for v in values {
        total = total.checked_add(v)?;
    }
    Ok(total)
}
