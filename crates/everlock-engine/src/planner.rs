use tracing::debug;

use everlock_core::{
    constants::TX_TTL_SECS, min_output_coin, Address, AssetId, Digest32, Hash28, LockError,
    ProtocolParameters, SpendingValidator, Timestamp, TxOutput, Utxo, ValidityInterval, Value,
};
use everlock_script::{contract_address_for_owner, LockConfig, LockKind};

use crate::datum::{LockDatum, UnlockRedeemer};

// ── Intents ──────────────────────────────────────────────────────────────────

/// What the caller wants to lock and under which policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockIntent {
    /// One-way seal, optionally carrying an owner note.
    Permanent { note: Option<Vec<u8>> },
    /// Locked for `lock_duration` seconds from the current ledger time.
    Timed { lock_duration: i64 },
    /// Locked behind a password commitment.
    Password { password: String },
}

impl LockIntent {
    pub fn kind(&self) -> LockKind {
        match self {
            LockIntent::Permanent { .. } => LockKind::Permanent,
            LockIntent::Timed { .. } => LockKind::Timed,
            LockIntent::Password { .. } => LockKind::Password,
        }
    }
}

/// Which policy the caller wants to unlock from, with its variant argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnlockIntent {
    /// Refused during preparation: sealed outputs have no unlock path.
    Permanent,
    Timed,
    Password { password: String },
}

impl UnlockIntent {
    pub fn kind(&self) -> LockKind {
        match self {
            UnlockIntent::Permanent => LockKind::Permanent,
            UnlockIntent::Timed => LockKind::Timed,
            UnlockIntent::Password { .. } => LockKind::Password,
        }
    }
}

// ── LockContext ──────────────────────────────────────────────────────────────

/// Resolved credentials and derived contract address for one action. Built
/// by the pure preparation step, before any network call; an owner address
/// missing a credential fails here.
#[derive(Clone, Debug)]
pub struct LockContext {
    pub kind: LockKind,
    pub contract_address: Address,
    /// The owner's payment key hash; present whenever the policy writes it
    /// into the datum or the unlock must be countersigned.
    pub owner_key: Option<Hash28>,
    pub validator: SpendingValidator,
}

/// Pre-flight for a lock action: derive the contract address from the
/// owner's stake credential, and resolve the owner key hash for the
/// policies whose datum records it.
pub fn prepare_lock(
    cfg: &LockConfig,
    kind: LockKind,
    owner: &Address,
) -> Result<LockContext, LockError> {
    let validator = cfg.validators.for_kind(kind).clone();
    let contract_address = contract_address_for_owner(&validator, owner, cfg.network)?;
    let owner_key = match kind {
        LockKind::Permanent => None,
        LockKind::Timed | LockKind::Password => Some(owner.details().require_payment_key()?),
    };
    Ok(LockContext {
        kind,
        contract_address,
        owner_key,
        validator,
    })
}

/// Pre-flight for an unlock action. Refuses the permanent policy outright
/// (no redeemer exists for a sealed output) and requires a key payment
/// credential on the acting address, since the unlocking transaction must
/// be countersigned by a key the wallet holds.
pub fn prepare_unlock(
    cfg: &LockConfig,
    kind: LockKind,
    owner: &Address,
) -> Result<LockContext, LockError> {
    if kind == LockKind::Permanent {
        return Err(LockError::SealedLock);
    }
    let validator = cfg.validators.for_kind(kind).clone();
    let contract_address = contract_address_for_owner(&validator, owner, cfg.network)?;
    let owner_key = Some(owner.details().require_payment_key()?);
    Ok(LockContext {
        kind,
        contract_address,
        owner_key,
        validator,
    })
}

// ── Lock planning ────────────────────────────────────────────────────────────

/// A fully planned lock action: where the asset goes, under which datum,
/// consuming which wallet output, carrying which value.
#[derive(Clone, Debug)]
pub struct LockPlan {
    pub contract_address: Address,
    pub datum: Vec<u8>,
    pub input: Utxo,
    pub output_value: Value,
}

/// Plan a lock action against a pre-fetched wallet UTXO set.
///
/// Locates the single wallet output carrying the asset at quantity one;
/// where several qualify, which a true non-fungible asset should preclude,
/// the first in outpoint order is chosen, deterministically. The base-unit
/// reserve on the contract output is fixed by the minimum-value rule for
/// its final size, datum included.
pub fn plan_lock(
    ctx: &LockContext,
    intent: &LockIntent,
    asset: &AssetId,
    wallet_utxos: &[Utxo],
    params: &ProtocolParameters,
    now: Timestamp,
) -> Result<LockPlan, LockError> {
    debug_assert_eq!(ctx.kind, intent.kind());

    let input = find_asset_utxo(wallet_utxos, asset).ok_or_else(|| LockError::AssetNotFound {
        unit: asset.unit(),
    })?;

    let datum = match intent {
        LockIntent::Permanent { note } => match note {
            Some(note) => LockDatum::Note { note: note.clone() },
            None => LockDatum::Sealed,
        },
        LockIntent::Timed { lock_duration } => LockDatum::TimeLock {
            unlock_after: now + lock_duration,
            owner: ctx.owner_key.ok_or(LockError::MissingPaymentCredential)?,
        },
        LockIntent::Password { password } => LockDatum::PasswordLock {
            secret_hash: Digest32::commit(password.as_bytes()),
            owner: ctx.owner_key.ok_or(LockError::MissingPaymentCredential)?,
        },
    };
    let datum = datum.encode();

    // Provisional output, then fix the reserve at the protocol floor.
    let mut output_value = Value::from_coin(0).with_asset(asset.clone(), 1);
    let candidate = TxOutput::new(ctx.contract_address.clone(), output_value.clone())
        .with_datum(datum.clone());
    output_value.coin = min_output_coin(params, &candidate);

    debug!(
        contract = %ctx.contract_address,
        input = %input.outpoint,
        reserve = output_value.coin,
        "lock planned"
    );

    Ok(LockPlan {
        contract_address: ctx.contract_address.clone(),
        datum,
        input,
        output_value,
    })
}

// ── Unlock planning ──────────────────────────────────────────────────────────

/// A fully planned unlock action: the contract output to consume, the
/// redeemer satisfying its validator, and the constraints the transaction
/// must carry.
#[derive(Clone, Debug)]
pub struct UnlockPlan {
    pub input: Utxo,
    pub datum: LockDatum,
    pub redeemer: Vec<u8>,
    pub required_signer: Option<Hash28>,
    pub validity: ValidityInterval,
    pub destination: Address,
    pub validator: SpendingValidator,
}

/// Plan an unlock against the contract address's pre-fetched UTXO set.
///
/// The variant precondition is checked here as a fail-fast only; ledger
/// validation of the on-chain predicate stays authoritative. For the timed
/// policy the transaction's validity window opens at the current time, which
/// the precondition has already placed at or past `unlock_after`.
pub fn plan_unlock(
    ctx: &LockContext,
    intent: &UnlockIntent,
    asset: &AssetId,
    contract_utxos: &[Utxo],
    destination: Address,
    now: Timestamp,
) -> Result<UnlockPlan, LockError> {
    debug_assert_eq!(ctx.kind, intent.kind());
    if matches!(intent, UnlockIntent::Permanent) {
        return Err(LockError::SealedLock);
    }

    let input =
        find_asset_utxo(contract_utxos, asset).ok_or_else(|| LockError::LockedAssetNotFound {
            unit: asset.unit(),
            address: ctx.contract_address.to_bech32(),
        })?;

    let datum_bytes = input.datum.as_ref().ok_or(LockError::DatumShape {
        kind: ctx.kind.label(),
    })?;
    let datum = LockDatum::decode_for(ctx.kind, datum_bytes)?;

    let (redeemer, required_signer, validity) = match (intent, &datum) {
        (UnlockIntent::Timed, LockDatum::TimeLock { unlock_after, owner }) => {
            if now < *unlock_after {
                return Err(LockError::TimeNotReached {
                    unlock_after: *unlock_after,
                    now,
                });
            }
            (
                UnlockRedeemer::Void.encode(),
                Some(*owner),
                ValidityInterval::starting_at(now, now + TX_TTL_SECS),
            )
        }
        (UnlockIntent::Password { password }, LockDatum::PasswordLock { secret_hash, .. }) => {
            if Digest32::commit(password.as_bytes()) != *secret_hash {
                return Err(LockError::PasswordMismatch);
            }
            (
                UnlockRedeemer::Password(password.as_bytes().to_vec()).encode(),
                None,
                ValidityInterval::unbounded(),
            )
        }
        _ => {
            return Err(LockError::DatumShape {
                kind: ctx.kind.label(),
            })
        }
    };

    debug!(input = %input.outpoint, "unlock planned");

    Ok(UnlockPlan {
        input,
        datum,
        redeemer,
        required_signer,
        validity,
        destination,
        validator: ctx.validator.clone(),
    })
}

/// The first output in deterministic outpoint order holding exactly one
/// unit of `asset`.
fn find_asset_utxo(utxos: &[Utxo], asset: &AssetId) -> Option<Utxo> {
    utxos
        .iter()
        .filter(|u| u.holds_asset(asset, 1))
        .min_by_key(|u| u.outpoint)
        .cloned()
}
