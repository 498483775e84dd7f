use tracing::{info, warn};

use everlock_core::{Address, AssetId, LockError};
use everlock_provider::{ChainQuery, ConfirmationGate, WalletSession};
use everlock_script::LockConfig;

use crate::builder::{build_lock_tx, build_unlock_tx};
use crate::planner::{plan_lock, plan_unlock, prepare_lock, prepare_unlock, LockIntent, UnlockIntent};
use crate::submit::{confirm_sign_submit, Outcome};

/// One lock action, end to end: resolve credentials and derive the contract
/// address (pure; a missing credential fails before any network call), then
/// fetch chain state, plan, build, and run the confirm → sign → submit
/// sequence. Every error is recovered here and returned classified; a failed
/// flow leaves no partial on-chain state.
pub async fn lock_asset<C, W, G>(
    cfg: &LockConfig,
    chain: &C,
    wallet: &W,
    gate: &G,
    owner: &Address,
    asset: &AssetId,
    intent: LockIntent,
) -> Result<Outcome, LockError>
where
    C: ChainQuery,
    W: WalletSession,
    G: ConfirmationGate,
{
    let ctx = prepare_lock(cfg, intent.kind(), owner)?;
    info!(kind = ctx.kind.label(), asset = %asset, contract = %ctx.contract_address, "locking");

    let params = chain.protocol_parameters().await?;
    let now = chain.current_time().await?;
    let wallet_utxos = wallet.utxos().await?;

    let plan = plan_lock(&ctx, &intent, asset, &wallet_utxos, &params, now)?;
    let change = wallet.change_address().await?;
    let tx = build_lock_tx(&plan, &wallet_utxos, &change, &params)?;
    info!(tx_id = %tx.tx_id(), fee = tx.fee, "lock transaction built");

    confirm_sign_submit(wallet, gate, tx).await.map_err(|e| {
        warn!(error = %e, "lock failed");
        e
    })
}

/// One unlock action, end to end. The permanent policy is refused in the
/// pure preparation step; the variant precondition is checked client-side
/// before a doomed transaction gets built, and the ledger remains the
/// authority either way.
pub async fn unlock_asset<C, W, G>(
    cfg: &LockConfig,
    chain: &C,
    wallet: &W,
    gate: &G,
    owner: &Address,
    asset: &AssetId,
    intent: UnlockIntent,
) -> Result<Outcome, LockError>
where
    C: ChainQuery,
    W: WalletSession,
    G: ConfirmationGate,
{
    let ctx = prepare_unlock(cfg, intent.kind(), owner)?;
    info!(kind = ctx.kind.label(), asset = %asset, contract = %ctx.contract_address, "unlocking");

    let params = chain.protocol_parameters().await?;
    let now = chain.current_time().await?;
    let contract_utxos = chain.utxos_at(&ctx.contract_address).await?;
    let destination = wallet.change_address().await?;

    let plan = plan_unlock(&ctx, &intent, asset, &contract_utxos, destination, now)?;
    let wallet_utxos = wallet.utxos().await?;
    let tx = build_unlock_tx(&plan, &wallet_utxos, &plan.destination, &params)?;
    info!(tx_id = %tx.tx_id(), fee = tx.fee, "unlock transaction built");

    confirm_sign_submit(wallet, gate, tx).await.map_err(|e| {
        warn!(error = %e, "unlock failed");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::LockDatum;
    use everlock_core::{
        AssetName, Credential, Digest32, Hash28, Network, OutPoint, PolicyId,
        ProtocolParameters, ScriptKind, SignedTx, SpendingValidator, Timestamp, TxId, TxOutput,
        UnsignedTx, Utxo, Value, Witness,
    };
    use everlock_script::{LockKind, ValidatorTable};
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    // ── Test doubles ─────────────────────────────────────────────────────────

    struct MockChain {
        now: Timestamp,
        utxos: BTreeMap<String, Vec<Utxo>>,
        calls: Mutex<u32>,
    }

    impl MockChain {
        fn new(now: Timestamp) -> Self {
            Self {
                now,
                utxos: BTreeMap::new(),
                calls: Mutex::new(0),
            }
        }

        fn with_utxos(mut self, address: &Address, utxos: Vec<Utxo>) -> Self {
            self.utxos.insert(address.to_bech32(), utxos);
            self
        }

        fn call_count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl ChainQuery for MockChain {
        async fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LockError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self
                .utxos
                .get(&address.to_bech32())
                .cloned()
                .unwrap_or_default())
        }

        async fn current_time(&self) -> Result<Timestamp, LockError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.now)
        }

        async fn protocol_parameters(&self) -> Result<ProtocolParameters, LockError> {
            *self.calls.lock().unwrap() += 1;
            Ok(ProtocolParameters::default())
        }
    }

    struct MockWallet {
        address: Address,
        utxos: Vec<Utxo>,
        submitted: Mutex<Vec<SignedTx>>,
        submit_error: Option<fn() -> LockError>,
    }

    impl MockWallet {
        fn new(address: Address, utxos: Vec<Utxo>) -> Self {
            Self {
                address,
                utxos,
                submitted: Mutex::new(vec![]),
                submit_error: None,
            }
        }

        fn last_submitted(&self) -> SignedTx {
            self.submitted.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl WalletSession for MockWallet {
        async fn utxos(&self) -> Result<Vec<Utxo>, LockError> {
            Ok(self.utxos.clone())
        }

        async fn change_address(&self) -> Result<Address, LockError> {
            Ok(self.address.clone())
        }

        async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, LockError> {
            Ok(SignedTx {
                tx: tx.clone(),
                witnesses: vec![Witness {
                    public_key: vec![2; 33],
                    signature: vec![7; 64],
                }],
            })
        }

        async fn submit(&self, tx: &SignedTx) -> Result<TxId, LockError> {
            if let Some(make) = self.submit_error {
                return Err(make());
            }
            self.submitted.lock().unwrap().push(tx.clone());
            Ok(tx.tx_id())
        }
    }

    struct Gate(bool);

    impl ConfirmationGate for Gate {
        async fn confirm(&self, _tx: &UnsignedTx) -> bool {
            self.0
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────────────

    fn config() -> LockConfig {
        LockConfig {
            network: Network::Testnet,
            validators: ValidatorTable {
                permanent: SpendingValidator::new(ScriptKind::V3, vec![1; 16]),
                timed: SpendingValidator::new(ScriptKind::V3, vec![2; 16]),
                password: SpendingValidator::new(ScriptKind::V3, vec![3; 16]),
            },
        }
    }

    fn owner() -> Address {
        Address::Base {
            network: Network::Testnet,
            payment: Credential::Key(Hash28::digest(b"owner-pay")),
            stake: Credential::Key(Hash28::digest(b"owner-stake")),
        }
    }

    fn asset() -> AssetId {
        AssetId::new(
            PolicyId(Hash28::digest(b"policy")),
            AssetName::from_text("05PROPHE7"),
        )
    }

    fn wallet_utxos() -> Vec<Utxo> {
        vec![
            Utxo {
                outpoint: OutPoint {
                    tx_id: TxId::from_body(b"nft"),
                    index: 0,
                },
                address: owner(),
                value: Value::from_coin(1_200_000).with_asset(asset(), 1),
                datum: None,
            },
            Utxo {
                outpoint: OutPoint {
                    tx_id: TxId::from_body(b"fees"),
                    index: 1,
                },
                address: owner(),
                value: Value::from_coin(1_000_000_000),
                datum: None,
            },
        ]
    }

    /// The contract output a submitted lock transaction creates, replayed as
    /// the contract address's UTXO set for the follow-up unlock.
    fn replay_lock_output(signed: &SignedTx) -> Utxo {
        let output: &TxOutput = &signed.tx.outputs[0];
        Utxo {
            outpoint: OutPoint {
                tx_id: signed.tx_id(),
                index: 0,
            },
            address: output.address.clone(),
            value: output.value.clone(),
            datum: output.datum.clone(),
        }
    }

    // ── Scenario A: permanent lock ───────────────────────────────────────────

    #[tokio::test]
    async fn permanent_lock_seals_the_asset_at_the_contract_address() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());

        let outcome = lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Permanent { note: None },
        )
        .await
        .unwrap();

        let signed = wallet.last_submitted();
        assert_eq!(outcome, Outcome::Submitted(signed.tx_id()));

        // The wallet UTXO holding the asset was consumed…
        assert!(signed
            .tx
            .inputs
            .iter()
            .any(|u| u.outpoint.tx_id == TxId::from_body(b"nft")));
        // …and reappears, quantity one, under the derived contract address
        // with a minimum reserve and the sealed datum.
        let contract = &signed.tx.outputs[0];
        let ctx = prepare_lock(&cfg, LockKind::Permanent, &owner()).unwrap();
        assert_eq!(contract.address, ctx.contract_address);
        assert_eq!(contract.value.asset_quantity(&asset()), 1);
        assert!(contract.value.coin > 0);
        assert_eq!(contract.datum.as_deref(), Some(LockDatum::Sealed.encode().as_slice()));
    }

    #[tokio::test]
    async fn permanent_lock_with_note_writes_the_note_datum() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());

        lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Permanent {
                note: Some(b"kept 4 ever".to_vec()),
            },
        )
        .await
        .unwrap();

        let signed = wallet.last_submitted();
        let datum_bytes = signed.tx.outputs[0].datum.clone().unwrap();
        assert_eq!(
            LockDatum::decode_for(LockKind::Permanent, &datum_bytes).unwrap(),
            LockDatum::Note {
                note: b"kept 4 ever".to_vec()
            }
        );
    }

    #[tokio::test]
    async fn permanent_unlock_is_refused() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let err = unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Permanent,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::SealedLock));
        assert_eq!(chain.call_count(), 0, "refusal must precede network calls");
    }

    // ── Scenario B: time lock ────────────────────────────────────────────────

    #[tokio::test]
    async fn time_lock_round_trip_honours_the_deadline() {
        let cfg = config();
        let t = 1_750_000_000;

        // Lock for an hour at time T.
        let chain = MockChain::new(t);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Timed {
                lock_duration: 3_600,
            },
        )
        .await
        .unwrap();

        let signed = wallet.last_submitted();
        let datum_bytes = signed.tx.outputs[0].datum.clone().unwrap();
        let datum = LockDatum::decode_for(LockKind::Timed, &datum_bytes).unwrap();
        assert_eq!(
            datum,
            LockDatum::TimeLock {
                unlock_after: t + 3_600,
                owner: owner().details().require_payment_key().unwrap(),
            }
        );

        let ctx = prepare_unlock(&cfg, LockKind::Timed, &owner()).unwrap();
        let locked = replay_lock_output(&signed);

        // Too early: T + 1000.
        let chain = MockChain::new(t + 1_000)
            .with_utxos(&ctx.contract_address, vec![locked.clone()]);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let err = unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Timed,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            LockError::TimeNotReached { unlock_after, now }
                if unlock_after == t + 3_600 && now == t + 1_000
        ));

        // Late enough: T + 4000.
        let chain = MockChain::new(t + 4_000)
            .with_utxos(&ctx.contract_address, vec![locked]);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let outcome = unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Timed,
        )
        .await
        .unwrap();

        let signed = wallet.last_submitted();
        assert_eq!(outcome, Outcome::Submitted(signed.tx_id()));
        // The asset came home at its original quantity…
        assert_eq!(signed.tx.outputs[0].value.asset_quantity(&asset()), 1);
        assert_eq!(signed.tx.outputs[0].address, owner());
        // …countersigned by the datum owner, inside a window opening at or
        // past the deadline.
        let key = owner().details().require_payment_key().unwrap();
        assert_eq!(signed.tx.required_signers, vec![key]);
        assert!(signed.tx.validity.not_before.unwrap() >= t + 3_600);
    }

    // ── Scenario C: password lock ────────────────────────────────────────────

    #[tokio::test]
    async fn password_lock_round_trip_checks_the_digest() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Password {
                password: "swordfish".into(),
            },
        )
        .await
        .unwrap();

        let signed = wallet.last_submitted();
        let datum_bytes = signed.tx.outputs[0].datum.clone().unwrap();
        let datum = LockDatum::decode_for(LockKind::Password, &datum_bytes).unwrap();
        assert_eq!(
            datum,
            LockDatum::PasswordLock {
                secret_hash: Digest32::commit(b"swordfish"),
                owner: owner().details().require_payment_key().unwrap(),
            }
        );

        let ctx = prepare_unlock(&cfg, LockKind::Password, &owner()).unwrap();
        let locked = replay_lock_output(&signed);

        // Wrong case, wrong password.
        let chain = MockChain::new(2_000)
            .with_utxos(&ctx.contract_address, vec![locked.clone()]);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let err = unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Password {
                password: "Swordfish".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::PasswordMismatch));

        // The right password carries its own bytes as the redeemer.
        let chain = MockChain::new(2_000)
            .with_utxos(&ctx.contract_address, vec![locked]);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Password {
                password: "swordfish".into(),
            },
        )
        .await
        .unwrap();
        let signed = wallet.last_submitted();
        assert_eq!(
            signed.tx.redeemers[0].data,
            crate::datum::UnlockRedeemer::Password(b"swordfish".to_vec()).encode()
        );
    }

    // ── Scenario D: credentials fail before the network ──────────────────────

    #[tokio::test]
    async fn missing_stake_credential_fails_before_any_network_call() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let stakeless = Address::Enterprise {
            network: Network::Testnet,
            payment: Credential::Key(Hash28::digest(b"pay-only")),
        };
        let err = lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &stakeless,
            &asset(),
            LockIntent::Permanent { note: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::MissingStakeCredential));
        assert_eq!(err.class(), "CredentialError");
        assert_eq!(chain.call_count(), 0);
    }

    // ── Gate and submission edges ────────────────────────────────────────────

    #[tokio::test]
    async fn declining_the_gate_leaves_no_chain_effect() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let outcome = lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(false),
            &owner(),
            &asset(),
            LockIntent::Permanent { note: None },
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert!(wallet.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn a_lost_double_spend_race_is_classified_as_conflict() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let wallet = MockWallet {
            submit_error: Some(|| LockError::UtxoConflict),
            ..MockWallet::new(owner(), wallet_utxos())
        };
        let err = lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Permanent { note: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::UtxoConflict));
    }

    #[tokio::test]
    async fn missing_asset_is_reported_per_side() {
        let cfg = config();
        let chain = MockChain::new(1_000);
        let no_nft = vec![wallet_utxos()[1].clone()];
        let wallet = MockWallet::new(owner(), no_nft);
        let err = lock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            LockIntent::Permanent { note: None },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::AssetNotFound { .. }));

        // Nothing at the contract address either.
        let wallet = MockWallet::new(owner(), wallet_utxos());
        let err = unlock_asset(
            &cfg,
            &chain,
            &wallet,
            &Gate(true),
            &owner(),
            &asset(),
            UnlockIntent::Timed,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LockError::LockedAssetNotFound { .. }));
    }
}
