use tracing::info;

use everlock_core::{LockError, TxId, UnsignedTx};
use everlock_provider::{ConfirmationGate, WalletSession};

/// Terminal state of one lock or unlock action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Submitted(TxId),
    /// Declined at the confirmation gate; nothing was signed or submitted.
    Cancelled,
}

/// The confirm → sign → submit sequence.
///
/// Strictly ordered: the wallet sees nothing until the gate approves, and
/// nothing reaches the ledger until the wallet signs. Deduplication of a
/// resubmitted, already-accepted transaction is the wallet/provider's
/// contract (`WalletSession::submit`); this controller treats whatever id
/// comes back as success.
pub async fn confirm_sign_submit<W, G>(
    wallet: &W,
    gate: &G,
    tx: UnsignedTx,
) -> Result<Outcome, LockError>
where
    W: WalletSession,
    G: ConfirmationGate,
{
    if !gate.confirm(&tx).await {
        info!("submission cancelled at the confirmation gate");
        return Ok(Outcome::Cancelled);
    }
    let signed = wallet.sign(&tx).await?;
    let tx_id = wallet.submit(&signed).await?;
    info!(%tx_id, "transaction submitted");
    Ok(Outcome::Submitted(tx_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use everlock_core::{Address, Credential, Hash28, Network, SignedTx, Utxo, ValidityInterval};
    use std::sync::Mutex;

    struct Gate(bool);

    impl ConfirmationGate for Gate {
        async fn confirm(&self, _tx: &UnsignedTx) -> bool {
            self.0
        }
    }

    /// Wallet double recording how far the sequence got.
    struct Wallet {
        sign_calls: Mutex<u32>,
        submit_calls: Mutex<u32>,
        decline_signing: bool,
        submit_error: Option<fn() -> LockError>,
    }

    impl Wallet {
        fn ok() -> Self {
            Self {
                sign_calls: Mutex::new(0),
                submit_calls: Mutex::new(0),
                decline_signing: false,
                submit_error: None,
            }
        }
    }

    impl WalletSession for Wallet {
        async fn utxos(&self) -> Result<Vec<Utxo>, LockError> {
            Ok(vec![])
        }

        async fn change_address(&self) -> Result<Address, LockError> {
            Ok(Address::Enterprise {
                network: Network::Testnet,
                payment: Credential::Key(Hash28::digest(b"w")),
            })
        }

        async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, LockError> {
            *self.sign_calls.lock().unwrap() += 1;
            if self.decline_signing {
                return Err(LockError::SigningDeclined);
            }
            Ok(SignedTx {
                tx: tx.clone(),
                witnesses: vec![],
            })
        }

        async fn submit(&self, tx: &SignedTx) -> Result<TxId, LockError> {
            *self.submit_calls.lock().unwrap() += 1;
            match self.submit_error {
                Some(make) => Err(make()),
                None => Ok(tx.tx_id()),
            }
        }
    }

    fn empty_tx() -> UnsignedTx {
        UnsignedTx {
            inputs: vec![],
            outputs: vec![],
            fee: 0,
            validity: ValidityInterval::unbounded(),
            required_signers: vec![],
            scripts: vec![],
            redeemers: vec![],
        }
    }

    #[tokio::test]
    async fn declining_the_gate_touches_nothing() {
        let wallet = Wallet::ok();
        let outcome = confirm_sign_submit(&wallet, &Gate(false), empty_tx())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(*wallet.sign_calls.lock().unwrap(), 0);
        assert_eq!(*wallet.submit_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn approval_runs_the_full_sequence() {
        let wallet = Wallet::ok();
        let tx = empty_tx();
        let expected = tx.tx_id();
        let outcome = confirm_sign_submit(&wallet, &Gate(true), tx).await.unwrap();
        assert_eq!(outcome, Outcome::Submitted(expected));
        assert_eq!(*wallet.sign_calls.lock().unwrap(), 1);
        assert_eq!(*wallet.submit_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn a_signing_refusal_never_submits() {
        let wallet = Wallet {
            decline_signing: true,
            ..Wallet::ok()
        };
        let err = confirm_sign_submit(&wallet, &Gate(true), empty_tx())
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::SigningDeclined));
        assert_eq!(*wallet.submit_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn a_conflict_surfaces_for_retry() {
        let wallet = Wallet {
            submit_error: Some(|| LockError::UtxoConflict),
            ..Wallet::ok()
        };
        let err = confirm_sign_submit(&wallet, &Gate(true), empty_tx())
            .await
            .unwrap_err();
        assert!(matches!(err, LockError::UtxoConflict));
        assert_eq!(err.class(), "SubmissionError");
    }
}
