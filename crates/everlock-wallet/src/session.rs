use everlock_core::{Address, LockError, Network, SignedTx, TxId, UnsignedTx, Utxo, Witness};
use everlock_provider::{ChainQuery, IndexerClient, WalletSession};

use crate::signer::WalletKeys;

/// A software wallet session over a local keyfile: UTXO queries and
/// submission go through the indexer, signing happens in-process with the
/// wallet keys.
pub struct SoftwareWallet<'a> {
    keys: WalletKeys,
    address: Address,
    indexer: &'a IndexerClient,
}

impl<'a> SoftwareWallet<'a> {
    /// Enable a session for `keys` on `network`.
    pub fn enable(keys: WalletKeys, network: Network, indexer: &'a IndexerClient) -> Self {
        let address = keys.address(network);
        Self {
            keys,
            address,
            indexer,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl WalletSession for SoftwareWallet<'_> {
    async fn utxos(&self) -> Result<Vec<Utxo>, LockError> {
        self.indexer.utxos_at(&self.address).await
    }

    async fn change_address(&self) -> Result<Address, LockError> {
        Ok(self.address.clone())
    }

    async fn sign(&self, tx: &UnsignedTx) -> Result<SignedTx, LockError> {
        // Refuse outright when a mandated signer is not one of our keys; a
        // partial witness set would only bounce at the ledger.
        for signer in &tx.required_signers {
            if !self.keys.holds(signer) {
                return Err(LockError::MissingSigningKey(signer.to_hex()));
            }
        }

        let digest = *tx.tx_id().as_bytes();
        let mut witnesses = vec![self.keys.payment.sign(&digest)?];
        if tx
            .required_signers
            .iter()
            .any(|s| *s == self.keys.stake.key_hash)
        {
            witnesses.push(self.keys.stake.sign(&digest)?);
        }
        dedup_witnesses(&mut witnesses);

        Ok(SignedTx {
            tx: tx.clone(),
            witnesses,
        })
    }

    async fn submit(&self, tx: &SignedTx) -> Result<TxId, LockError> {
        self.indexer.submit_transaction(tx).await
    }
}

fn dedup_witnesses(witnesses: &mut Vec<Witness>) {
    witnesses.sort_by(|a, b| a.public_key.cmp(&b.public_key));
    witnesses.dedup_by(|a, b| a.public_key == b.public_key);
}
