use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use everlock_core::{
    Address, AssetId, LockError, OutPoint, ProtocolParameters, SignedTx, Timestamp, TxId, Utxo,
    Value,
};

use crate::ChainQuery;

// ── RPC error codes ──────────────────────────────────────────────────────────

/// The submitted transaction id is already on the ledger.
const ERR_DUPLICATE_TX: i64 = -32010;
/// One of the transaction's inputs was already consumed.
const ERR_UTXO_CONFLICT: i64 = -32020;

// ── IndexerClient ────────────────────────────────────────────────────────────

/// JSON-RPC 2.0 client for the indexer node that serves UTXO sets, ledger
/// time, protocol parameters, and transaction submission.
///
/// Uses raw HTTP POST with serde_json; no connection state beyond the
/// reqwest pool.
pub struct IndexerClient {
    url: String,
    client: reqwest::Client,
}

/// A decoded JSON-RPC error object.
struct RpcFailure {
    code: Option<i64>,
    message: String,
}

impl IndexerClient {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Call a JSON-RPC method and return the `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcFailure> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcFailure {
                code: None,
                message: format!("connecting to indexer at {}: {e}", self.url),
            })?;

        let json: serde_json::Value = resp.json().await.map_err(|e| RpcFailure {
            code: None,
            message: format!("parsing indexer response: {e}"),
        })?;

        if let Some(err) = json.get("error") {
            return Err(RpcFailure {
                code: err.get("code").and_then(|c| c.as_i64()),
                message: err
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unclassified indexer rejection")
                    .to_string(),
            });
        }

        Ok(json["result"].clone())
    }

    /// Submit a signed transaction.
    ///
    /// A duplicate-id rejection means the ledger already accepted this exact
    /// transaction (e.g. a resubmission after a timed-out first attempt) and
    /// is reported as success with the locally-computed id. Spent-input
    /// rejections classify as `UtxoConflict`; the caller re-queries UTXO
    /// state and retries.
    pub async fn submit_transaction(&self, tx: &SignedTx) -> Result<TxId, LockError> {
        let tx_id = tx.tx_id();
        match self
            .call(
                "ledger_submitTransaction",
                serde_json::json!([tx.to_hex()]),
            )
            .await
        {
            Ok(result) => {
                let returned = result
                    .as_str()
                    .ok_or_else(|| {
                        LockError::Indexer("expected tx id string from submit".into())
                    })?
                    .to_string();
                debug!(%tx_id, returned, "transaction submitted");
                TxId::from_hex(&returned)
            }
            Err(failure) => match classify_submit_failure(failure, tx_id) {
                SubmitClassification::AlreadyAccepted(id) => {
                    debug!(%id, "transaction already accepted; reporting success");
                    Ok(id)
                }
                SubmitClassification::Failed(e) => Err(e),
            },
        }
    }
}

/// Outcome of classifying a submit failure: either the duplicate-accepted
/// id, or the error to surface.
enum SubmitClassification {
    AlreadyAccepted(TxId),
    Failed(LockError),
}

fn classify_submit_failure(failure: RpcFailure, tx_id: TxId) -> SubmitClassification {
    match failure.code {
        Some(ERR_DUPLICATE_TX) => SubmitClassification::AlreadyAccepted(tx_id),
        Some(ERR_UTXO_CONFLICT) => SubmitClassification::Failed(LockError::UtxoConflict),
        Some(_) => SubmitClassification::Failed(LockError::Rejected(failure.message)),
        None => SubmitClassification::Failed(LockError::Indexer(failure.message)),
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcUtxo {
    tx_id: String,
    index: u32,
    address: String,
    coin: u64,
    #[serde(default)]
    assets: BTreeMap<String, u64>,
    #[serde(default)]
    datum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcTip {
    time: Timestamp,
}

fn utxo_from_rpc(rpc: RpcUtxo) -> Result<Utxo, LockError> {
    let mut value = Value::from_coin(rpc.coin);
    for (unit, quantity) in rpc.assets {
        value = value.with_asset(AssetId::from_unit(&unit)?, quantity);
    }
    let datum = match rpc.datum {
        Some(h) => Some(hex::decode(&h).map_err(|e| LockError::InvalidHex {
            what: "datum",
            detail: e.to_string(),
        })?),
        None => None,
    };
    Ok(Utxo {
        outpoint: OutPoint {
            tx_id: TxId::from_hex(&rpc.tx_id)?,
            index: rpc.index,
        },
        address: Address::from_bech32(&rpc.address)?,
        value,
        datum,
    })
}

// ── ChainQuery over JSON-RPC ─────────────────────────────────────────────────

impl ChainQuery for IndexerClient {
    async fn utxos_at(&self, address: &Address) -> Result<Vec<Utxo>, LockError> {
        let result = self
            .call("ledger_getUtxos", serde_json::json!([address.to_bech32()]))
            .await
            .map_err(|f| LockError::Indexer(f.message))?;
        let rpc_utxos: Vec<RpcUtxo> = serde_json::from_value(result)
            .map_err(|e| LockError::Indexer(format!("parsing utxo set: {e}")))?;
        rpc_utxos.into_iter().map(utxo_from_rpc).collect()
    }

    async fn current_time(&self) -> Result<Timestamp, LockError> {
        let result = self
            .call("ledger_getTip", serde_json::json!([]))
            .await
            .map_err(|f| LockError::Indexer(f.message))?;
        let tip: RpcTip = serde_json::from_value(result)
            .map_err(|e| LockError::Indexer(format!("parsing tip: {e}")))?;
        Ok(tip.time)
    }

    async fn protocol_parameters(&self) -> Result<ProtocolParameters, LockError> {
        let result = self
            .call("ledger_getProtocolParameters", serde_json::json!([]))
            .await
            .map_err(|f| LockError::Indexer(f.message))?;
        serde_json::from_value(result)
            .map_err(|e| LockError::Indexer(format!("parsing protocol parameters: {e}")))
    }
}
