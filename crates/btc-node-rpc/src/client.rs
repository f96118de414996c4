use bitcoin::{Block, BlockHash, Transaction, Txid};
use bitcoincore_rpc::json::GetBlockHeaderResult;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use tracing::warn;

use btc_core::error::CoreError;
use btc_core::resolver::{ResolvedOutput, Resolver};
use btc_core::value::btc_to_sat;

use crate::error::NodeRpcError;

/// One resolved output as reported by `getrawtransaction(verbose=true)`.
#[derive(Debug, Clone)]
pub struct RawVoutInfo {
    pub value_sat: i64,
    pub address: Option<String>,
}

/// The parts of a verbose `getrawtransaction` response this crate needs.
#[derive(Debug, Clone)]
pub struct RawTxInfo {
    pub txid: Txid,
    pub vout: Vec<RawVoutInfo>,
}

/// A thin wrapper around a `bitcoincore-rpc` client.
///
/// Implements [`Resolver`] by calling `getrawtransaction(txid, verbose=true)`
/// against a full node, reading `vout[].value` through the raw JSON
/// response (never through `bitcoincore-rpc`'s own `Amount`-via-`f64`
/// deserializer) so the BTC amount is parsed as exact decimal text and
/// handed to the Value codec, never a binary float.
pub struct NodeRpcClient {
    inner: Client,
}

fn call_failed(method: &'static str, source: bitcoincore_rpc::Error) -> NodeRpcError {
    warn!(method, error = %source, "node rpc call failed");
    NodeRpcError::CallFailed { method, source }
}

impl NodeRpcClient {
    pub fn new(url: &str, user: &str, password: &str) -> Result<Self, NodeRpcError> {
        let auth = Auth::UserPass(user.to_string(), password.to_string());
        let inner = Client::new(url, auth).map_err(|e| call_failed("connect", e))?;
        Ok(Self { inner })
    }

    pub fn block_count(&self) -> Result<u64, NodeRpcError> {
        self.inner
            .get_block_count()
            .map_err(|e| call_failed("getblockcount", e))
    }

    pub fn block_hash(&self, height: u64) -> Result<BlockHash, NodeRpcError> {
        self.inner
            .get_block_hash(height)
            .map_err(|e| call_failed("getblockhash", e))
    }

    pub fn block_header(&self, hash: &BlockHash) -> Result<GetBlockHeaderResult, NodeRpcError> {
        self.inner
            .get_block_header_info(hash)
            .map_err(|e| call_failed("getblockheader", e))
    }

    pub fn block(&self, hash: &BlockHash) -> Result<Block, NodeRpcError> {
        self.inner
            .get_block(hash)
            .map_err(|e| call_failed("getblock", e))
    }

    pub fn send_raw_transaction(&self, tx: &Transaction) -> Result<Txid, NodeRpcError> {
        self.inner
            .send_raw_transaction(tx)
            .map_err(|e| call_failed("sendrawtransaction", e))
    }

    /// Fetch and parse a verbose raw transaction, reading its output values
    /// via the exact-decimal path rather than `bitcoincore-rpc`'s typed,
    /// float-based `Amount` deserializer.
    pub fn raw_transaction_verbose(&self, txid: &Txid) -> Result<RawTxInfo, NodeRpcError> {
        let params = [
            serde_json::Value::String(txid.to_string()),
            serde_json::Value::Bool(true),
        ];
        let raw: serde_json::Value =
            self.inner
                .call("getrawtransaction", &params)
                .map_err(|e| call_failed("getrawtransaction", e))?;

        let vout_array = raw.get("vout").and_then(|v| v.as_array()).ok_or_else(|| {
            NodeRpcError::UnexpectedShape {
                method: "getrawtransaction",
                detail: "missing vout array".to_string(),
            }
        })?;

        let vout = vout_array
            .iter()
            .map(|entry| parse_vout_entry(entry))
            .collect::<Result<Vec<_>, NodeRpcError>>()?;

        Ok(RawTxInfo { txid: *txid, vout })
    }
}

fn parse_vout_entry(entry: &serde_json::Value) -> Result<RawVoutInfo, NodeRpcError> {
    let value_text = entry
        .get("value")
        .ok_or_else(|| NodeRpcError::UnexpectedShape {
            method: "getrawtransaction",
            detail: "vout entry missing value".to_string(),
        })?
        .to_string();

    let value_sat = btc_to_sat(&value_text).map_err(|e| NodeRpcError::UnexpectedShape {
        method: "getrawtransaction",
        detail: format!("bad vout value {value_text}: {e}"),
    })?;

    let address = entry.get("scriptPubKey").and_then(|spk| {
        spk.get("address")
            .and_then(|a| a.as_str())
            .or_else(|| {
                spk.get("addresses")
                    .and_then(|a| a.as_array())
                    .and_then(|arr| arr.first())
                    .and_then(|a| a.as_str())
            })
            .map(str::to_string)
    });

    Ok(RawVoutInfo { value_sat, address })
}

impl Resolver for NodeRpcClient {
    fn resolve(&self, txid: Txid, vout: u32) -> Result<ResolvedOutput, CoreError> {
        let info = self
            .raw_transaction_verbose(&txid)
            .map_err(|e| CoreError::PrevTxNotFound(format!("{txid}: {e}")))?;

        let entry = info
            .vout
            .get(vout as usize)
            .ok_or_else(|| CoreError::VoutIndexOutOfRange(format!("{txid}:{vout}")))?;

        let address = entry
            .address
            .clone()
            .ok_or_else(|| CoreError::AddressMissingOnScript(format!("{txid}:{vout}")))?;

        Ok(ResolvedOutput {
            value_sat: entry.value_sat,
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_vout_entry_reads_exact_decimal_value() {
        let entry: serde_json::Value = serde_json::from_str(
            r#"{"value": 0.00011000, "n": 0, "scriptPubKey": {"address": "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4"}}"#,
        )
        .unwrap();
        let parsed = parse_vout_entry(&entry).unwrap();
        assert_eq!(parsed.value_sat, 11_000);
        assert_eq!(
            parsed.address.as_deref(),
            Some("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4")
        );
    }

    #[test]
    fn parse_vout_entry_falls_back_to_addresses_array() {
        let entry: serde_json::Value = serde_json::from_str(
            r#"{"value": 1.0, "n": 0, "scriptPubKey": {"addresses": ["1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"]}}"#,
        )
        .unwrap();
        let parsed = parse_vout_entry(&entry).unwrap();
        assert_eq!(parsed.value_sat, 100_000_000);
        assert_eq!(
            parsed.address.as_deref(),
            Some("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa")
        );
    }

    #[test]
    fn parse_vout_entry_missing_address_is_none() {
        let entry: serde_json::Value =
            serde_json::from_str(r#"{"value": 1.0, "n": 0, "scriptPubKey": {}}"#).unwrap();
        let parsed = parse_vout_entry(&entry).unwrap();
        assert!(parsed.address.is_none());
    }
}
