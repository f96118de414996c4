use serde::Deserialize;
use std::collections::HashMap;

/// `GET /balance?active={addr}` response: keyed by the queried address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressBalance {
    pub final_balance: i64,
    pub n_tx: u64,
    pub total_received: i64,
}

pub type BalanceResponse = HashMap<String, AddressBalance>;

/// One entry of `GET /unspent?active={addr}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UnspentOutput {
    pub tx_hash_big_endian: String,
    pub tx_output_n: u32,
    pub script: String,
    pub value: i64,
    pub confirmations: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnspentOutputList {
    pub unspent_outputs: Vec<UnspentOutput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrevOut {
    pub addr: Option<String>,
    pub value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputItem {
    pub prev_out: PrevOut,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutItem {
    pub addr: Option<String>,
    pub value: i64,
}

/// One transaction as returned by `/rawaddr/{addr}` or `/rawtx/{txid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TxItem {
    pub hash: String,
    pub block_height: Option<u64>,
    pub time: u64,
    #[serde(rename = "inputs")]
    pub inputs: Vec<InputItem>,
    #[serde(rename = "out")]
    pub outputs: Vec<OutItem>,
}

/// `GET /rawaddr/{addr}?limit&offset` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressHistory {
    pub address: String,
    pub n_tx: u64,
    pub final_balance: i64,
    pub txs: Vec<TxItem>,
}
