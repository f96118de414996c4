use thiserror::Error;

/// Errors surfaced by the online, node-RPC-backed collaborator.
#[derive(Debug, Error)]
pub enum NodeRpcError {
    #[error("node rpc call {method} failed: {source}")]
    CallFailed {
        method: &'static str,
        source: bitcoincore_rpc::Error,
    },

    #[error("node rpc returned an unexpected shape for {method}: {detail}")]
    UnexpectedShape { method: &'static str, detail: String },

    #[error("transaction {0} not found")]
    TxNotFound(String),

    #[error("vout index {vout} out of range for transaction {txid}")]
    VoutOutOfRange { txid: String, vout: u32 },

    #[error("scriptPubKey on {txid}:{vout} carries no canonical address")]
    AddressMissingOnScript { txid: String, vout: u32 },
}
