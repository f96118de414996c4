//! Online UTXO resolution and node access backed by a full node's JSON-RPC
//! interface.
//!
//! This is a thin I/O collaborator: the only design complexity it carries
//! is reading BTC amounts as exact decimal text rather than through
//! `bitcoincore-rpc`'s float-based `Amount` deserializer (see
//! [`client::NodeRpcClient::raw_transaction_verbose`]).

pub mod client;
pub mod error;

pub use client::NodeRpcClient;
pub use error::NodeRpcError;
