use thiserror::Error;

use btc_core::error::CoreError;
use btc_explorer::ExplorerError;
use btc_fee_api::FeeApiError;
use btc_node_rpc::NodeRpcError;

use crate::config::ConfigError;

/// Errors surfaced by the query façade: a core failure, or a wrapped
/// transport failure from one of the three injected collaborators.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    NodeRpc(#[from] NodeRpcError),

    #[error(transparent)]
    Explorer(#[from] ExplorerError),

    #[error(transparent)]
    FeeApi(#[from] FeeApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bad hex input: {0}")]
    BadHex(String),
}
