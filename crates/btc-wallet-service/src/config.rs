use std::env;
use thiserror::Error;

use btc_core::network::BtcNetwork;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnv(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where this service's external collaborators live, loaded from the
/// process environment. No defaults for credentials; a best-effort default
/// only for the network (mainnet, the only one this core supports).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub node_rpc_url: String,
    pub node_rpc_user: String,
    pub node_rpc_pass: String,
    pub explorer_url: String,
    pub fee_api_url: String,
    pub network: BtcNetwork,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            node_rpc_url: require_env("BTC_NODE_RPC_URL")?,
            node_rpc_user: require_env("BTC_NODE_RPC_USER")?,
            node_rpc_pass: require_env("BTC_NODE_RPC_PASS")?,
            explorer_url: require_env("BTC_EXPLORER_URL")?,
            fee_api_url: require_env("BTC_FEE_API_URL")?,
            network: parse_network(env::var("BTC_NETWORK").ok())?,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnv(key.to_string()))
}

fn parse_network(value: Option<String>) -> Result<BtcNetwork, ConfigError> {
    match value.as_deref() {
        None | Some("mainnet") => Ok(BtcNetwork::Mainnet),
        Some(other) => Err(ConfigError::InvalidValue(
            "BTC_NETWORK".to_string(),
            other.to_string(),
        )),
    }
}
