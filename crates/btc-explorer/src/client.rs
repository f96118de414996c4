use tracing::warn;

use crate::error::ExplorerError;
use crate::types::{AddressHistory, BalanceResponse, TxItem, UnspentOutputList};

/// A third-party block explorer HTTP client.
///
/// Thin I/O: each method is one GET request shaped into a typed response.
/// Any HTTP status ≥ 400 is surfaced as [`ExplorerError::Http`], per the
/// external-interfaces contract this collaborator implements.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<T, ExplorerError> {
        let url = format!("{}{endpoint}", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(endpoint, error = %e, "explorer request failed");
            ExplorerError::Transport(e)
        })?;
        let status = response.status();
        if status.as_u16() >= 400 {
            warn!(endpoint, status = status.as_u16(), "explorer returned an error status");
            return Err(ExplorerError::Http {
                method: "GET",
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(ExplorerError::Transport)
    }

    /// `GET /balance?active={address}`.
    pub async fn get_balance(&self, address: &str) -> Result<i64, ExplorerError> {
        let endpoint = format!("/balance?active={address}");
        let balances: BalanceResponse = self.get_json(&endpoint).await?;
        balances
            .get(address)
            .map(|b| b.final_balance)
            .ok_or_else(|| ExplorerError::AddressNotFound(address.to_string()))
    }

    /// `GET /unspent?active={address}`.
    pub async fn get_unspent_outputs(
        &self,
        address: &str,
    ) -> Result<Vec<crate::types::UnspentOutput>, ExplorerError> {
        let endpoint = format!("/unspent?active={address}");
        let list: UnspentOutputList = self.get_json(&endpoint).await?;
        Ok(list.unspent_outputs)
    }

    /// `GET /rawaddr/{address}?limit={page_size}&offset={page}`.
    pub async fn list_tx_by_address(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<AddressHistory, ExplorerError> {
        let endpoint = format!("/rawaddr/{address}?limit={page_size}&offset={page}");
        self.get_json(&endpoint).await
    }

    /// `GET /rawtx/{txid}`.
    pub async fn get_tx_by_hash(&self, txid: &str) -> Result<TxItem, ExplorerError> {
        let endpoint = format!("/rawtx/{txid}");
        self.get_json(&endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_stores_base_url() {
        let client = ExplorerClient::new("https://blockchain.info");
        assert_eq!(client.base_url, "https://blockchain.info");
    }
}
