use serde::Deserialize;
use tracing::warn;

use crate::error::FeeApiError;

/// One fee tier entry as returned by the estimator.
#[derive(Debug, Clone, Deserialize)]
pub struct GasFeeEntry {
    #[serde(rename = "bestTransactionFee")]
    pub best_transaction_fee: String,
    #[serde(rename = "bestTransactionFeeSat")]
    pub best_transaction_fee_sat: String,
    #[serde(rename = "slowGasPrice")]
    pub slow_gas_price: String,
    #[serde(rename = "standardGasPrice")]
    pub standard_gas_price: String,
    #[serde(rename = "rapidGasPrice")]
    pub rapid_gas_price: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GasFeeData {
    data: Vec<GasFeeEntry>,
}

/// The fee tiers a caller cares about: slow, normal, fast, best.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeTiers {
    pub slow_sat_vbyte: String,
    pub normal_sat_vbyte: String,
    pub fast_sat_vbyte: String,
    pub best_sat_vbyte: String,
}

impl From<GasFeeEntry> for FeeTiers {
    fn from(entry: GasFeeEntry) -> Self {
        Self {
            slow_sat_vbyte: entry.slow_gas_price,
            normal_sat_vbyte: entry.standard_gas_price,
            fast_sat_vbyte: entry.rapid_gas_price,
            best_sat_vbyte: entry.best_transaction_fee_sat,
        }
    }
}

/// HTTP client for the fee-estimator service.
#[derive(Debug, Clone)]
pub struct FeeApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl FeeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetch the current fee tiers.
    pub async fn get_fee(&self) -> Result<FeeTiers, FeeApiError> {
        let response = self.http.get(&self.base_url).send().await.map_err(|e| {
            warn!(endpoint = %self.base_url, error = %e, "fee api request failed");
            FeeApiError::Transport(e)
        })?;
        let status = response.status();
        if status.as_u16() >= 400 {
            warn!(endpoint = %self.base_url, status = status.as_u16(), "fee api returned an error status");
            return Err(FeeApiError::Http {
                method: "GET",
                endpoint: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        let parsed: GasFeeData = response.json().await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(FeeTiers::from)
            .ok_or(FeeApiError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gas_fee_entry_maps_to_fee_tiers() {
        let entry = GasFeeEntry {
            best_transaction_fee: "0.0001".to_string(),
            best_transaction_fee_sat: "10".to_string(),
            slow_gas_price: "1".to_string(),
            standard_gas_price: "5".to_string(),
            rapid_gas_price: "15".to_string(),
        };
        let tiers: FeeTiers = entry.into();
        assert_eq!(tiers.slow_sat_vbyte, "1");
        assert_eq!(tiers.normal_sat_vbyte, "5");
        assert_eq!(tiers.fast_sat_vbyte, "15");
        assert_eq!(tiers.best_sat_vbyte, "10");
    }
}
