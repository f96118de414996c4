use thiserror::Error;

/// Errors surfaced by the fee-estimator HTTP collaborator.
#[derive(Debug, Error)]
pub enum FeeApiError {
    #[error("fee api http error: {method} {endpoint} returned status {status}")]
    Http {
        method: &'static str,
        endpoint: String,
        status: u16,
    },

    #[error("fee api request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("fee api returned an empty fee tier list")]
    EmptyResponse,
}
