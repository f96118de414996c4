use thiserror::Error;

/// Errors surfaced by the third-party block explorer HTTP collaborator.
#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("explorer http error: {method} {endpoint} returned status {status}")]
    Http {
        method: &'static str,
        endpoint: String,
        status: u16,
    },

    #[error("explorer request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("explorer response had an unexpected shape for {endpoint}: {detail}")]
    UnexpectedShape { endpoint: String, detail: String },

    #[error("address {0} not present in explorer response")]
    AddressNotFound(String),
}
