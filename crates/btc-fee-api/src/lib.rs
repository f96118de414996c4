//! Fee-estimator HTTP client: slow/normal/fast/best sat/vbyte tiers.
//!
//! Thin I/O collaborator: one GET request, shaped into [`client::FeeTiers`].

pub mod client;
pub mod error;

pub use client::{FeeApiClient, FeeTiers};
pub use error::FeeApiError;
