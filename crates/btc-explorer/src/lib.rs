//! Third-party block explorer HTTP client: balances, unspent outputs,
//! address history, and transaction lookup by hash.
//!
//! Thin I/O collaborator, per the query façade's design: no logic beyond
//! one GET request per operation, shaped into domain-facing types.

pub mod client;
pub mod error;
pub mod types;

pub use client::ExplorerClient;
pub use error::ExplorerError;
