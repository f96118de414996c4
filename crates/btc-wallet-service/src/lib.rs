//! Query façade wiring the offline core to its three network collaborators:
//! a Bitcoin Core node (JSON-RPC), a block explorer (HTTP) and a fee
//! estimator (HTTP). Does not implement a server transport — see the
//! crate-level non-goals; `main.rs` only demonstrates that the façade wires
//! up against configuration loaded from the environment.

pub mod config;
pub mod error;
pub mod facade;

pub use config::ServiceConfig;
pub use error::FacadeError;
pub use facade::WalletFacade;
