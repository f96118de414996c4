use bitcoin::Txid;

use crate::error::CoreError;

/// What a resolver gives back for a previous output: its value and the
/// address that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub value_sat: i64,
    pub address: String,
}

/// A previous output declared by the caller, for offline resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredPrevOutput {
    pub txid: Txid,
    pub vout: u32,
    pub value_sat: i64,
    pub address: String,
}

/// Resolves `(prev_txid, vout)` to the value and address of the output it
/// names.
///
/// This is the sole effectful dependency of the core: the prev-tx lookup
/// that callers otherwise thread as an inline callback is promoted here to
/// a named, injectable capability with two implementations — [`OfflineResolver`]
/// (this crate, pure) and an online one backed by node RPC (a separate
/// crate, since it performs network I/O).
pub trait Resolver {
    fn resolve(&self, txid: Txid, vout: u32) -> Result<ResolvedOutput, CoreError>;
}

/// Resolves previous outputs from a caller-supplied, declared list.
///
/// No network I/O: every value this returns came from the caller up front.
pub struct OfflineResolver {
    declared: Vec<DeclaredPrevOutput>,
}

impl OfflineResolver {
    pub fn new(declared: Vec<DeclaredPrevOutput>) -> Self {
        Self { declared }
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }
}

impl Resolver for OfflineResolver {
    fn resolve(&self, txid: Txid, vout: u32) -> Result<ResolvedOutput, CoreError> {
        self.declared
            .iter()
            .find(|d| d.txid == txid && d.vout == vout)
            .map(|d| ResolvedOutput {
                value_sat: d.value_sat,
                address: d.address.clone(),
            })
            .ok_or_else(|| {
                CoreError::PrevTxNotFound(format!("no declared output for {txid}:{vout}"))
            })
    }
}
