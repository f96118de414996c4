use thiserror::Error;

/// Errors surfaced by the offline transaction construction, signing,
/// decoding and verification pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("bad public key: {0}")]
    BadPublicKey(String),

    #[error("bad address: {0}")]
    BadAddress(String),

    #[error("unsupported address format: {0}")]
    UnsupportedFormat(String),

    #[error("inputs list is empty")]
    EmptyInputs,

    #[error("outputs list is empty")]
    EmptyOutputs,

    #[error("count mismatch: {0}")]
    CountMismatch(String),

    #[error("declared input count does not match transaction input count: {0}")]
    InputCountMismatch(String),

    #[error("amount has a fractional satoshi component: {0}")]
    FractionalSatoshi(String),

    #[error("amount overflows satoshi range: {0}")]
    ValueOverflow(String),

    #[error("previous transaction not found: {0}")]
    PrevTxNotFound(String),

    #[error("vout index out of range: {0}")]
    VoutIndexOutOfRange(String),

    #[error("scriptPubKey carries no canonical address: {0}")]
    AddressMissingOnScript(String),

    #[error("failed to build script: {0}")]
    ScriptBuildFailed(String),

    #[error("script verification failed: {0}")]
    ScriptVerifyFailed(String),

    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    #[error("bad signature encoding: {0}")]
    BadSignatureEncoding(String),

    #[error("negative fee: inputs sum to less than outputs ({0})")]
    NegativeFee(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_bad_public_key() {
        let err = CoreError::BadPublicKey("not on curve".into());
        assert_eq!(err.to_string(), "bad public key: not on curve");
    }

    #[test]
    fn display_negative_fee() {
        let err = CoreError::NegativeFee("-10000".into());
        assert_eq!(err.to_string(), "negative fee: inputs sum to less than outputs (-10000)");
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::EmptyInputs);
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn debug_format_works() {
        let err = CoreError::ScriptVerifyFailed("bad sig".into());
        let debug = format!("{:?}", err);
        assert!(debug.contains("ScriptVerifyFailed"));
    }
}
