use bitcoin::address::Address;
use bitcoin::script::{Builder, PushBytesBuf, ScriptBuf};
use bitcoin::secp256k1::ecdsa;
use bitcoin::sighash::EcdsaSighashType;
use bitcoin::PublicKey;

use crate::error::CoreError;
use crate::network::BtcNetwork;
use crate::resolver::Resolver;
use crate::transaction::{deserialize_tx, serialize_tx, txid_of};

/// Whether to normalize signatures to low-S (BIP146) before DER encoding.
///
/// The upstream service never flips high-S signatures, which mempool
/// standardness rules (and most modern signers) require. `Enforce` is the
/// default; `Preserve` exists only for a caller that needs bit-for-bit
/// compatibility with that non-standard behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LowSPolicy {
    #[default]
    Enforce,
    Preserve,
}

/// A fully signed transaction: its serialized bytes and computed txid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTxArtifact {
    pub raw_bytes: Vec<u8>,
    pub txid: String,
}

fn address_to_script_pubkey(address: &str, network: BtcNetwork) -> Result<ScriptBuf, CoreError> {
    let parsed = address
        .parse::<Address<bitcoin::address::NetworkUnchecked>>()
        .map_err(|e| CoreError::BadAddress(format!("invalid address {address}: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| CoreError::BadAddress(format!("address {address} wrong network: {e}")))?;
    Ok(parsed.script_pubkey())
}

/// Attach externally-produced signatures to a raw (unsigned) transaction and
/// verify each input with the Bitcoin Script engine.
///
/// `signatures` are raw 64-byte `R(32) ‖ S(32)` ECDSA signatures; this
/// function encodes each in DER, appends the SIGHASH_ALL type byte, and
/// builds `scriptSig = PUSH(sig) PUSH(pubkey)` — legacy P2PKH unlocking,
/// per the core's signing scope.
pub fn build_signed(
    raw_tx_bytes: &[u8],
    signatures: &[[u8; 64]],
    public_keys: &[Vec<u8>],
    resolver: &dyn Resolver,
    network: BtcNetwork,
    low_s_policy: LowSPolicy,
) -> Result<SignedTxArtifact, CoreError> {
    let mut tx = deserialize_tx(raw_tx_bytes)?;

    if signatures.len() != tx.input.len() || public_keys.len() != tx.input.len() {
        return Err(CoreError::CountMismatch(format!(
            "{} signature(s) and {} public key(s) for {} input(s)",
            signatures.len(),
            public_keys.len(),
            tx.input.len()
        )));
    }

    let mut prev_script_pubkeys = Vec::with_capacity(tx.input.len());
    let mut prev_values = Vec::with_capacity(tx.input.len());

    for (i, input) in tx.input.iter().enumerate() {
        let resolved = resolver
            .resolve(input.previous_output.txid, input.previous_output.vout)
            .map_err(|e| {
                CoreError::PrevTxNotFound(format!("input {i}: {e}"))
            })?;
        let script_pubkey = address_to_script_pubkey(&resolved.address, network)?;
        prev_values.push(resolved.value_sat);
        prev_script_pubkeys.push(script_pubkey);
    }

    for (i, input) in tx.input.iter_mut().enumerate() {
        let public_key = PublicKey::from_slice(&public_keys[i])
            .map_err(|e| CoreError::BadPublicKey(format!("input {i}: {e}")))?;

        let mut signature = ecdsa::Signature::from_compact(&signatures[i])
            .map_err(|e| CoreError::BadSignatureEncoding(format!("input {i}: {e}")))?;
        if low_s_policy == LowSPolicy::Enforce {
            signature.normalize_s();
        }

        let mut sig_bytes = signature.serialize_der().to_vec();
        sig_bytes.push(EcdsaSighashType::All as u8);

        let sig_push = PushBytesBuf::try_from(sig_bytes).map_err(|e| {
            CoreError::ScriptBuildFailed(format!("input {i}: signature too long: {e}"))
        })?;
        let pubkey_push = PushBytesBuf::try_from(public_key.to_bytes()).map_err(|e| {
            CoreError::ScriptBuildFailed(format!("input {i}: pubkey too long: {e}"))
        })?;

        let script_sig = Builder::new()
            .push_slice(sig_push)
            .push_slice(pubkey_push)
            .into_script();

        input.script_sig = script_sig;
    }

    let signed_bytes = serialize_tx(&tx);

    for (i, script_pubkey) in prev_script_pubkeys.iter().enumerate() {
        let amount = bitcoin::Amount::from_sat(prev_values[i].max(0) as u64);
        script_pubkey
            .verify(i, amount, &signed_bytes)
            .map_err(|e| CoreError::ScriptVerifyFailed(format!("input {i}: {e}")))?;
    }

    Ok(SignedTxArtifact {
        txid: txid_of(&tx),
        raw_bytes: signed_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{DeclaredPrevOutput, OfflineResolver};
    use crate::sighash::{build_unsigned, DeclaredInput, DeclaredOutput};
    use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
    use std::str::FromStr;

    fn prev_txid() -> bitcoin::Txid {
        bitcoin::Txid::from_str(
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33",
        )
        .unwrap()
    }

    /// S3: sign & verify round-trip, and S6: count mismatch short-circuits
    /// before touching the Script VM.
    #[test]
    fn s3_sign_and_verify_round_trip() {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[0xab; 32]).unwrap();
        let pubkey = bitcoin::secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
        let pubkey_bytes: [u8; 33] = pubkey.serialize();
        let address = crate::address::p2pkh(&pubkey_bytes, BtcNetwork::Mainnet).unwrap();

        let input = DeclaredInput {
            txid: prev_txid(),
            vout: 0,
            value_sat: 100_000,
            address: address.clone(),
        };
        let output = DeclaredOutput {
            address: "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(),
            value_sat: 90_000,
        };

        let unsigned =
            build_unsigned(&[input.clone()], &[output], BtcNetwork::Mainnet).unwrap();
        assert_eq!(unsigned.sighashes.len(), 1);

        let message = Message::from_digest(unsigned.sighashes[0]);
        let signature = secp.sign_ecdsa(&message, &secret_key);
        let sig_compact = signature.serialize_compact();

        let resolver = OfflineResolver::new(vec![DeclaredPrevOutput {
            txid: input.txid,
            vout: input.vout,
            value_sat: input.value_sat,
            address: input.address.clone(),
        }]);

        let signed = build_signed(
            &unsigned.raw_bytes,
            &[sig_compact],
            &[pubkey_bytes.to_vec()],
            &resolver,
            BtcNetwork::Mainnet,
            LowSPolicy::Enforce,
        )
        .unwrap();

        let decoded = deserialize_tx(&signed.raw_bytes).unwrap();
        assert_eq!(txid_of(&decoded), signed.txid);
    }

    /// S6: `build_signed` with a signature/input count mismatch returns
    /// `CountMismatch` without running the Script VM.
    #[test]
    fn s6_count_mismatch_short_circuits() {
        let input = DeclaredInput {
            txid: prev_txid(),
            vout: 0,
            value_sat: 100_000,
            address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
        };
        let output = DeclaredOutput {
            address: "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(),
            value_sat: 90_000,
        };
        let unsigned = build_unsigned(
            &[input.clone(), input.clone(), input],
            &[output],
            BtcNetwork::Mainnet,
        )
        .unwrap();

        let resolver = OfflineResolver::new(vec![]);
        let result = build_signed(
            &unsigned.raw_bytes,
            &[[0u8; 64], [0u8; 64]],
            &[vec![0u8; 33], vec![0u8; 33]],
            &resolver,
            BtcNetwork::Mainnet,
            LowSPolicy::Enforce,
        );
        assert!(matches!(result, Err(CoreError::CountMismatch(_))));
    }
}
