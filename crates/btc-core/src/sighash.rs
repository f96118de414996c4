use bitcoin::absolute::LockTime;
use bitcoin::address::Address;
use bitcoin::hashes::Hash;
use bitcoin::script::ScriptBuf;
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::error::CoreError;
use crate::network::BtcNetwork;
use crate::transaction::serialize_tx;

/// A declared input to an unsigned transaction: the outpoint being spent,
/// plus the value and address its resolver (or the caller, offline) has
/// attested for it. `value_sat`/`address` are metadata for sighash
/// computation and are never themselves serialized onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredInput {
    pub txid: Txid,
    pub vout: u32,
    pub value_sat: i64,
    pub address: String,
}

/// A declared output: the destination address and the value to send it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredOutput {
    pub address: String,
    pub value_sat: i64,
}

/// The result of building an unsigned transaction: the serialized raw bytes
/// (scriptSigs empty, no witness) and one 32-byte sighash per input, ready
/// for an external signer. Returning both together, rather than discarding
/// the raw bytes, is load-bearing: an external signer has nothing else to
/// round-trip into `build_signed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTxArtifact {
    pub raw_bytes: Vec<u8>,
    pub sighashes: Vec<[u8; 32]>,
}

fn address_to_script_pubkey(address: &str, network: BtcNetwork) -> Result<ScriptBuf, CoreError> {
    let parsed = address
        .parse::<Address<bitcoin::address::NetworkUnchecked>>()
        .map_err(|e| CoreError::BadAddress(format!("invalid address {address}: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| CoreError::BadAddress(format!("address {address} wrong network: {e}")))?;
    Ok(parsed.script_pubkey())
}

fn build_unsigned_tx(
    inputs: &[DeclaredInput],
    outputs: &[DeclaredOutput],
    network: BtcNetwork,
) -> Result<Transaction, CoreError> {
    if inputs.is_empty() {
        return Err(CoreError::EmptyInputs);
    }
    if outputs.is_empty() {
        return Err(CoreError::EmptyOutputs);
    }

    let tx_inputs = inputs
        .iter()
        .map(|input| TxIn {
            previous_output: OutPoint::new(input.txid, input.vout),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::default(),
        })
        .collect();

    let tx_outputs = outputs
        .iter()
        .map(|output| {
            Ok(TxOut {
                value: Amount::from_sat(output.value_sat.max(0) as u64),
                script_pubkey: address_to_script_pubkey(&output.address, network)?,
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok(Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: tx_inputs,
        output: tx_outputs,
    })
}

/// Build an unsigned transaction from declared inputs/outputs, and compute
/// the legacy SIGHASH_ALL digest for each input against the scriptPubKey of
/// the UTXO it claims to spend.
///
/// This computes non-segwit sighash unconditionally, even when the claimed
/// scriptPubKey is a SegWit program — a limitation retained on purpose for
/// compatibility with existing callers. Use [`build_unsigned_segwit`] for
/// BIP143-correct SegWit sighashes.
pub fn build_unsigned(
    inputs: &[DeclaredInput],
    outputs: &[DeclaredOutput],
    network: BtcNetwork,
) -> Result<UnsignedTxArtifact, CoreError> {
    let tx = build_unsigned_tx(inputs, outputs, network)?;

    let mut cache = SighashCache::new(&tx);
    let mut sighashes = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let script_pubkey = address_to_script_pubkey(&input.address, network)?;
        let sighash = cache
            .legacy_signature_hash(i, &script_pubkey, EcdsaSighashType::All as u32)
            .map_err(|e| CoreError::ScriptBuildFailed(format!("legacy sighash failed: {e}")))?;
        sighashes.push(sighash.to_byte_array());
    }

    Ok(UnsignedTxArtifact {
        raw_bytes: serialize_tx(&tx),
        sighashes,
    })
}

/// Build an unsigned transaction and compute BIP143 (SegWit v0) sighashes.
///
/// This is the explicit extension requested in the design notes: a distinct
/// operation rather than a silent switch inside `build_unsigned`, so the
/// legacy-only default stays the default.
pub fn build_unsigned_segwit(
    inputs: &[DeclaredInput],
    outputs: &[DeclaredOutput],
    network: BtcNetwork,
) -> Result<UnsignedTxArtifact, CoreError> {
    let tx = build_unsigned_tx(inputs, outputs, network)?;

    let mut cache = SighashCache::new(&tx);
    let mut sighashes = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let script_pubkey = address_to_script_pubkey(&input.address, network)?;
        let script_code = p2wpkh_script_code(&script_pubkey)?;
        let sighash = cache
            .p2wpkh_signature_hash(
                i,
                &script_code,
                Amount::from_sat(input.value_sat.max(0) as u64),
                EcdsaSighashType::All,
            )
            .map_err(|e| CoreError::ScriptBuildFailed(format!("segwit sighash failed: {e}")))?;
        sighashes.push(sighash.to_byte_array());
    }

    Ok(UnsignedTxArtifact {
        raw_bytes: serialize_tx(&tx),
        sighashes,
    })
}

fn p2wpkh_script_code(witness_script_pubkey: &ScriptBuf) -> Result<ScriptBuf, CoreError> {
    let program = witness_script_pubkey.as_bytes();
    if program.len() != 22 || program[0] != 0x00 || program[1] != 0x14 {
        return Err(CoreError::UnsupportedFormat(
            "build_unsigned_segwit requires a P2WPKH scriptPubKey".to_string(),
        ));
    }
    Ok(witness_script_pubkey.clone())
}
