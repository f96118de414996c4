use bitcoin::consensus::encode;
use bitcoin::Transaction;

use crate::error::CoreError;

/// A thin, serde-friendly projection of a [`bitcoin::Transaction`] for API
/// responses.
///
/// The wire `Transaction` stays the single source of truth; this is a
/// derived view, not a second definition that can drift from it (values are
/// plain `i64` satoshis, never the string-vs-int64 split the domain and wire
/// types of the upstream service disagreed on).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireTx {
    pub txid: String,
    pub version: i32,
    pub locktime: u32,
    pub inputs: Vec<WireInput>,
    pub outputs: Vec<WireOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireInput {
    pub prev_txid: String,
    pub prev_vout: u32,
    pub script_sig_hex: String,
    pub sequence: u32,
    pub witness: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireOutput {
    pub value_sat: i64,
    pub script_pubkey_hex: String,
}

/// Serialize a transaction to its canonical consensus byte encoding.
///
/// Includes the BIP141 witness marker/flag and witness stacks when any
/// input carries a non-empty witness, matching `bitcoin::consensus`'s
/// default behavior.
pub fn serialize_tx(tx: &Transaction) -> Vec<u8> {
    bitcoin::consensus::serialize(tx)
}

/// Deserialize a transaction from its consensus byte encoding.
///
/// Accepts both legacy and BIP141 witness-serialized transactions.
pub fn deserialize_tx(bytes: &[u8]) -> Result<Transaction, CoreError> {
    encode::deserialize(bytes)
        .map_err(|e| CoreError::SerializationFailed(format!("failed to deserialize transaction: {e}")))
}

/// Compute the txid: double-SHA256 of the non-witness serialization,
/// displayed in Bitcoin's conventional big-endian (byte-reversed) hex form.
pub fn txid_of(tx: &Transaction) -> String {
    tx.compute_txid().to_string()
}

/// Project a transaction into its API-facing [`WireTx`] form.
pub fn to_wire(tx: &Transaction) -> WireTx {
    WireTx {
        txid: txid_of(tx),
        version: tx.version.0,
        locktime: tx.lock_time.to_consensus_u32(),
        inputs: tx
            .input
            .iter()
            .map(|input| WireInput {
                prev_txid: input.previous_output.txid.to_string(),
                prev_vout: input.previous_output.vout,
                script_sig_hex: hex::encode(input.script_sig.as_bytes()),
                sequence: input.sequence.0,
                witness: input.witness.iter().map(hex::encode).collect(),
            })
            .collect(),
        outputs: tx
            .output
            .iter()
            .map(|output| WireOutput {
                value_sat: output.value.to_sat() as i64,
                script_pubkey_hex: hex::encode(output.script_pubkey.as_bytes()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::absolute::LockTime;
    use bitcoin::script::ScriptBuf;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, Sequence, Txid, TxIn, TxOut, Witness};
    use std::str::FromStr;

    fn sample_tx() -> Transaction {
        let txid =
            Txid::from_str("4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33")
                .unwrap();
        Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::new(txid, 0),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(90_000),
                script_pubkey: ScriptBuf::new(),
            }],
        }
    }

    /// Property 2: deserialize(serialize(deserialize(b))) = deserialize(b).
    #[test]
    fn serialize_deserialize_round_trips() {
        let tx = sample_tx();
        let bytes = serialize_tx(&tx);
        let decoded = deserialize_tx(&bytes).unwrap();
        assert_eq!(decoded, tx);

        let bytes2 = serialize_tx(&decoded);
        let decoded2 = deserialize_tx(&bytes2).unwrap();
        assert_eq!(decoded2, decoded);
    }

    #[test]
    fn deserialize_garbage_is_error() {
        assert!(deserialize_tx(&[0xff, 0x00, 0x01]).is_err());
    }

    #[test]
    fn txid_is_big_endian_displayed() {
        let tx = sample_tx();
        let txid = txid_of(&tx);
        assert_eq!(txid.len(), 64);
        assert!(hex::decode(&txid).is_ok());
    }

    #[test]
    fn to_wire_projects_version_and_locktime() {
        let tx = sample_tx();
        let wire = to_wire(&tx);
        assert_eq!(wire.version, 2);
        assert_eq!(wire.locktime, 0);
        assert_eq!(wire.inputs.len(), 1);
        assert_eq!(wire.outputs.len(), 1);
        assert_eq!(wire.outputs[0].value_sat, 90_000);
    }
}
