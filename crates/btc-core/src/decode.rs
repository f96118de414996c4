use bitcoin::address::Address;

use crate::error::CoreError;
use crate::network::BtcNetwork;
use crate::resolver::{OfflineResolver, ResolvedOutput, Resolver};
use crate::sighash::{build_unsigned, DeclaredInput, DeclaredOutput};
use crate::transaction::{deserialize_tx, WireOutput};

/// A single resolved, decoded input: the outpoint it spends plus the value
/// and address recovered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInput {
    pub prev_txid: String,
    pub prev_vout: u32,
    pub value_sat: i64,
    pub address: String,
}

/// A transaction recovered from raw bytes: its structure, the resolved
/// input values/addresses, output values/addresses, the recomputed legacy
/// sighashes, and the fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTx {
    pub txid: String,
    pub version: i32,
    pub locktime: u32,
    pub inputs: Vec<DecodedInput>,
    pub outputs: Vec<WireOutput>,
    pub sighashes: Vec<[u8; 32]>,
    pub fee_sat: i64,
}

fn first_address_on_script(
    script_pubkey: &bitcoin::ScriptBuf,
    network: BtcNetwork,
) -> Result<String, CoreError> {
    Address::from_script(script_pubkey, network.to_bitcoin_network())
        .map(|addr| addr.to_string())
        .map_err(|e| CoreError::AddressMissingOnScript(format!("{e}")))
}

/// Decode a raw transaction, recovering input values/addresses via a
/// resolver, recomputing sighashes, optionally verifying every input's
/// script, and computing the fee.
///
/// `declared_inputs`, when non-empty, switches to offline resolution and
/// requires exactly one declared entry per transaction input
/// (`InputCountMismatch` otherwise). An empty slice means resolution goes
/// through `online_resolver`.
pub fn decode(
    raw_bytes: &[u8],
    declared_inputs: &[crate::resolver::DeclaredPrevOutput],
    online_resolver: Option<&dyn Resolver>,
    verify: bool,
    network: BtcNetwork,
) -> Result<DecodedTx, CoreError> {
    let tx = deserialize_tx(raw_bytes)?;

    if !declared_inputs.is_empty() && declared_inputs.len() != tx.input.len() {
        return Err(CoreError::InputCountMismatch(format!(
            "{} declared input(s) for {} transaction input(s)",
            declared_inputs.len(),
            tx.input.len()
        )));
    }

    let offline_resolver;
    let resolver: &dyn Resolver = if !declared_inputs.is_empty() {
        offline_resolver = OfflineResolver::new(declared_inputs.to_vec());
        &offline_resolver
    } else {
        online_resolver.ok_or_else(|| {
            CoreError::PrevTxNotFound(
                "no declared inputs and no online resolver provided".to_string(),
            )
        })?
    };

    let mut decoded_inputs = Vec::with_capacity(tx.input.len());
    let mut declared_for_sighash = Vec::with_capacity(tx.input.len());

    for (i, input) in tx.input.iter().enumerate() {
        let ResolvedOutput { value_sat, address } = resolver
            .resolve(input.previous_output.txid, input.previous_output.vout)
            .map_err(|e| CoreError::PrevTxNotFound(format!("input {i}: {e}")))?;

        if verify {
            let script_pubkey = address
                .parse::<Address<bitcoin::address::NetworkUnchecked>>()
                .map_err(|e| CoreError::BadAddress(format!("input {i}: {e}")))?
                .require_network(network.to_bitcoin_network())
                .map_err(|e| CoreError::BadAddress(format!("input {i}: {e}")))?
                .script_pubkey();
            let amount = bitcoin::Amount::from_sat(value_sat.max(0) as u64);
            script_pubkey
                .verify(i, amount, raw_bytes)
                .map_err(|e| CoreError::ScriptVerifyFailed(format!("input {i}: {e}")))?;
        }

        declared_for_sighash.push(DeclaredInput {
            txid: input.previous_output.txid,
            vout: input.previous_output.vout,
            value_sat,
            address: address.clone(),
        });

        decoded_inputs.push(DecodedInput {
            prev_txid: input.previous_output.txid.to_string(),
            prev_vout: input.previous_output.vout,
            value_sat,
            address,
        });
    }

    let mut decoded_outputs = Vec::with_capacity(tx.output.len());
    let mut declared_outputs_for_sighash = Vec::with_capacity(tx.output.len());
    for output in &tx.output {
        let address = first_address_on_script(&output.script_pubkey, network)?;
        let value_sat = output.value.to_sat() as i64;
        declared_outputs_for_sighash.push(DeclaredOutput {
            address: address.clone(),
            value_sat,
        });
        decoded_outputs.push(WireOutput {
            value_sat,
            script_pubkey_hex: hex::encode(output.script_pubkey.as_bytes()),
        });
    }

    let sighashes = build_unsigned(&declared_for_sighash, &declared_outputs_for_sighash, network)?
        .sighashes;

    let total_in: i64 = decoded_inputs.iter().map(|i| i.value_sat).sum();
    let total_out: i64 = decoded_outputs.iter().map(|o| o.value_sat).sum();
    let fee_sat = total_in - total_out;
    if fee_sat < 0 {
        return Err(CoreError::NegativeFee(fee_sat.to_string()));
    }

    Ok(DecodedTx {
        txid: tx.compute_txid().to_string(),
        version: tx.version.0,
        locktime: tx.lock_time.to_consensus_u32(),
        inputs: decoded_inputs,
        outputs: decoded_outputs,
        sighashes,
        fee_sat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DeclaredPrevOutput;
    use crate::sighash::build_unsigned;
    use std::str::FromStr;

    fn prev_txid() -> bitcoin::Txid {
        bitcoin::Txid::from_str(
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33",
        )
        .unwrap()
    }

    fn declared(value_sat: i64, address: &str) -> DeclaredPrevOutput {
        DeclaredPrevOutput {
            txid: prev_txid(),
            vout: 0,
            value_sat,
            address: address.to_string(),
        }
    }

    /// S4: fee arithmetic example from the spec (1.5 BTC in, 1.4999 BTC out).
    #[test]
    fn s4_fee_arithmetic() {
        let input = DeclaredInput {
            txid: prev_txid(),
            vout: 0,
            value_sat: crate::value::btc_to_sat("1.5").unwrap(),
            address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
        };
        let output = DeclaredOutput {
            address: "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(),
            value_sat: crate::value::btc_to_sat("1.4999").unwrap(),
        };
        let unsigned = build_unsigned(&[input.clone()], &[output], BtcNetwork::Mainnet).unwrap();

        let decoded = decode(
            &unsigned.raw_bytes,
            &[declared(input.value_sat, &input.address)],
            None,
            false,
            BtcNetwork::Mainnet,
        )
        .unwrap();

        assert_eq!(decoded.fee_sat, 10_000);
    }

    /// S5: negative fee is detected and returned as an error.
    #[test]
    fn s5_negative_fee_is_detected() {
        let input = DeclaredInput {
            txid: prev_txid(),
            vout: 0,
            value_sat: 50_000,
            address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string(),
        };
        let output = DeclaredOutput {
            address: "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(),
            value_sat: 90_000,
        };
        let unsigned = build_unsigned(&[input.clone()], &[output], BtcNetwork::Mainnet).unwrap();

        let result = decode(
            &unsigned.raw_bytes,
            &[declared(input.value_sat, &input.address)],
            None,
            false,
            BtcNetwork::Mainnet,
        );

        assert!(matches!(result, Err(CoreError::NegativeFee(_))));
    }

    #[test]
    fn input_count_mismatch_is_rejected() {
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
        let unsigned = build_unsigned(&[input], &[output], BtcNetwork::Mainnet).unwrap();

        let result = decode(
            &unsigned.raw_bytes,
            &[
                declared(100_000, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
                declared(100_000, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"),
            ],
            None,
            false,
            BtcNetwork::Mainnet,
        );
        assert!(matches!(result, Err(CoreError::InputCountMismatch(_))));
    }

    #[test]
    fn no_resolver_available_is_rejected() {
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
        let unsigned = build_unsigned(&[input], &[output], BtcNetwork::Mainnet).unwrap();

        let result = decode(&unsigned.raw_bytes, &[], None, false, BtcNetwork::Mainnet);
        assert!(result.is_err());
    }
}
