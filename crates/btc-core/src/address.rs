use bitcoin::address::Address;
use bitcoin::key::{PublicKey, TapTweak};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{CompressedPublicKey, WitnessProgram, WitnessVersion};

use crate::error::CoreError;
use crate::network::BtcNetwork;

/// The four address formats this core can derive from a compressed
/// public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFormat {
    P2pkh,
    P2wpkh,
    /// P2SH wrapping a P2WPKH redeem script (BIP141 nested SegWit).
    P2sh,
    /// Taproot, serialized per the untweaked choice (see [`p2tr_untweaked`]).
    P2tr,
}

fn parse_compressed(pubkey_bytes: &[u8; 33]) -> Result<CompressedPublicKey, CoreError> {
    CompressedPublicKey::from_slice(pubkey_bytes)
        .map_err(|e| CoreError::BadPublicKey(format!("failed to parse compressed public key: {e}")))
}

/// Derive a P2PKH (legacy, base58check) address from a compressed public key.
pub fn p2pkh(pubkey_bytes: &[u8; 33], network: BtcNetwork) -> Result<String, CoreError> {
    let pk = PublicKey::from_slice(pubkey_bytes)
        .map_err(|e| CoreError::BadPublicKey(format!("failed to parse public key: {e}")))?;
    let address = Address::p2pkh(pk, network.to_bitcoin_network());
    Ok(address.to_string())
}

/// Derive a P2WPKH (native SegWit, bech32) address from a compressed public key.
pub fn p2wpkh(pubkey_bytes: &[u8; 33], network: BtcNetwork) -> Result<String, CoreError> {
    let compressed_pk = parse_compressed(pubkey_bytes)?;
    let address = Address::p2wpkh(&compressed_pk, network.to_bitcoin_network());
    Ok(address.to_string())
}

/// Derive a P2SH address wrapping a P2WPKH redeem script (nested SegWit).
pub fn p2sh_p2wpkh(pubkey_bytes: &[u8; 33], network: BtcNetwork) -> Result<String, CoreError> {
    let compressed_pk = parse_compressed(pubkey_bytes)?;
    let redeem_script = bitcoin::ScriptBuf::new_p2wpkh(&compressed_pk.wpubkey_hash());
    let address = Address::p2sh(&redeem_script, network.to_bitcoin_network())
        .map_err(|e| CoreError::ScriptBuildFailed(format!("failed to build p2sh redeem script: {e}")))?;
    Ok(address.to_string())
}

/// Derive a Taproot (bech32m) address serializing the *untweaked* x-only
/// public key as the output key.
///
/// This reproduces the upstream service's choice verbatim (see the design
/// notes for why this is flagged rather than silently "fixed"): BIP341
/// defines the output key as the *tweaked* key, which [`p2tr_tweaked`]
/// computes correctly. `convert_address` with [`AddressFormat::P2tr`] calls
/// this function, matching the source's behavior.
pub fn p2tr_untweaked(pubkey_bytes: &[u8; 33], network: BtcNetwork) -> Result<String, CoreError> {
    let compressed_pk = parse_compressed(pubkey_bytes)?;
    let (x_only, _parity) = compressed_pk.0.x_only_public_key();
    let program = WitnessProgram::new(WitnessVersion::V1, &x_only.serialize())
        .map_err(|e| CoreError::ScriptBuildFailed(format!("bad taproot program: {e}")))?;
    let address = Address::from_witness_program(program, network.to_bitcoin_network());
    Ok(address.to_string())
}

/// Derive a Taproot (bech32m) address the BIP341-correct way: the output
/// key is the internal key tweaked with the (empty, key-path-only) taproot
/// commitment.
pub fn p2tr_tweaked(pubkey_bytes: &[u8; 33], network: BtcNetwork) -> Result<String, CoreError> {
    let compressed_pk = parse_compressed(pubkey_bytes)?;
    let (x_only, _parity) = compressed_pk.0.x_only_public_key();
    let secp = Secp256k1::verification_only();
    let (tweaked, _parity) = x_only.tap_tweak(&secp, None);
    let address = Address::p2tr_tweaked(tweaked, network.to_bitcoin_network());
    Ok(address.to_string())
}

/// Derive an address of the given format from a 33-byte compressed public key.
pub fn convert_address(
    pubkey_bytes: &[u8; 33],
    format: AddressFormat,
    network: BtcNetwork,
) -> Result<String, CoreError> {
    match format {
        AddressFormat::P2pkh => p2pkh(pubkey_bytes, network),
        AddressFormat::P2wpkh => p2wpkh(pubkey_bytes, network),
        AddressFormat::P2sh => p2sh_p2wpkh(pubkey_bytes, network),
        AddressFormat::P2tr => p2tr_untweaked(pubkey_bytes, network),
    }
}

/// Validate a Bitcoin address string for the given network.
///
/// This is a predicate, not a fallible operation: a parse failure or a
/// network mismatch both resolve to `Ok(false)`, per §7 of the spec
/// ("Validation is a predicate that does not raise on malformed input").
pub fn valid_address(address: &str, network: BtcNetwork) -> bool {
    let Ok(parsed) = address.parse::<Address<bitcoin::address::NetworkUnchecked>>() else {
        return false;
    };
    parsed.is_valid_for_network(network.to_bitcoin_network())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SATOSHI_PUBKEY: &str =
        "0279BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798";

    fn satoshi_pubkey_bytes() -> [u8; 33] {
        hex::decode(SATOSHI_PUBKEY).unwrap().try_into().unwrap()
    }

    /// S1 from the testable-properties scenarios.
    #[test]
    fn s1_convert_p2pkh() {
        let address = p2pkh(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        assert_eq!(address, "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    #[test]
    fn p2wpkh_mainnet_test_vector() {
        let address = p2wpkh(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        assert_eq!(address, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
    }

    #[test]
    fn p2sh_p2wpkh_starts_with_3() {
        let address = p2sh_p2wpkh(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        assert!(address.starts_with('3'), "expected 3-prefix, got {address}");
    }

    #[test]
    fn p2tr_untweaked_starts_with_bc1p() {
        let address = p2tr_untweaked(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        assert!(address.starts_with("bc1p"), "expected bc1p prefix, got {address}");
    }

    #[test]
    fn p2tr_tweaked_differs_from_untweaked() {
        let untweaked = p2tr_untweaked(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        let tweaked = p2tr_tweaked(&satoshi_pubkey_bytes(), BtcNetwork::Mainnet).unwrap();
        assert_ne!(untweaked, tweaked);
        assert!(tweaked.starts_with("bc1p"));
    }

    #[test]
    fn invalid_pubkey_returns_error() {
        let bad_bytes = [0u8; 33];
        assert!(p2wpkh(&bad_bytes, BtcNetwork::Mainnet).is_err());
        assert!(p2pkh(&bad_bytes, BtcNetwork::Mainnet).is_err());
    }

    #[test]
    fn convert_address_dispatches_by_format() {
        let bytes = satoshi_pubkey_bytes();
        assert_eq!(
            convert_address(&bytes, AddressFormat::P2pkh, BtcNetwork::Mainnet).unwrap(),
            p2pkh(&bytes, BtcNetwork::Mainnet).unwrap()
        );
        assert_eq!(
            convert_address(&bytes, AddressFormat::P2wpkh, BtcNetwork::Mainnet).unwrap(),
            p2wpkh(&bytes, BtcNetwork::Mainnet).unwrap()
        );
    }

    /// Property 1: every address this core derives validates against
    /// the same network.
    #[test]
    fn derived_addresses_are_all_valid() {
        let bytes = satoshi_pubkey_bytes();
        for format in [
            AddressFormat::P2pkh,
            AddressFormat::P2wpkh,
            AddressFormat::P2sh,
            AddressFormat::P2tr,
        ] {
            let address = convert_address(&bytes, format, BtcNetwork::Mainnet).unwrap();
            assert!(
                valid_address(&address, BtcNetwork::Mainnet),
                "{address} ({format:?}) did not validate"
            );
        }
    }

    #[test]
    fn validate_known_mainnet_address() {
        assert!(valid_address(
            "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
            BtcNetwork::Mainnet,
        ));
    }

    #[test]
    fn validate_garbage_address_returns_false_not_error() {
        assert!(!valid_address("notanaddress!!!", BtcNetwork::Mainnet));
    }

    #[test]
    fn validate_p2pkh_mainnet_address() {
        assert!(valid_address(
            "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa",
            BtcNetwork::Mainnet,
        ));
    }
}
