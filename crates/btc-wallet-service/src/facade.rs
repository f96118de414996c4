use bitcoincore_rpc::json::GetBlockHeaderResult;
use tracing::warn;

use btc_core::decode::{self, DecodedTx};
use btc_core::network::BtcNetwork;
use btc_core::resolver::{DeclaredPrevOutput, OfflineResolver, Resolver};
use btc_core::sighash::{self, DeclaredInput, DeclaredOutput, UnsignedTxArtifact};
use btc_core::signer::{self, LowSPolicy, SignedTxArtifact};
use btc_core::transaction::{deserialize_tx, serialize_tx, txid_of};
use btc_core::{address, value};

use btc_explorer::types::{AddressHistory, TxItem, UnspentOutput};
use btc_explorer::ExplorerClient;
use btc_fee_api::{FeeApiClient, FeeTiers};
use btc_node_rpc::NodeRpcClient;

use crate::config::ServiceConfig;
use crate::error::FacadeError;

/// A decoded block: its height/hash and every transaction in it, resolved
/// the same way a standalone decode would resolve them.
#[derive(Debug, Clone)]
pub struct DecodedBlock {
    pub hash: String,
    pub height: u64,
    pub txs: Vec<DecodedTx>,
}

/// One entry of an address's transaction history, with direction inferred
/// relative to the queried address: `0` if the address appears among the
/// transaction's inputs (outgoing), `1` otherwise (incoming).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTxSummary {
    pub txid: String,
    pub direction: u8,
    pub block_height: Option<u64>,
    pub time: u64,
}

fn infer_direction(tx: &TxItem, queried_address: &str) -> u8 {
    let is_outgoing = tx
        .inputs
        .iter()
        .any(|input| input.prev_out.addr.as_deref() == Some(queried_address));
    if is_outgoing {
        0
    } else {
        1
    }
}

/// Composes the core codec/sighash/signer/decode pipeline with the three
/// injected collaborators (node RPC, block explorer, fee estimator) behind
/// one query surface. Holds no wallet keys and signs nothing itself — every
/// signature this façade attaches was produced by the caller.
pub struct WalletFacade {
    node: NodeRpcClient,
    explorer: ExplorerClient,
    fee_api: FeeApiClient,
    network: BtcNetwork,
}

impl WalletFacade {
    pub fn new(config: &ServiceConfig) -> Result<Self, FacadeError> {
        let node = NodeRpcClient::new(
            &config.node_rpc_url,
            &config.node_rpc_user,
            &config.node_rpc_pass,
        )?;
        Ok(Self {
            node,
            explorer: ExplorerClient::new(config.explorer_url.clone()),
            fee_api: FeeApiClient::new(config.fee_api_url.clone()),
            network: config.network,
        })
    }

    // -- Address ----------------------------------------------------------

    pub fn convert_address(
        &self,
        pubkey_bytes: &[u8; 33],
        format: address::AddressFormat,
    ) -> Result<String, FacadeError> {
        Ok(address::convert_address(pubkey_bytes, format, self.network)?)
    }

    pub fn valid_address(&self, candidate: &str) -> bool {
        address::valid_address(candidate, self.network)
    }

    // -- Blocks -------------------------------------------------------------

    pub fn block_count(&self) -> Result<u64, FacadeError> {
        Ok(self.node.block_count()?)
    }

    pub fn block_header_by_hash(&self, hash: &str) -> Result<GetBlockHeaderResult, FacadeError> {
        let hash = hash
            .parse()
            .map_err(|_| FacadeError::BadHex(hash.to_string()))?;
        Ok(self.node.block_header(&hash)?)
    }

    /// `height == 0` means the chain tip.
    pub fn block_header_by_number(&self, height: u64) -> Result<GetBlockHeaderResult, FacadeError> {
        let height = if height == 0 {
            self.node.block_count()?
        } else {
            height
        };
        let hash = self.node.block_hash(height)?;
        Ok(self.node.block_header(&hash)?)
    }

    #[tracing::instrument(skip(self))]
    pub fn block_by_hash(&self, hash: &str) -> Result<DecodedBlock, FacadeError> {
        let block_hash = hash
            .parse()
            .map_err(|_| FacadeError::BadHex(hash.to_string()))?;
        self.decode_block(block_hash)
    }

    /// `height == 0` means the chain tip.
    #[tracing::instrument(skip(self))]
    pub fn block_by_number(&self, height: u64) -> Result<DecodedBlock, FacadeError> {
        let height = if height == 0 {
            self.node.block_count()?
        } else {
            height
        };
        let block_hash = self.node.block_hash(height)?;
        self.decode_block(block_hash)
    }

    fn decode_block(&self, block_hash: bitcoin::BlockHash) -> Result<DecodedBlock, FacadeError> {
        let block = self.node.block(&block_hash)?;
        let header_info = self.node.block_header(&block_hash)?;

        // Block transactions don't carry the value of what they spend (see
        // the decode module's doc comment); each one still needs a resolver
        // pass over its inputs, exactly like a standalone decode.
        let mut txs = Vec::with_capacity(block.txdata.len());
        for tx in &block.txdata {
            let raw_bytes = serialize_tx(tx);
            let decoded = decode::decode(&raw_bytes, &[], Some(&self.node), false, self.network)?;
            txs.push(decoded);
        }

        Ok(DecodedBlock {
            hash: block_hash.to_string(),
            height: header_info.height as u64,
            txs,
        })
    }

    // -- Explorer-backed reads ----------------------------------------------

    pub async fn balance(&self, address: &str) -> Result<i64, FacadeError> {
        Ok(self.explorer.get_balance(address).await?)
    }

    pub async fn unspent_outputs(&self, address: &str) -> Result<Vec<UnspentOutput>, FacadeError> {
        Ok(self.explorer.get_unspent_outputs(address).await?)
    }

    pub async fn tx_by_hash(&self, txid: &str) -> Result<TxItem, FacadeError> {
        Ok(self.explorer.get_tx_by_hash(txid).await?)
    }

    pub async fn list_tx_by_address(
        &self,
        address: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<AddressTxSummary>, FacadeError> {
        let history: AddressHistory = self
            .explorer
            .list_tx_by_address(address, page, page_size)
            .await?;
        Ok(history
            .txs
            .iter()
            .map(|tx| AddressTxSummary {
                txid: tx.hash.clone(),
                direction: infer_direction(tx, address),
                block_height: tx.block_height,
                time: tx.time,
            })
            .collect())
    }

    // -- Fee estimation -------------------------------------------------------

    pub async fn fee(&self) -> Result<FeeTiers, FacadeError> {
        Ok(self.fee_api.get_fee().await?)
    }

    // -- Broadcast --------------------------------------------------------

    /// Broadcast a raw transaction. The node's returned txid is authoritative;
    /// a mismatch against the locally-computed txid is logged as a warning,
    /// not raised as an error, since the node already accepted the tx.
    #[tracing::instrument(skip(self))]
    pub fn send_tx(&self, raw_hex: &str) -> Result<String, FacadeError> {
        let raw_bytes = hex::decode(raw_hex).map_err(|_| FacadeError::BadHex(raw_hex.to_string()))?;
        let tx = deserialize_tx(&raw_bytes)?;
        let local_txid = txid_of(&tx);

        let broadcast_txid = self.node.send_raw_transaction(&tx)?;
        if broadcast_txid.to_string() != local_txid {
            warn!(
                local_txid,
                broadcast_txid = %broadcast_txid,
                "node-reported txid differs from locally computed txid"
            );
        }
        Ok(broadcast_txid.to_string())
    }

    // -- Transaction construction / signing / decoding -----------------------

    pub fn create_unsigned_tx(
        &self,
        inputs: &[DeclaredInput],
        outputs: &[DeclaredOutput],
    ) -> Result<UnsignedTxArtifact, FacadeError> {
        Ok(sighash::build_unsigned(inputs, outputs, self.network)?)
    }

    pub fn create_unsigned_segwit_tx(
        &self,
        inputs: &[DeclaredInput],
        outputs: &[DeclaredOutput],
    ) -> Result<UnsignedTxArtifact, FacadeError> {
        Ok(sighash::build_unsigned_segwit(inputs, outputs, self.network)?)
    }

    #[tracing::instrument(skip(self, raw_tx_bytes, signatures, public_keys, declared_inputs))]
    pub fn build_signed_tx(
        &self,
        raw_tx_bytes: &[u8],
        signatures: &[[u8; 64]],
        public_keys: &[Vec<u8>],
        declared_inputs: &[DeclaredPrevOutput],
        low_s_policy: LowSPolicy,
    ) -> Result<SignedTxArtifact, FacadeError> {
        let offline_resolver;
        let resolver: &dyn Resolver = if declared_inputs.is_empty() {
            &self.node
        } else {
            offline_resolver = OfflineResolver::new(declared_inputs.to_vec());
            &offline_resolver
        };
        Ok(signer::build_signed(
            raw_tx_bytes,
            signatures,
            public_keys,
            resolver,
            self.network,
            low_s_policy,
        )?)
    }

    #[tracing::instrument(skip(self, raw_bytes, declared_inputs))]
    pub fn decode_tx(
        &self,
        raw_bytes: &[u8],
        declared_inputs: &[DeclaredPrevOutput],
        verify: bool,
    ) -> Result<DecodedTx, FacadeError> {
        Ok(decode::decode(
            raw_bytes,
            declared_inputs,
            Some(&self.node),
            verify,
            self.network,
        )?)
    }

    /// Verify every input of a signed transaction against the Bitcoin Script
    /// engine. A verification failure resolves to `Ok(false)` rather than an
    /// error: the caller asked a yes/no question, not for the failure detail
    /// (use [`Self::decode_tx`] with `verify: true` for that).
    pub fn verify_signed_tx(
        &self,
        raw_bytes: &[u8],
        declared_inputs: &[DeclaredPrevOutput],
    ) -> Result<bool, FacadeError> {
        match decode::decode(raw_bytes, declared_inputs, Some(&self.node), true, self.network) {
            Ok(_) => Ok(true),
            Err(btc_core::error::CoreError::ScriptVerifyFailed(_)) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }

    // -- Value codec passthrough --------------------------------------------

    pub fn btc_to_sat(&self, btc: &str) -> Result<i64, FacadeError> {
        Ok(value::btc_to_sat(btc)?)
    }

    pub fn sat_to_btc(&self, sats: i64) -> String {
        value::sat_to_btc(sats)
    }
}
