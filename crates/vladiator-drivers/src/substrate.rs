// Path: crates/vladiator-drivers/src/substrate.rs
//! The substrate-family driver: WebSocket RPC (spec §4.1, optional variant).
//!
//! `transactionHash` on this family has the shape `<blockNumber>-<extrinsicIndex>`.
//! Receipts are synthesized by walking block events and filtering `Log`
//! events whose EVM-compatible address equals the message contract, rather
//! than fetched directly the way an EVM `eth_getTransactionReceipt` would.

use crate::abi::canonical_digest;
use crate::driver::{CanonicalTuple, ChainDriver, DriverError};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use serde_json::Value;
use vladiator_api::crypto::{SerializableKey, SigningKeyPair};
use vladiator_crypto::sign::substrate::SubstrateKeyPair;
use vladiator_types::message::{ChainId, Message, Values};

/// A substrate-family driver: connects over WebSocket RPC and signs with
/// sr25519 instead of secp256k1.
pub struct SubstrateDriver {
    chain_id: u64,
    client: WsClient,
    message_contract: String,
    signing_key: SubstrateKeyPair,
}

impl SubstrateDriver {
    /// Opens a WebSocket RPC session (spec §4.1's `connect`).
    pub async fn connect(
        chain_id: u64,
        ws_url: &str,
        message_contract: &str,
        signing_key: SubstrateKeyPair,
    ) -> Result<Self, DriverError> {
        let client = WsClientBuilder::default()
            .build(ws_url)
            .await
            .map_err(|e| DriverError::Connect(e.to_string()))?;
        Ok(Self {
            chain_id,
            client,
            message_contract: message_contract.to_lowercase(),
            signing_key,
        })
    }

    /// Parses the substrate-family `<blockNumber>-<extrinsicIndex>` hash shape.
    fn parse_transaction_hash(transaction_hash: &str) -> Result<(u64, u32), DriverError> {
        let (block, idx) = transaction_hash
            .split_once('-')
            .ok_or_else(|| DriverError::Decode("expected <block>-<extrinsicIndex>".into()))?;
        let block = block
            .parse()
            .map_err(|_| DriverError::Decode("bad block number".into()))?;
        let idx = idx
            .parse()
            .map_err(|_| DriverError::Decode("bad extrinsic index".into()))?;
        Ok((block, idx))
    }

    async fn fetch_block_events(&self, block_number: u64) -> Result<Vec<Value>, DriverError> {
        let block_hash: String = self
            .client
            .request("chain_getBlockHash", rpc_params![block_number])
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        let events: Vec<Value> = self
            .client
            .request("state_getStorage", rpc_params![block_hash])
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        Ok(events)
    }
}

#[async_trait]
impl ChainDriver for SubstrateDriver {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer_identity(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.public_key().to_bytes()))
    }

    async fn ping(&self) -> Result<(), DriverError> {
        let _: String = self
            .client
            .request("system_health", rpc_params![])
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        Ok(())
    }

    async fn populate_message(&self, mut message: Message) -> Result<Message, DriverError> {
        let (block, extrinsic_index) = Self::parse_transaction_hash(&message.transaction_hash)?;
        let events = self.fetch_block_events(block).await?;

        let matching = events.iter().find(|e| {
            e.get("extrinsicIndex").and_then(Value::as_u64) == Some(extrinsic_index as u64)
                && e.get("address")
                    .and_then(Value::as_str)
                    .map(|a| a.to_lowercase() == self.message_contract)
                    .unwrap_or(false)
        });

        let Some(event) = matching else {
            message.values = None;
            return Ok(message);
        };

        message.values = Some(Values {
            tx_id: event
                .get("txId")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            sender: event
                .get("sender")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            recipient: event
                .get("recipient")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            chain: event
                .get("chain")
                .and_then(Value::as_u64)
                .map(ChainId)
                .unwrap_or(ChainId(0)),
            express: event
                .get("express")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            encoded_data: event
                .get("data")
                .and_then(Value::as_str)
                .map(|s| hex::decode(s.trim_start_matches("0x")).unwrap_or_default())
                .unwrap_or_default(),
            confirmations: 0,
        });

        Ok(message)
    }

    async fn is_message_valid(&self, message: &Message) -> Result<bool, DriverError> {
        let Some(claimed) = &message.values else {
            return Ok(false);
        };
        let repopulated = self.populate_message(message.clone()).await?;
        Ok(repopulated.values.as_ref() == Some(claimed))
    }

    async fn is_message_processed(&self, tx_id: &str) -> Result<bool, DriverError> {
        let result: Option<bool> = self
            .client
            .request(
                "state_call",
                rpc_params!["MessageApi_processed_transfers", tx_id],
            )
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        Ok(result.unwrap_or(false))
    }

    async fn sign_transaction_data(&self, tuple: &CanonicalTuple) -> Result<String, DriverError> {
        let digest = canonical_digest(tuple).map_err(DriverError::Decode)?;
        let signature = self
            .signing_key
            .sign(&digest)
            .map_err(DriverError::Sign)?;
        Ok(format!("0x{}", hex::encode(signature.to_bytes())))
    }

    async fn get_chainsig(&self) -> Result<String, DriverError> {
        let result: String = self
            .client
            .request("state_call", rpc_params!["MessageApi_chainsig"])
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        Ok(result)
    }

    async fn get_exsig(&self, project: &str) -> Result<Option<String>, DriverError> {
        let result: Option<String> = self
            .client
            .request("state_call", rpc_params!["MessageApi_exsig", project])
            .await
            .map_err(|e| DriverError::Rpc(e.to_string()))?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_block_extrinsic_shape() {
        let (block, idx) = SubstrateDriver::parse_transaction_hash("1234-5").unwrap();
        assert_eq!(block, 1234);
        assert_eq!(idx, 5);
    }

    #[test]
    fn rejects_evm_style_hash() {
        assert!(SubstrateDriver::parse_transaction_hash("0xabc123").is_err());
    }
}
