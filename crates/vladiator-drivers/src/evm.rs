// Path: crates/vladiator-drivers/src/evm.rs
//! The EVM-family chain driver: JSON-RPC over HTTP (spec §4.1).

use crate::abi::{canonical_digest, SEND_MESSAGE_WITH_FEATURE_TOPIC, SEND_REQUESTED_TOPIC};
use crate::driver::{CanonicalTuple, ChainDriver, DriverError};
use crate::gateway;
use async_trait::async_trait;
use ethers::abi::{decode, ParamType, Token};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, TransactionReceipt, H256};
use std::str::FromStr;
use std::time::Duration;
use vladiator_crypto::sign::evm::EvmKeyPair;
use vladiator_types::message::{Message, Values};

/// An EVM-family driver: connects over JSON-RPC, decodes `SendRequested`-family
/// logs, and signs with secp256k1 personal-message framing.
pub struct EvmDriver {
    chain_id: u64,
    provider: Provider<Http>,
    message_contract: Address,
    default_confirmations: u32,
    signing_key: EvmKeyPair,
}

impl EvmDriver {
    /// Opens an HTTP JSON-RPC session and validates the message-contract
    /// address is well-formed (spec §4.1's `connect`).
    pub fn connect(
        chain_id: u64,
        rpc_url: &str,
        message_contract: &str,
        default_confirmations: u32,
        signing_key: EvmKeyPair,
    ) -> Result<Self, DriverError> {
        let provider =
            Provider::<Http>::try_from(rpc_url).map_err(|e| DriverError::Connect(e.to_string()))?;
        let message_contract =
            Address::from_str(message_contract).map_err(|e| DriverError::Connect(e.to_string()))?;
        Ok(Self {
            chain_id,
            provider,
            message_contract,
            default_confirmations,
            signing_key,
        })
    }

    async fn fetch_receipt(&self, transaction_hash: &str) -> Result<TransactionReceipt, DriverError> {
        let hash = H256::from_str(transaction_hash)
            .map_err(|e| DriverError::Decode(format!("bad transaction hash: {e}")))?;
        // The RPC call itself is retried on transient failure; a receipt
        // that genuinely isn't there yet is not, since retrying won't make
        // it appear within this call (the coordinator's own retry bound
        // covers that case across a later re-delivered REQUEST).
        let receipt = gateway::with_retry("eth_getTransactionReceipt", || async {
            self.provider
                .get_transaction_receipt(hash)
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;
        receipt.ok_or_else(|| DriverError::Rpc("receipt not found".into()))
    }

    async fn confirmations_for(&self, receipt: &TransactionReceipt) -> Result<u64, DriverError> {
        let Some(block_number) = receipt.block_number else {
            return Ok(0);
        };
        let head = gateway::with_retry("eth_blockNumber", || async {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;
        Ok(head.saturating_sub(block_number).as_u64() + 1)
    }

    /// The required confirmation count for a request: the event's own
    /// `uint16` field if it carries one, else the network's configured
    /// `default_confirmations` floor (spec §4.1: "at least `m.values.
    /// confirmations` confirmations").
    fn required_confirmations(&self, event_confirmations: u16) -> u32 {
        if event_confirmations > 0 {
            event_confirmations as u32
        } else {
            self.default_confirmations
        }
    }

    fn decode_send_requested(log_data: &[u8]) -> Result<(Values, u16), DriverError> {
        let types = [
            ParamType::Uint(256),
            ParamType::Address,
            ParamType::Address,
            ParamType::Uint(256),
            ParamType::Bool,
            ParamType::Bytes,
            ParamType::Uint(16),
        ];
        let tokens = decode(&types, log_data).map_err(|e| DriverError::Decode(e.to_string()))?;
        let [tx_id, sender, recipient, chain, express, data, confirmations]: [Token; 7] = tokens
            .try_into()
            .map_err(|_| DriverError::Decode("SendRequested: wrong field count".into()))?;

        let tx_id = tx_id
            .into_uint()
            .ok_or_else(|| DriverError::Decode("txId not a uint".into()))?;
        let sender = sender
            .into_address()
            .ok_or_else(|| DriverError::Decode("sender not an address".into()))?;
        let recipient = recipient
            .into_address()
            .ok_or_else(|| DriverError::Decode("recipient not an address".into()))?;
        let chain = chain
            .into_uint()
            .ok_or_else(|| DriverError::Decode("chain not a uint".into()))?;
        let express = express
            .into_bool()
            .ok_or_else(|| DriverError::Decode("express not a bool".into()))?;
        let data = data
            .into_bytes()
            .ok_or_else(|| DriverError::Decode("data not bytes".into()))?;
        let confirmations = confirmations
            .into_uint()
            .ok_or_else(|| DriverError::Decode("confirmations not a uint".into()))?
            .as_u32() as u16;

        Ok((
            Values {
                tx_id: tx_id.to_string(),
                sender: format!("{sender:#x}"),
                recipient: format!("{recipient:#x}"),
                chain: vladiator_types::message::ChainId(chain.as_u64()),
                express,
                encoded_data: data,
                confirmations: confirmations as u32,
            },
            confirmations,
        ))
    }

    fn decode_send_message_with_feature(log_data: &[u8]) -> Result<(u32, Vec<u8>), DriverError> {
        let types = [
            ParamType::Uint(256),
            ParamType::Uint(256),
            ParamType::Uint(32),
            ParamType::Bytes,
        ];
        let tokens = decode(&types, log_data).map_err(|e| DriverError::Decode(e.to_string()))?;
        let [_tx_id, _dest_chain_id, feature_id, feature_data]: [Token; 4] = tokens
            .try_into()
            .map_err(|_| DriverError::Decode("SendMessageWithFeature: wrong field count".into()))?;
        let feature_id = feature_id
            .into_uint()
            .ok_or_else(|| DriverError::Decode("featureId not a uint".into()))?
            .as_u32();
        let feature_data = feature_data
            .into_bytes()
            .ok_or_else(|| DriverError::Decode("featureData not bytes".into()))?;
        Ok((feature_id, feature_data))
    }
}

#[async_trait]
impl ChainDriver for EvmDriver {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer_identity(&self) -> String {
        format!("{:#x}", self.signing_key.address())
    }

    async fn ping(&self) -> Result<(), DriverError> {
        gateway::with_retry("eth_blockNumber", || async {
            self.provider
                .get_block_number()
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;
        Ok(())
    }

    async fn populate_message(&self, mut message: Message) -> Result<Message, DriverError> {
        let receipt = match self.fetch_receipt(&message.transaction_hash).await {
            Ok(r) => r,
            Err(DriverError::Rpc(e)) if e.contains("not found") => {
                message.values = None;
                return Ok(message);
            }
            Err(e) => return Err(e),
        };

        let send_requested = receipt.logs.iter().find(|log| {
            log.address == self.message_contract
                && log.topics.first().map(|t| t.as_bytes()) == Some(SEND_REQUESTED_TOPIC.as_ref())
        });

        let Some(log) = send_requested else {
            message.values = None;
            return Ok(message);
        };

        let (mut values, event_confirmations) = Self::decode_send_requested(&log.data)?;
        values.confirmations = self.required_confirmations(event_confirmations);
        message.values = Some(values);

        if let Some(feature_log) = receipt.logs.iter().find(|log| {
            log.address == self.message_contract
                && log.topics.first().map(|t| t.as_bytes())
                    == Some(SEND_MESSAGE_WITH_FEATURE_TOPIC.as_ref())
        }) {
            let (feature_id, feature_data) = Self::decode_send_message_with_feature(&feature_log.data)?;
            message.feature_id = Some(feature_id);
            message.feature_data = Some(feature_data);
        }

        Ok(message)
    }

    async fn is_message_valid(&self, message: &Message) -> Result<bool, DriverError> {
        let Some(claimed) = &message.values else {
            return Ok(false);
        };
        let receipt = self.fetch_receipt(&message.transaction_hash).await?;
        let observed = self.confirmations_for(&receipt).await?;

        let Some(log) = receipt.logs.iter().find(|log| {
            log.address == self.message_contract
                && log.topics.first().map(|t| t.as_bytes()) == Some(SEND_REQUESTED_TOPIC.as_ref())
        }) else {
            return Ok(false);
        };

        let (on_chain, event_confirmations) = Self::decode_send_requested(&log.data)?;
        let required = self.required_confirmations(event_confirmations);

        let addresses_match = on_chain.sender.eq_ignore_ascii_case(&claimed.sender)
            && on_chain.recipient.eq_ignore_ascii_case(&claimed.recipient);
        let fields_match = on_chain.tx_id == claimed.tx_id
            && on_chain.chain == claimed.chain
            && on_chain.express == claimed.express
            && on_chain.encoded_data == claimed.encoded_data
            && claimed.confirmations == required;
        let confirmations_ok = observed >= required as u64;

        Ok(addresses_match && fields_match && confirmations_ok)
    }

    async fn is_message_processed(&self, tx_id: &str) -> Result<bool, DriverError> {
        let selector = ethers::utils::id("processedTransfers(uint256)");
        let tx_id_u256 = ethers::types::U256::from_dec_str(tx_id)
            .map_err(|e| DriverError::Decode(e.to_string()))?;
        let mut call_data = selector.to_vec();
        call_data.extend_from_slice(&ethers::abi::encode(&[Token::Uint(tx_id_u256)]));

        let tx: ethers::types::TypedTransaction = ethers::types::TransactionRequest::new()
            .to(self.message_contract)
            .data(call_data)
            .into();
        let result = gateway::with_retry("eth_call:processedTransfers", || async {
            self.provider
                .call(&tx, None)
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;

        Ok(result.as_ref().iter().any(|&b| b != 0))
    }

    async fn sign_transaction_data(&self, tuple: &CanonicalTuple) -> Result<String, DriverError> {
        let digest = canonical_digest(tuple).map_err(DriverError::Decode)?;
        let signature = self
            .signing_key
            .sign_digest(digest)
            .map_err(DriverError::Sign)?;
        Ok(signature.to_hex())
    }

    async fn get_chainsig(&self) -> Result<String, DriverError> {
        let selector = ethers::utils::id("chainsig()");
        let tx: ethers::types::TypedTransaction = ethers::types::TransactionRequest::new()
            .to(self.message_contract)
            .data(selector.to_vec())
            .into();
        let result = gateway::with_retry("eth_call:chainsig", || async {
            self.provider
                .call(&tx, None)
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;
        if result.len() < 32 {
            return Err(DriverError::Decode("chainsig() returned short data".into()));
        }
        let address = Address::from_slice(&result[12..32]);
        Ok(format!("{address:#x}"))
    }

    async fn get_exsig(&self, project: &str) -> Result<Option<String>, DriverError> {
        let selector = ethers::utils::id("exsig(string)");
        let mut call_data = selector.to_vec();
        call_data.extend_from_slice(&ethers::abi::encode(&[Token::String(project.to_string())]));
        let tx: ethers::types::TypedTransaction = ethers::types::TransactionRequest::new()
            .to(self.message_contract)
            .data(call_data)
            .into();
        let result = gateway::with_retry("eth_call:exsig", || async {
            self.provider
                .call(&tx, None)
                .await
                .map_err(|e| DriverError::Rpc(e.to_string()))
        })
        .await?;
        if result.len() < 32 || result.iter().all(|&b| b == 0) {
            return Ok(None);
        }
        let address = Address::from_slice(&result[12..32]);
        Ok(Some(format!("{address:#x}")))
    }
}

/// Waits until `transaction_hash` has accumulated at least `confirmations`
/// confirmations, or times out. Used by late-joining drivers before treating
/// a receipt as final (spec §4.1's EVM-family "waitForTransaction").
pub async fn wait_for_confirmations(
    driver: &EvmDriver,
    transaction_hash: &str,
    confirmations: u32,
    timeout: Duration,
) -> Result<bool, DriverError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let receipt = driver.fetch_receipt(transaction_hash).await?;
        if driver.confirmations_for(&receipt).await? >= confirmations as u64 {
            return Ok(true);
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(false);
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_malformed_contract_address() {
        let key = EvmKeyPair::from_hex(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
        )
        .unwrap();
        let err = EvmDriver::connect(1, "http://localhost:8545", "not-an-address", 12, key)
            .unwrap_err();
        assert!(matches!(err, DriverError::Connect(_)));
    }
}
