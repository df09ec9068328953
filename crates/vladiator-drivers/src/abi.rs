// Path: crates/vladiator-drivers/src/abi.rs
//! Authoritative event signatures and the canonical signing payload encoding
//! (spec §4.1, §6). Topic hashes are computed once and compared byte-for-byte.

use crate::driver::CanonicalTuple;
use ethers::abi::{encode, Token};
use ethers::types::{Address, U256};
use once_cell::sync::Lazy;
use std::str::FromStr;
use vladiator_crypto::algorithms::hash::keccak256;

/// `SendRequested(uint txId, address sender, address recipient, uint chain, bool express, bytes data, uint16 confirmations)`
pub const SEND_REQUESTED_SIG: &str =
    "SendRequested(uint256,address,address,uint256,bool,bytes,uint16)";
/// `SendProcessed(uint txId, uint sourceChainId, address sender, address recipient)`
pub const SEND_PROCESSED_SIG: &str = "SendProcessed(uint256,uint256,address,address)";
/// `SendMessageWithFeature(uint txId, uint destinationChainId, uint32 featureId, bytes featureData)`
pub const SEND_MESSAGE_WITH_FEATURE_SIG: &str =
    "SendMessageWithFeature(uint256,uint256,uint32,bytes)";
/// `Success(uint txId, uint sourceChainId, address sender, address recipient, uint amount)`
pub const SUCCESS_SIG: &str = "Success(uint256,uint256,address,address,uint256)";
/// `SetChainsig(address signer)`
pub const SET_CHAINSIG_SIG: &str = "SetChainsig(address)";

/// The keccak-256 topic hash of [`SEND_REQUESTED_SIG`].
pub static SEND_REQUESTED_TOPIC: Lazy<[u8; 32]> = Lazy::new(|| keccak256(SEND_REQUESTED_SIG));
/// The keccak-256 topic hash of [`SEND_PROCESSED_SIG`].
pub static SEND_PROCESSED_TOPIC: Lazy<[u8; 32]> = Lazy::new(|| keccak256(SEND_PROCESSED_SIG));
/// The keccak-256 topic hash of [`SEND_MESSAGE_WITH_FEATURE_SIG`].
pub static SEND_MESSAGE_WITH_FEATURE_TOPIC: Lazy<[u8; 32]> =
    Lazy::new(|| keccak256(SEND_MESSAGE_WITH_FEATURE_SIG));
/// The keccak-256 topic hash of [`SUCCESS_SIG`].
pub static SUCCESS_TOPIC: Lazy<[u8; 32]> = Lazy::new(|| keccak256(SUCCESS_SIG));
/// The keccak-256 topic hash of [`SET_CHAINSIG_SIG`].
pub static SET_CHAINSIG_TOPIC: Lazy<[u8; 32]> = Lazy::new(|| keccak256(SET_CHAINSIG_SIG));

/// ABI-encodes the canonical tuple `(uint256, uint256, uint256, address,
/// address, bytes)` and returns its keccak-256 digest — the exact payload
/// [`ChainDriver::sign_transaction_data`](crate::driver::ChainDriver::sign_transaction_data)
/// must sign (spec §6: "Any deviation breaks execution").
pub fn canonical_digest(tuple: &CanonicalTuple) -> Result<[u8; 32], String> {
    let sender = Address::from_str(&tuple.sender).map_err(|e| e.to_string())?;
    let recipient = Address::from_str(&tuple.recipient).map_err(|e| e.to_string())?;

    let tokens = vec![
        Token::Uint(tuple.tx_id),
        Token::Uint(U256::from(tuple.source_chain_id)),
        Token::Uint(U256::from(tuple.dest_chain_id)),
        Token::Address(sender),
        Token::Address(recipient),
        Token::Bytes(tuple.data.clone()),
    ];
    let encoded = encode(&tokens);
    Ok(keccak256(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_digest_is_deterministic() {
        let tuple = CanonicalTuple {
            tx_id: U256::from(42u64),
            source_chain_id: 1,
            dest_chain_id: 56,
            sender: "0x0000000000000000000000000000000000dEaD".into(),
            recipient: "0x000000000000000000000000000000000bEEf1".into(),
            data: vec![1, 2, 3],
        };
        let a = canonical_digest(&tuple).unwrap();
        let b = canonical_digest(&tuple).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_digest_changes_with_tx_id() {
        let mut tuple = CanonicalTuple {
            tx_id: U256::from(42u64),
            source_chain_id: 1,
            dest_chain_id: 56,
            sender: "0x0000000000000000000000000000000000dEaD".into(),
            recipient: "0x000000000000000000000000000000000bEEf1".into(),
            data: vec![],
        };
        let a = canonical_digest(&tuple).unwrap();
        tuple.tx_id = U256::from(43u64);
        let b = canonical_digest(&tuple).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn canonical_digest_supports_tx_ids_above_u64_max() {
        let mut tuple = CanonicalTuple {
            tx_id: U256::MAX,
            source_chain_id: 1,
            dest_chain_id: 56,
            sender: "0x0000000000000000000000000000000000dEaD".into(),
            recipient: "0x000000000000000000000000000000000bEEf1".into(),
            data: vec![],
        };
        let a = canonical_digest(&tuple).unwrap();
        tuple.tx_id = U256::MAX - U256::from(1u64);
        let b = canonical_digest(&tuple).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn event_topics_are_32_bytes_and_distinct() {
        let topics = [
            *SEND_REQUESTED_TOPIC,
            *SEND_PROCESSED_TOPIC,
            *SEND_MESSAGE_WITH_FEATURE_TOPIC,
            *SUCCESS_TOPIC,
            *SET_CHAINSIG_TOPIC,
        ];
        for t in &topics {
            assert_eq!(t.len(), 32);
        }
        for i in 0..topics.len() {
            for j in (i + 1)..topics.len() {
                assert_ne!(topics[i], topics[j]);
            }
        }
    }
}
