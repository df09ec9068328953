// Path: crates/vladiator-types/src/message.rs
//! The gossip `Message` frame (spec §3) and its closed topic set (spec §4.3).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A numeric chain identifier, as carried on the wire in decimal-string form.
///
/// Modeled as a newtype rather than a bare `u64` so driver tables, the
/// heartbeat sentinel, and destination-chain lookups all go through one
/// parse/format path instead of ad hoc `to_string()`/`parse()` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub u64);

impl ChainId {
    /// The sentinel source id used by `HEARTBEAT` frames (spec §4.3).
    pub const HEARTBEAT: ChainId = ChainId(crate::HEARTBEAT_SOURCE);

    /// True if this is the heartbeat sentinel rather than a real chain.
    pub fn is_heartbeat(self) -> bool {
        self == Self::HEARTBEAT
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ChainId(s.parse()?))
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Accept either a JSON string or number on the wire; peers in the
        // wild disagree about which one a chain id should be.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Num(u64),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Str(s) => s.parse().map(ChainId).map_err(serde::de::Error::custom),
            Repr::Num(n) => Ok(ChainId(n)),
        }
    }
}

/// The closed set of gossip topics (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Liveness ping, published every 2 minutes.
    Heartbeat,
    /// A peer claims a cross-chain request exists on a source chain.
    MessageRequest,
    /// This node (or a peer) has produced a signature for a request.
    MessageSigned,
    /// Reserved for a downstream execution-queue announcement.
    MessageQueued,
    /// Emitted by the out-of-scope execution pipeline after submission.
    MessageExecution,
    /// Reserved for an existence-confirmation frame.
    MessageExists,
    /// A peer's claimed request did not match on-chain data.
    MessageInvalid,
    /// Reserved for a cache-reset signal.
    MessageReset,
    /// A feature plug-in has begun processing a request.
    FeatureStart,
    /// A feature plug-in failed to process a request.
    FeatureFailed,
    /// A feature plug-in finished processing a request.
    FeatureCompleted,
    /// A peer claimed a destination chain this node does not serve.
    PenaltyChainMiss,
    /// Reserved for a general misbehavior notice.
    PenaltyTattle,
    /// Reserved for a signature-misbehavior notice.
    PenaltySigned,
    /// Reserved for an execution-misbehavior notice.
    PenaltyExecution,
}

impl Topic {
    /// All topics, in the order they are subscribed at startup.
    pub const ALL: [Topic; 15] = [
        Topic::Heartbeat,
        Topic::MessageRequest,
        Topic::MessageSigned,
        Topic::MessageQueued,
        Topic::MessageExecution,
        Topic::MessageExists,
        Topic::MessageInvalid,
        Topic::MessageReset,
        Topic::FeatureStart,
        Topic::FeatureFailed,
        Topic::FeatureCompleted,
        Topic::PenaltyChainMiss,
        Topic::PenaltyTattle,
        Topic::PenaltySigned,
        Topic::PenaltyExecution,
    ];

    /// The wire label for this topic, exactly as spec §4.3 names it.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Heartbeat => "HEARTBEAT",
            Topic::MessageRequest => "MESSAGE:REQUEST",
            Topic::MessageSigned => "MESSAGE:SIGNED",
            Topic::MessageQueued => "MESSAGE:QUEUED",
            Topic::MessageExecution => "MESSAGE:EXECUTION",
            Topic::MessageExists => "MESSAGE:EXISTS",
            Topic::MessageInvalid => "MESSAGE:INVALID",
            Topic::MessageReset => "MESSAGE:RESET",
            Topic::FeatureStart => "FEATURE:START",
            Topic::FeatureFailed => "FEATURE:FAILED",
            Topic::FeatureCompleted => "FEATURE:COMPLETED",
            Topic::PenaltyChainMiss => "PENALTY:CHAINMISS",
            Topic::PenaltyTattle => "PENALTY:TATTLE",
            Topic::PenaltySigned => "PENALTY:SIGNED",
            Topic::PenaltyExecution => "PENALTY:EXECUTION",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown topic: {s}"))
    }
}

impl Serialize for Topic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The message-bearing payload carried by request/signed/invalid frames
/// (spec §3, "values").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Values {
    /// Decimal-string transaction id emitted by the source message contract.
    pub tx_id: String,
    /// Sender address on the source chain.
    pub sender: String,
    /// Recipient address on the destination chain.
    pub recipient: String,
    /// Destination chain id, as a decimal string on the wire.
    pub chain: ChainId,
    /// Whether the sender requested expedited (non-default-confirmation) handling.
    pub express: bool,
    /// Opaque payload bytes, hex-encoded on the wire.
    #[serde(with = "hex_bytes")]
    pub encoded_data: Vec<u8>,
    /// Confirmations the sender is claiming/requiring.
    pub confirmations: u32,
}

/// The self-describing gossip frame exchanged over the bus (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// The topic label this frame was/will be published under.
    #[serde(rename = "type")]
    pub kind: Topic,
    /// Public key (hex) of the publishing node.
    pub author: String,
    /// Numeric id of the source chain, or the heartbeat sentinel.
    pub source: ChainId,
    /// Opaque transaction identifier: a 32-byte hex hash on EVM-family
    /// chains, or `<block>-<extrinsicIndex>` on substrate-family chains.
    pub transaction_hash: String,
    /// Present for message-bearing topics.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub values: Option<Values>,
    /// Numeric id of the feature plug-in this request carries, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_id: Option<u32>,
    /// Opaque feature input bytes (hex on the wire), from the on-chain event.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[serde(with = "opt_hex_bytes")]
    pub feature_data: Option<Vec<u8>>,
    /// Opaque feature output bytes (hex on the wire), produced by `process`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    #[serde(with = "opt_hex_bytes")]
    pub feature_reply: Option<Vec<u8>>,
    /// Set by a feature to indicate it could not process the request.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feature_failed: Option<bool>,
    /// Address of the node that produced `signature`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signer: Option<String>,
    /// Hex-encoded signature over the canonical tuple (spec §3, §6).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<String>,
    /// The destination contract's currently authoritative signer address.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub chainsig: Option<String>,
    /// A project-specific external signer address, if configured.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exsig: Option<String>,
    /// Destination-chain execution transaction hash, for EXECUTION frames.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub execution_hash: Option<String>,
    /// Gas spent observing the source-chain transaction.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_gas: Option<String>,
    /// Gas spent executing on the destination chain.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dest_gas: Option<String>,
    /// Gas refunded by the destination chain, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dest_gas_refund: Option<String>,
    /// Observed token price at execution time, for cost accounting.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token_price: Option<String>,
    /// This validator's balance on the destination chain, for alerting.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub validator_balance: Option<String>,
}

impl Message {
    /// Builds the minimal heartbeat frame published every 2 minutes.
    pub fn heartbeat(author: impl Into<String>, payload: impl Into<String>) -> Self {
        Message {
            kind: Topic::Heartbeat,
            author: author.into(),
            source: ChainId::HEARTBEAT,
            transaction_hash: payload.into(),
            values: None,
            feature_id: None,
            feature_data: None,
            feature_reply: None,
            feature_failed: None,
            signer: None,
            signature: None,
            chainsig: None,
            exsig: None,
            execution_hash: None,
            source_gas: None,
            dest_gas: None,
            dest_gas_refund: None,
            token_price: None,
            validator_balance: None,
        }
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

mod opt_hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => s.serialize_str(&format!("0x{}", hex::encode(b))),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let opt = Option::<String>::deserialize(d)?;
        opt.map(|s| hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_id_round_trips_as_decimal_string() {
        let id = ChainId(56);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"56\"");
        let back: ChainId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn chain_id_accepts_numeric_wire_form_too() {
        let back: ChainId = serde_json::from_str("137").unwrap();
        assert_eq!(back, ChainId(137));
    }

    #[test]
    fn topic_round_trips_through_wire_label() {
        for topic in Topic::ALL {
            let s = topic.as_str();
            assert_eq!(s.parse::<Topic>().unwrap(), topic);
        }
    }

    #[test]
    fn message_request_serializes_with_camel_case_values() {
        let msg = Message {
            kind: Topic::MessageRequest,
            author: "0xnode".into(),
            source: ChainId(1),
            transaction_hash: "0xabc".into(),
            values: Some(Values {
                tx_id: "42".into(),
                sender: "0xsender".into(),
                recipient: "0xrecipient".into(),
                chain: ChainId(56),
                express: false,
                encoded_data: vec![1, 2, 3],
                confirmations: 12,
            }),
            feature_id: None,
            feature_data: None,
            feature_reply: None,
            feature_failed: None,
            signer: None,
            signature: None,
            chainsig: None,
            exsig: None,
            execution_hash: None,
            source_gas: None,
            dest_gas: None,
            dest_gas_refund: None,
            token_price: None,
            validator_balance: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "MESSAGE:REQUEST");
        assert_eq!(json["values"]["txId"], "42");
        assert_eq!(json["values"]["encodedData"], "0x010203");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn heartbeat_uses_sentinel_source() {
        let hb = Message::heartbeat("0xnode", "still alive");
        assert!(hb.source.is_heartbeat());
        assert_eq!(hb.source.0, 1_010_101_010);
    }
}
