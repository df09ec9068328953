// Path: crates/vladiator-drivers/src/driver.rs
//! The `ChainDriver` contract every chain family implements (spec §4.1).

use async_trait::async_trait;
use ethers::types::U256;
use vladiator_types::message::Message;

/// Errors a driver can surface. The coordinator (spec §4.2) treats
/// [`DriverError::Rpc`] as a transport failure that abandons the in-flight
/// lock without emitting anything, per spec §7's `TransportError` kind.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    /// The driver could not be constructed: no RPC session, or the
    /// configured message-contract address is missing/malformed.
    #[error("failed to connect driver: {0}")]
    Connect(String),
    /// An RPC call failed or the transport disconnected mid-flight.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// A response could not be decoded (e.g. malformed log data).
    #[error("decode error: {0}")]
    Decode(String),
    /// The underlying signing backend failed.
    #[error("signing error: {0}")]
    Sign(#[from] vladiator_api::error::CryptoError),
}

/// The canonical tuple that is ABI-encoded, keccak-256 hashed, and signed
/// for every cross-chain authorization (spec §4.1, §6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTuple {
    /// Source message contract's transaction id (`uint256` on the wire, spec
    /// §6 — a `u64` would silently truncate a `txId` above `u64::MAX`).
    pub tx_id: U256,
    /// Numeric id of the source chain.
    pub source_chain_id: u64,
    /// Numeric id of the destination chain.
    pub dest_chain_id: u64,
    /// Sender address on the source chain, as a `0x`-prefixed hex string.
    pub sender: String,
    /// Recipient address on the destination chain, as a `0x`-prefixed hex string.
    pub recipient: String,
    /// Opaque payload bytes from the source-chain event.
    pub data: Vec<u8>,
}

/// Per-chain-family connector: fetches and decodes events, answers validity
/// and processed-state queries, and signs the canonical tuple.
///
/// Implementations never trust peer-supplied `Message` fields when producing
/// authoritative data — every value returned by [`ChainDriver::populate_message`]
/// is re-derived from the chain itself (spec §4.1: "Peer-supplied fields are
/// never trusted").
#[async_trait]
pub trait ChainDriver: Send + Sync {
    /// The numeric chain id this driver serves.
    fn chain_id(&self) -> u64;

    /// This node's own signing address on this chain, used as the `signer`
    /// field of an emitted `MESSAGE:SIGNED` frame. Synchronous: the signing
    /// key is held locally, no RPC involved.
    fn signer_identity(&self) -> String;

    /// Confirms the RPC session is alive. A failure here is the same
    /// `DriverError::Rpc` the coordinator treats as `TransportError`.
    async fn ping(&self) -> Result<(), DriverError>;

    /// Fetches the on-chain receipt for `message.transaction_hash` and
    /// overwrites `values`/`feature_id`/`feature_data` from authoritative
    /// log data. Returns `message` unchanged (with `values` left absent) if
    /// the expected event is not present in the receipt.
    async fn populate_message(&self, message: Message) -> Result<Message, DriverError>;

    /// True iff a log in the receipt for `message.transaction_hash` matches
    /// `message.values` exactly, with at least the claimed confirmations.
    async fn is_message_valid(&self, message: &Message) -> Result<bool, DriverError>;

    /// View call against the destination-chain message contract's
    /// `processedTransfers(txId)`.
    async fn is_message_processed(&self, tx_id: &str) -> Result<bool, DriverError>;

    /// Signs the canonical tuple under this chain's signature scheme,
    /// returning the `0x`-prefixed hex signature (spec §6).
    async fn sign_transaction_data(&self, tuple: &CanonicalTuple) -> Result<String, DriverError>;

    /// The destination contract's currently authoritative signer address.
    async fn get_chainsig(&self) -> Result<String, DriverError>;

    /// A project-specific external signer address, if the contract exposes one.
    async fn get_exsig(&self, project: &str) -> Result<Option<String>, DriverError>;
}
