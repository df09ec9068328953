// Path: crates/vladiator-test-utils/src/mock_driver.rs
//! A configurable [`ChainDriver`] test double shared by the coordinator and
//! orchestrator integration suites, so both exercise the same fake rather
//! than each hand-rolling one.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use vladiator_drivers::{CanonicalTuple, ChainDriver, DriverError};
use vladiator_types::message::{Message, Values};

/// A `ChainDriver` whose receipts, validity, and failure modes are all
/// configured up front, with call counters for assertions on retry/replay
/// behavior.
pub struct MockChainDriver {
    chain_id: u64,
    receipts: Mutex<HashMap<String, Values>>,
    valid: bool,
    fail_populate: bool,
    fail_sign: bool,
    processed: Mutex<std::collections::HashSet<String>>,
    populate_calls: AtomicU32,
    sign_calls: AtomicU32,
}

impl MockChainDriver {
    /// A driver for `chain_id` with no receipts and no configured failures.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            receipts: Mutex::new(HashMap::new()),
            valid: true,
            fail_populate: false,
            fail_sign: false,
            processed: Mutex::new(std::collections::HashSet::new()),
            populate_calls: AtomicU32::new(0),
            sign_calls: AtomicU32::new(0),
        }
    }

    /// Registers an on-chain receipt `populate_message` will attach to any
    /// request carrying `transaction_hash`.
    pub fn with_receipt(self, transaction_hash: &str, values: Values) -> Self {
        self.receipts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(transaction_hash.to_string(), values);
        self
    }

    /// Makes `is_message_valid` report `false` regardless of receipt match,
    /// standing in for a claim the chain doesn't corroborate.
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Makes `populate_message` fail with a transport error on every call.
    pub fn failing_populate(mut self) -> Self {
        self.fail_populate = true;
        self
    }

    /// Makes `sign_transaction_data` fail on every call.
    pub fn failing_sign(mut self) -> Self {
        self.fail_sign = true;
        self
    }

    /// Marks `tx_id` as already processed, so `is_message_processed` reports
    /// `true` for it.
    pub fn mark_processed(self, tx_id: &str) -> Self {
        self.processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tx_id.to_string());
        self
    }

    /// Number of times `populate_message` has been called.
    pub fn populate_calls(&self) -> u32 {
        self.populate_calls.load(Ordering::SeqCst)
    }

    /// Number of times `sign_transaction_data` has been called.
    pub fn sign_calls(&self) -> u32 {
        self.sign_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainDriver for MockChainDriver {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer_identity(&self) -> String {
        format!("0xmocksigner{}", self.chain_id)
    }

    async fn ping(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn populate_message(&self, mut message: Message) -> Result<Message, DriverError> {
        self.populate_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_populate {
            return Err(DriverError::Rpc("mock transport unreachable".into()));
        }
        message.values = self
            .receipts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&message.transaction_hash)
            .cloned();
        Ok(message)
    }

    async fn is_message_valid(&self, message: &Message) -> Result<bool, DriverError> {
        if !self.valid {
            return Ok(false);
        }
        let receipts = self.receipts.lock().unwrap_or_else(|e| e.into_inner());
        let Some(onchain) = receipts.get(&message.transaction_hash) else {
            return Ok(false);
        };
        Ok(Some(onchain) == message.values.as_ref())
    }

    async fn is_message_processed(&self, tx_id: &str) -> Result<bool, DriverError> {
        Ok(self
            .processed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(tx_id))
    }

    async fn sign_transaction_data(&self, _tuple: &CanonicalTuple) -> Result<String, DriverError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sign {
            return Err(DriverError::Rpc("mock signer unreachable".into()));
        }
        Ok(format!("0xmocksig{}", self.chain_id))
    }

    async fn get_chainsig(&self) -> Result<String, DriverError> {
        Ok(self.signer_identity())
    }

    async fn get_exsig(&self, _project: &str) -> Result<Option<String>, DriverError> {
        Ok(None)
    }
}
