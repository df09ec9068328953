// Path: crates/vladiator-features/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Vladiator Features
//!
//! The feature plug-in registry (spec §4.5): a `featureId → Feature` map
//! populated at startup via explicit [`Registry::register`] calls, replacing
//! the production system's directory-scanning discovery with a compile-time
//! registry (spec §9's redesign note on dynamic feature loading).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use vladiator_drivers::ChainDriver;
use vladiator_types::message::Message;

/// Errors a feature's `process` call can raise.
#[derive(thiserror::Error, Debug)]
pub enum FeatureError {
    /// The feature could not process the message for a domain-specific reason.
    #[error("feature processing failed: {0}")]
    Failed(String),
}

/// A feature plug-in (spec §3): consumes `featureData` from an on-chain
/// event and produces `featureReply` bundled with the eventual signature.
#[async_trait]
pub trait Feature: Send + Sync {
    /// The numeric id this feature is registered under.
    fn feature_id(&self) -> u32;

    /// A short human-readable name.
    fn feature_name(&self) -> &str;

    /// A longer description of what this feature does.
    fn feature_description(&self) -> &str;

    /// Processes `message`, returning an updated copy with `feature_reply`
    /// set (or `feature_failed = Some(true)` on failure the feature itself
    /// detects rather than raising [`FeatureError`]).
    async fn process(
        &self,
        driver: &dyn ChainDriver,
        message: Message,
    ) -> Result<Message, FeatureError>;

    /// An additional validity check a feature may apply beyond the driver's
    /// own `isMessageValid` (spec §3's "isMessageValid(driver, message)").
    /// Default implementation accepts every message.
    async fn is_message_valid(&self, _driver: &dyn ChainDriver, _message: &Message) -> bool {
        true
    }
}

/// The `featureId → Feature` map, populated once at startup (spec §4.5).
#[derive(Default, Clone)]
pub struct Registry {
    features: HashMap<u32, Arc<dyn Feature>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a feature under its own `feature_id`. Replaces any feature
    /// previously registered under the same id.
    pub fn register(&mut self, feature: Arc<dyn Feature>) {
        self.features.insert(feature.feature_id(), feature);
    }

    /// Looks up a feature by id, returning `None` for an unknown id — the
    /// coordinator (spec §4.2) treats that as `featureFailed = true`.
    pub fn get(&self, feature_id: u32) -> Option<Arc<dyn Feature>> {
        self.features.get(&feature_id).cloned()
    }

    /// The number of registered features.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// `true` if no features are registered.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// A trivial feature that copies `featureData` into `featureReply` unchanged.
/// Useful as a smoke-test plug-in and as a template for real features.
pub struct EchoFeature;

#[async_trait]
impl Feature for EchoFeature {
    fn feature_id(&self) -> u32 {
        1
    }

    fn feature_name(&self) -> &str {
        "echo"
    }

    fn feature_description(&self) -> &str {
        "Returns featureData unchanged as featureReply."
    }

    async fn process(
        &self,
        _driver: &dyn ChainDriver,
        mut message: Message,
    ) -> Result<Message, FeatureError> {
        message.feature_reply = message.feature_data.clone();
        Ok(message)
    }
}

/// A feature that attaches a fixed-length memo prefix to `featureData`,
/// failing if the payload exceeds a configured size.
pub struct MemoFeature {
    max_len: usize,
}

impl MemoFeature {
    /// Builds a memo feature that rejects payloads longer than `max_len` bytes.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

#[async_trait]
impl Feature for MemoFeature {
    fn feature_id(&self) -> u32 {
        2
    }

    fn feature_name(&self) -> &str {
        "memo"
    }

    fn feature_description(&self) -> &str {
        "Validates a memo payload length and echoes it back as the reply."
    }

    async fn process(
        &self,
        _driver: &dyn ChainDriver,
        mut message: Message,
    ) -> Result<Message, FeatureError> {
        let data = message.feature_data.clone().unwrap_or_default();
        if data.len() > self.max_len {
            return Err(FeatureError::Failed(format!(
                "memo payload {} bytes exceeds max {}",
                data.len(),
                self.max_len
            )));
        }
        message.feature_reply = Some(data);
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopDriver;

    #[async_trait]
    impl ChainDriver for NoopDriver {
        fn chain_id(&self) -> u64 {
            0
        }
        fn signer_identity(&self) -> String {
            "0xnoop".into()
        }
        async fn ping(&self) -> Result<(), vladiator_drivers::DriverError> {
            Ok(())
        }
        async fn populate_message(
            &self,
            message: Message,
        ) -> Result<Message, vladiator_drivers::DriverError> {
            Ok(message)
        }
        async fn is_message_valid(
            &self,
            _message: &Message,
        ) -> Result<bool, vladiator_drivers::DriverError> {
            Ok(true)
        }
        async fn is_message_processed(
            &self,
            _tx_id: &str,
        ) -> Result<bool, vladiator_drivers::DriverError> {
            Ok(false)
        }
        async fn sign_transaction_data(
            &self,
            _tuple: &vladiator_drivers::CanonicalTuple,
        ) -> Result<String, vladiator_drivers::DriverError> {
            Ok("0xsig".into())
        }
        async fn get_chainsig(&self) -> Result<String, vladiator_drivers::DriverError> {
            Ok("0xsigner".into())
        }
        async fn get_exsig(
            &self,
            _project: &str,
        ) -> Result<Option<String>, vladiator_drivers::DriverError> {
            Ok(None)
        }
    }

    fn sample_message() -> Message {
        Message::heartbeat("0xauthor", "unused")
    }

    #[tokio::test]
    async fn registry_looks_up_by_feature_id() {
        let mut registry = Registry::new();
        registry.register(Arc::new(EchoFeature));
        assert!(registry.get(1).is_some());
        assert!(registry.get(999).is_none());
    }

    #[tokio::test]
    async fn echo_feature_copies_data_to_reply() {
        let driver = NoopDriver;
        let mut message = sample_message();
        message.feature_data = Some(vec![1, 2, 3]);
        let out = EchoFeature.process(&driver, message).await.unwrap();
        assert_eq!(out.feature_reply, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn memo_feature_rejects_oversized_payload() {
        let driver = NoopDriver;
        let mut message = sample_message();
        message.feature_data = Some(vec![0u8; 10]);
        let feature = MemoFeature::new(4);
        let err = feature.process(&driver, message).await.unwrap_err();
        assert!(matches!(err, FeatureError::Failed(_)));
    }
}
