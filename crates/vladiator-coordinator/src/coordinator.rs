// Path: crates/vladiator-coordinator/src/coordinator.rs
//! The per-driver request coordinator: the state machine described in
//! spec §4.2, entered whenever the orchestrator routes a `MESSAGE:REQUEST`
//! whose `source` equals this driver's chain id.

use crate::cache::{FeatureReplyCache, RetryCounter, SignatureCache, TxState, MAX_RETRIES};
use crate::context::{DriverLookup, PublishSink};
use std::sync::Arc;
use vladiator_drivers::{CanonicalTuple, ChainDriver, DriverError, U256};
use vladiator_features::Registry;
use vladiator_telemetry::metrics;
use vladiator_types::message::{Message, Topic};

/// Owns the three caches and drives one source chain's requests through
/// lock → populate → validate → feature → sign → publish.
pub struct Coordinator {
    source_driver: Arc<dyn ChainDriver>,
    driver_lookup: Arc<dyn DriverLookup>,
    features: Arc<Registry>,
    publisher: Arc<dyn PublishSink>,
    author: String,
    signatures: SignatureCache,
    retries: RetryCounter,
    feature_replies: FeatureReplyCache,
}

impl Coordinator {
    /// Builds a coordinator for the given source-chain driver. `author` is
    /// this node's public-key identity, stamped onto every frame this
    /// coordinator emits (spec §4.2: "author = this node").
    pub fn new(
        source_driver: Arc<dyn ChainDriver>,
        driver_lookup: Arc<dyn DriverLookup>,
        features: Arc<Registry>,
        publisher: Arc<dyn PublishSink>,
        author: String,
    ) -> Self {
        Self {
            source_driver,
            driver_lookup,
            features,
            publisher,
            author,
            signatures: SignatureCache::new(),
            retries: RetryCounter::new(),
            feature_replies: FeatureReplyCache::new(),
        }
    }

    /// Processes one `MESSAGE:REQUEST` frame through the full state machine.
    pub async fn process_request(&self, request: Message) {
        let Some(values) = request.values.as_ref() else {
            return;
        };
        let tx_id = values.tx_id.clone();
        let chain = self.source_driver.chain_id().to_string();

        // Rule 1: lock / replay / retry-bound. `lock_if_absent` claims the
        // `Locked` slot atomically, so of two concurrent requests for the
        // same `txId` only the one that actually wins the race proceeds.
        match self.signatures.lock_if_absent(&tx_id).await {
            Some(TxState::Signed { signature }) => {
                let feature_reply = self.feature_replies.get(&tx_id).await;
                self.emit_signed(&request, signature, feature_reply).await;
                return;
            }
            Some(TxState::Locked) => return,
            None => {
                let attempt = self.retries.increment(&tx_id).await;
                if attempt > MAX_RETRIES {
                    metrics().inc_retries_exhausted(&chain);
                    self.signatures.abandon(&tx_id).await;
                    return;
                }
            }
        }

        let timer_start = std::time::Instant::now();
        let outcome = self.run_locked(request).await;
        metrics().observe_lock_duration(&chain, timer_start.elapsed().as_secs_f64());

        if let Err(tx_id) = outcome {
            self.signatures.abandon(&tx_id).await;
        }
    }

    /// Runs populate → validate → chain-miss → feature → sign for a freshly
    /// locked `txId`. Returns `Err(tx_id)` if the lock should be released
    /// without a terminal `Signed` state; `Ok(())` once signed.
    async fn run_locked(&self, request: Message) -> Result<(), String> {
        let tx_id = request
            .values
            .as_ref()
            .map(|v| v.tx_id.clone())
            .unwrap_or_default();
        let chain = self.source_driver.chain_id().to_string();

        // Rule 2: populate.
        let populated = match self.source_driver.populate_message(request).await {
            Ok(m) => m,
            Err(DriverError::Rpc(e)) => {
                tracing::debug!(target: "coordinator", tx_id, error = %e, "transport error during populate; abandoning lock");
                return Err(tx_id);
            }
            Err(e) => {
                tracing::debug!(target: "coordinator", tx_id, error = %e, "populate failed; abandoning lock");
                return Err(tx_id);
            }
        };
        let Some(values) = populated.values.clone() else {
            return Err(tx_id);
        };

        // Rule 3: validate.
        let valid = self
            .source_driver
            .is_message_valid(&populated)
            .await
            .unwrap_or(false);
        if !valid {
            metrics().inc_invalid(&chain);
            self.emit(Topic::MessageInvalid, &populated, None, None, None)
                .await;
            return Err(tx_id);
        }

        // Rule 4: chain-miss.
        let Some(dest_driver) = self.driver_lookup.driver_for(values.chain.0) else {
            metrics().inc_chainmiss(&chain);
            self.emit(Topic::PenaltyChainMiss, &populated, None, None, None)
                .await;
            return Err(tx_id);
        };

        // Rule 5: feature stage.
        let mut working = populated.clone();
        let mut feature_reply: Option<Vec<u8>> = None;
        if let Some(feature_id) = working.feature_id {
            self.emit(Topic::FeatureStart, &working, None, None, None)
                .await;

            let feature = match self.features.get(feature_id) {
                Some(f) => f,
                None => {
                    self.emit(Topic::FeatureFailed, &working, None, None, None)
                        .await;
                    metrics().inc_feature_error(&feature_id.to_string());
                    return Err(tx_id);
                }
            };

            let start = std::time::Instant::now();
            let processed = feature.process(dest_driver.as_ref(), working.clone()).await;
            metrics().observe_feature_latency(
                &feature.feature_id().to_string(),
                start.elapsed().as_secs_f64(),
            );

            match processed {
                Ok(m) if m.feature_failed != Some(true) => {
                    feature_reply = m.feature_reply.clone();
                    if let Some(reply) = &feature_reply {
                        self.feature_replies.insert(&tx_id, reply.clone()).await;
                    }
                    working = m;
                    self.emit(Topic::FeatureCompleted, &working, None, None, None)
                        .await;
                }
                _ => {
                    metrics().inc_feature_error(&feature_id.to_string());
                    self.emit(Topic::FeatureFailed, &working, None, None, None)
                        .await;
                    return Err(tx_id);
                }
            }
        }

        // Rule 6: sign. `txId` is a `uint256` on the wire (spec §6); parsing
        // into a `u64` would silently truncate a transaction id above
        // `u64::MAX` to something else entirely.
        let tx_id_num = U256::from_dec_str(&values.tx_id).unwrap_or_default();
        let tuple = CanonicalTuple {
            tx_id: tx_id_num,
            source_chain_id: working.source.0,
            dest_chain_id: values.chain.0,
            sender: values.sender.clone(),
            recipient: values.recipient.clone(),
            data: values.encoded_data.clone(),
        };

        let signature = match dest_driver.sign_transaction_data(&tuple).await {
            Ok(sig) => sig,
            Err(e) => {
                tracing::debug!(target: "coordinator", tx_id, error = %e, "sign failed; abandoning lock");
                return Err(tx_id);
            }
        };

        self.signatures.finalize(&tx_id, signature.clone()).await;
        metrics().inc_signatures_emitted(&chain);
        let signer = dest_driver.signer_identity();
        self.emit(
            Topic::MessageSigned,
            &working,
            Some(signature),
            Some(signer),
            feature_reply,
        )
        .await;

        Ok(())
    }

    async fn emit_signed(&self, request: &Message, signature: String, feature_reply: Option<Vec<u8>>) {
        let signer = self
            .driver_lookup
            .driver_for(request.values.as_ref().map(|v| v.chain.0).unwrap_or(0))
            .map(|d| d.signer_identity());
        self.emit(Topic::MessageSigned, request, Some(signature), signer, feature_reply)
            .await;
    }

    async fn emit(
        &self,
        topic: Topic,
        template: &Message,
        signature: Option<String>,
        signer: Option<String>,
        feature_reply: Option<Vec<u8>>,
    ) {
        let mut frame = template.clone();
        frame.kind = topic;
        frame.author = self.author.clone();
        frame.signature = signature;
        frame.signer = signer;
        if feature_reply.is_some() {
            frame.feature_reply = feature_reply;
        }
        self.publisher.publish(frame).await;
    }
}
