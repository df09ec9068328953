// Path: crates/vladiator-coordinator/tests/integration.rs
//! End-to-end coordinator scenarios (spec §8): happy path, invalid claim,
//! chain miss, replay, feature failure, and retry exhaustion, driven
//! through [`Coordinator::process_request`] against [`MockChainDriver`].

use async_trait::async_trait;
use std::sync::Arc;
use vladiator_coordinator::Coordinator;
use vladiator_drivers::ChainDriver;
use vladiator_features::{FeatureError, Registry};
use vladiator_test_utils::{MockChainDriver, MockDriverTable, RecordingSink};
use vladiator_types::message::{ChainId, Message, Topic, Values};

fn sample_values(chain: u64) -> Values {
    Values {
        tx_id: "42".into(),
        sender: "0xsender".into(),
        recipient: "0xrecipient".into(),
        chain: ChainId(chain),
        express: false,
        encoded_data: vec![1, 2, 3],
        confirmations: 12,
    }
}

fn sample_request(source: u64, values: Values) -> Message {
    Message {
        kind: Topic::MessageRequest,
        author: "0xpeer".into(),
        source: ChainId(source),
        transaction_hash: "0xhash".into(),
        values: Some(values),
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

fn happy_path_coordinator() -> (Coordinator, Arc<RecordingSink>) {
    let source = Arc::new(MockChainDriver::new(1).with_receipt("0xhash", sample_values(56)));
    let dest: Arc<dyn ChainDriver> = Arc::new(MockChainDriver::new(56));
    let lookup = Arc::new(MockDriverTable::new().with_driver(dest));
    let sink = Arc::new(RecordingSink::new());
    let coordinator = Coordinator::new(
        source,
        lookup,
        Arc::new(Registry::new()),
        sink.clone(),
        "0xthisnode".into(),
    );
    (coordinator, sink)
}

#[tokio::test]
async fn happy_path_emits_message_signed() {
    let (coordinator, sink) = happy_path_coordinator();
    let request = sample_request(1, sample_values(56));
    coordinator.process_request(request).await;

    let emitted = sink.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].kind, Topic::MessageSigned);
    assert_eq!(emitted[0].author, "0xthisnode");
    assert_eq!(emitted[0].signature.as_deref(), Some("0xmocksig56"));
}

#[tokio::test]
async fn invalid_claim_emits_message_invalid_not_signed() {
    // The on-chain receipt exists but the driver reports it does not
    // corroborate the request (e.g. confirmations below the claim):
    // `populate_message` always overwrites `values` with the authoritative
    // receipt before `is_message_valid` runs, so tampering with the request's
    // own `values` can't simulate this — `.invalid()` stands in for it.
    let source = Arc::new(
        MockChainDriver::new(1)
            .with_receipt("0xhash", sample_values(56))
            .invalid(),
    );
    let dest: Arc<dyn ChainDriver> = Arc::new(MockChainDriver::new(56));
    let lookup = Arc::new(MockDriverTable::new().with_driver(dest));
    let sink = Arc::new(RecordingSink::new());
    let coordinator = Coordinator::new(
        source,
        lookup,
        Arc::new(Registry::new()),
        sink.clone(),
        "0xthisnode".into(),
    );

    let request = sample_request(1, sample_values(56));
    coordinator.process_request(request).await;

    let emitted = sink.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].kind, Topic::MessageInvalid);
}

#[tokio::test]
async fn chain_miss_emits_penalty_not_signed() {
    let source = Arc::new(MockChainDriver::new(1).with_receipt("0xhash", sample_values(137)));
    let lookup = Arc::new(MockDriverTable::new());
    let sink = Arc::new(RecordingSink::new());
    let coordinator = Coordinator::new(
        source,
        lookup,
        Arc::new(Registry::new()),
        sink.clone(),
        "0xthisnode".into(),
    );

    let request = sample_request(1, sample_values(137));
    coordinator.process_request(request).await;

    let emitted = sink.emitted();
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].kind, Topic::PenaltyChainMiss);
}

#[tokio::test]
async fn replay_reemits_identical_signature_without_second_populate() {
    let (coordinator, sink) = happy_path_coordinator();
    let request = sample_request(1, sample_values(56));
    coordinator.process_request(request.clone()).await;
    coordinator.process_request(request).await;

    let emitted = sink.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0].signature, emitted[1].signature);
}

#[tokio::test]
async fn feature_failure_emits_start_then_failed_no_signed() {
    struct AlwaysFails;
    #[async_trait]
    impl vladiator_features::Feature for AlwaysFails {
        fn feature_id(&self) -> u32 {
            7
        }
        fn feature_name(&self) -> &str {
            "always-fails"
        }
        fn feature_description(&self) -> &str {
            "test double that always fails"
        }
        async fn process(
            &self,
            _driver: &dyn ChainDriver,
            _message: Message,
        ) -> Result<Message, FeatureError> {
            Err(FeatureError::Failed("boom".into()))
        }
    }

    let source = Arc::new(MockChainDriver::new(1).with_receipt("0xhash", sample_values(56)));
    let dest: Arc<dyn ChainDriver> = Arc::new(MockChainDriver::new(56));
    let lookup = Arc::new(MockDriverTable::new().with_driver(dest));
    let mut registry = Registry::new();
    registry.register(Arc::new(AlwaysFails));
    let sink = Arc::new(RecordingSink::new());
    let coordinator = Coordinator::new(
        source,
        lookup,
        Arc::new(registry),
        sink.clone(),
        "0xthisnode".into(),
    );

    let mut request = sample_request(1, sample_values(56));
    request.feature_id = Some(7);
    coordinator.process_request(request).await;

    let emitted = sink.emitted();
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0].kind, Topic::FeatureStart);
    assert_eq!(emitted[1].kind, Topic::FeatureFailed);
    assert!(!emitted.iter().any(|m| m.kind == Topic::MessageSigned));
}

#[tokio::test]
async fn retry_exhaustion_drops_fourth_request_silently() {
    let source = Arc::new(MockChainDriver::new(1).failing_populate());
    let lookup = Arc::new(MockDriverTable::new());
    let sink = Arc::new(RecordingSink::new());
    let coordinator = Coordinator::new(
        source,
        lookup,
        Arc::new(Registry::new()),
        sink.clone(),
        "0xthisnode".into(),
    );

    let mut values = sample_values(56);
    values.tx_id = "7".into();
    for _ in 0..4 {
        let request = sample_request(1, values.clone());
        coordinator.process_request(request).await;
    }

    assert!(sink.emitted().is_empty());
}
