// Path: crates/vladiator-orchestrator/src/tests.rs
//! Routing tests for [`Vladiator::dispatch`]: these exercise the
//! orchestrator's own chain-miss check (on `message.source`), which is
//! distinct from the coordinator's chain-miss check on `values.chain`.

use crate::sinks::ObservabilitySink;
use crate::Vladiator;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vladiator_drivers::{CanonicalTuple, ChainDriver, DriverError};
use vladiator_features::Registry;
use vladiator_networking::{Bus, BusError, LocalPeer};
use vladiator_types::message::{ChainId, Message, Topic, Values};

struct NoopDriver {
    chain_id: u64,
}

#[async_trait]
impl ChainDriver for NoopDriver {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn signer_identity(&self) -> String {
        format!("0xsigner{}", self.chain_id)
    }

    async fn ping(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn populate_message(&self, message: Message) -> Result<Message, DriverError> {
        Ok(message)
    }

    async fn is_message_valid(&self, _message: &Message) -> Result<bool, DriverError> {
        Ok(true)
    }

    async fn is_message_processed(&self, _tx_id: &str) -> Result<bool, DriverError> {
        Ok(false)
    }

    async fn sign_transaction_data(&self, _tuple: &CanonicalTuple) -> Result<String, DriverError> {
        Ok("0xsig".into())
    }

    async fn get_chainsig(&self) -> Result<String, DriverError> {
        Ok(self.signer_identity())
    }

    async fn get_exsig(&self, _project: &str) -> Result<Option<String>, DriverError> {
        Ok(None)
    }
}

/// An in-memory [`Bus`] that replays a fixed inbound queue and records every
/// published frame, so the dispatch loop can be driven without libp2p.
struct FakeBus {
    inbound: Mutex<Vec<Message>>,
    published: Mutex<Vec<Message>>,
}

#[async_trait]
impl Bus for FakeBus {
    async fn publish(&self, message: Message) -> Result<(), BusError> {
        self.published.lock().unwrap().push(message);
        Ok(())
    }

    async fn recv(&self) -> Option<Message> {
        self.inbound.lock().unwrap().pop()
    }

    fn local_peer(&self) -> LocalPeer {
        LocalPeer {
            peer_id: "test-peer".into(),
            listen_addrs: Vec::new(),
        }
    }

    fn connected_peer_count(&self) -> usize {
        0
    }

    async fn shutdown(&self) {}
}

#[derive(Default)]
struct CountingSink {
    count: AtomicUsize,
}

#[async_trait]
impl ObservabilitySink for CountingSink {
    async fn send(&self, _message: &Message) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

fn request(source: u64) -> Message {
    Message {
        kind: Topic::MessageRequest,
        author: "0xpeer".into(),
        source: ChainId(source),
        transaction_hash: "0xhash".into(),
        values: Some(Values {
            tx_id: "1".into(),
            sender: "0xsender".into(),
            recipient: "0xrecipient".into(),
            chain: ChainId(source),
            express: false,
            encoded_data: vec![],
            confirmations: 1,
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
    }
}

#[tokio::test]
async fn unknown_source_emits_penalty_chainmiss() {
    let fake_bus = Arc::new(FakeBus {
        inbound: Mutex::new(vec![request(999)]),
        published: Mutex::new(Vec::new()),
    });
    let bus: Arc<dyn Bus> = fake_bus.clone();
    let sink: Arc<CountingSink> = Arc::new(CountingSink::default());
    let orchestrator = Arc::new(Vladiator::new(
        bus,
        vec![Arc::new(NoopDriver { chain_id: 1 })],
        Arc::new(Registry::new()),
        "0xthisnode".into(),
        vec![sink.clone()],
    ));

    orchestrator.clone().run().await;

    assert_eq!(sink.count.load(Ordering::SeqCst), 1);
    let published = fake_bus.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind, Topic::PenaltyChainMiss);
    assert_eq!(published[0].author, "0xthisnode");
}

#[tokio::test]
async fn heartbeat_sentinel_source_is_dropped_not_penalized() {
    let mut heartbeat_claim = request(vladiator_types::HEARTBEAT_SOURCE);
    heartbeat_claim.kind = Topic::MessageRequest;
    let fake_bus = Arc::new(FakeBus {
        inbound: Mutex::new(vec![heartbeat_claim]),
        published: Mutex::new(Vec::new()),
    });
    let bus: Arc<dyn Bus> = fake_bus.clone();
    let orchestrator = Arc::new(Vladiator::new(
        bus,
        vec![Arc::new(NoopDriver { chain_id: 1 })],
        Arc::new(Registry::new()),
        "0xthisnode".into(),
        Vec::new(),
    ));

    orchestrator.clone().run().await;

    assert!(fake_bus.published.lock().unwrap().is_empty());
}

#[tokio::test]
async fn known_source_is_not_penalized() {
    let fake_bus = Arc::new(FakeBus {
        inbound: Mutex::new(vec![request(1)]),
        published: Mutex::new(Vec::new()),
    });
    let bus: Arc<dyn Bus> = fake_bus.clone();
    let orchestrator = Arc::new(Vladiator::new(
        bus,
        vec![Arc::new(NoopDriver { chain_id: 1 })],
        Arc::new(Registry::new()),
        "0xthisnode".into(),
        Vec::new(),
    ));

    orchestrator.clone().run().await;
    // The coordinator task is spawned off-loop; give it a chance to run and
    // publish before asserting no PENALTY:CHAINMISS went out the bus.
    tokio::task::yield_now().await;

    let published = fake_bus.published.lock().unwrap();
    assert!(published.iter().any(|m| m.kind == Topic::MessageSigned));
    assert!(!published.iter().any(|m| m.kind == Topic::PenaltyChainMiss));
}
