// Path: crates/vladiator-networking/src/bus.rs
//! `GossipBus`: a libp2p gossipsub implementation of [`Bus`] (spec §4.3).

use crate::dedup::RecentGossip;
use crate::traits::{Bus, BusError, LocalPeer};
use async_trait::async_trait;
use futures::StreamExt;
use libp2p::{
    gossipsub, identity, noise,
    swarm::{NetworkBehaviour, SwarmEvent},
    tcp, yamux, Multiaddr, PeerId, Swarm, SwarmBuilder, Transport,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use vladiator_types::message::{Message, Topic};

/// How often this node publishes a `HEARTBEAT` frame (spec §4.3).
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(120);

#[derive(NetworkBehaviour)]
#[behaviour(to_swarm = "BusBehaviourEvent")]
struct BusBehaviour {
    gossipsub: gossipsub::Behaviour,
}

#[derive(Debug)]
enum BusBehaviourEvent {
    Gossipsub(gossipsub::Event),
}

impl From<gossipsub::Event> for BusBehaviourEvent {
    fn from(event: gossipsub::Event) -> Self {
        BusBehaviourEvent::Gossipsub(event)
    }
}

enum Command {
    Publish(Message, tokio::sync::oneshot::Sender<Result<(), BusError>>),
}

/// A gossipsub-backed [`Bus`]. Owns a single swarm-loop task that serializes
/// subscription, publish, de-duplication, and heartbeat ticking, per the
/// single-writer shared-resource policy around the dedup window (spec §5).
pub struct GossipBus {
    command_tx: mpsc::Sender<Command>,
    inbound_rx: Mutex<mpsc::Receiver<Message>>,
    shutdown_tx: watch::Sender<bool>,
    task_handle: Mutex<Option<JoinHandle<()>>>,
    local_peer_id: PeerId,
    listen_addrs: Arc<Mutex<Vec<Multiaddr>>>,
    connected_peers: Arc<AtomicUsize>,
}

impl GossipBus {
    /// Starts the bus: builds the swarm, subscribes to every topic in
    /// [`Topic::ALL`], listens on `listen_addr`, and dials `dial_addrs`.
    pub fn start(
        local_key: identity::Keypair,
        author: String,
        listen_addr: Multiaddr,
        dial_addrs: &[Multiaddr],
    ) -> Result<Self, BusError> {
        let local_peer_id = local_key.public().to_peer_id();
        let swarm = build_swarm(local_key).map_err(|e| BusError::Startup(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::channel(256);
        let (inbound_tx, inbound_rx) = mpsc::channel(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let listen_addrs = Arc::new(Mutex::new(Vec::new()));
        let connected_peers = Arc::new(AtomicUsize::new(0));

        let task_handle = tokio::spawn(run_swarm_loop(
            swarm,
            author,
            listen_addr,
            dial_addrs.to_vec(),
            command_rx,
            inbound_tx,
            shutdown_rx,
            listen_addrs.clone(),
            connected_peers.clone(),
        ));

        Ok(Self {
            command_tx,
            inbound_rx: Mutex::new(inbound_rx),
            shutdown_tx,
            task_handle: Mutex::new(Some(task_handle)),
            local_peer_id,
            listen_addrs,
            connected_peers,
        })
    }
}

#[async_trait]
impl Bus for GossipBus {
    async fn publish(&self, message: Message) -> Result<(), BusError> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.command_tx
            .send(Command::Publish(message, reply_tx))
            .await
            .map_err(|_| BusError::Publish("swarm loop gone".into()))?;
        reply_rx
            .await
            .map_err(|_| BusError::Publish("swarm loop dropped reply".into()))?
    }

    async fn recv(&self) -> Option<Message> {
        self.inbound_rx.lock().await.recv().await
    }

    fn local_peer(&self) -> LocalPeer {
        let addrs = self
            .listen_addrs
            .try_lock()
            .map(|g| g.iter().map(|a| a.to_string()).collect())
            .unwrap_or_default();
        LocalPeer {
            peer_id: self.local_peer_id.to_string(),
            listen_addrs: addrs,
        }
    }

    fn connected_peer_count(&self) -> usize {
        self.connected_peers.load(Ordering::Relaxed)
    }

    async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.task_handle.lock().await.take() {
            let _ = handle.await;
        }
    }
}

fn build_swarm(local_key: identity::Keypair) -> anyhow::Result<Swarm<BusBehaviour>> {
    let swarm = SwarmBuilder::with_existing_identity(local_key)
        .with_tokio()
        .with_other_transport(|key| {
            let noise_config = noise::Config::new(key)?;
            let transport = tcp::tokio::Transport::new(tcp::Config::default())
                .upgrade(libp2p::core::upgrade::Version::V1Lazy)
                .authenticate(noise_config)
                .multiplex(yamux::Config::default())
                .timeout(Duration::from_secs(20))
                .boxed();
            Ok(transport)
        })?
        .with_behaviour(|key| {
            let gossipsub = gossipsub::Behaviour::new(
                gossipsub::MessageAuthenticity::Signed(key.clone()),
                gossipsub::Config::default(),
            )?;
            Ok(BusBehaviour { gossipsub })
        })?
        .build();
    Ok(swarm)
}

fn ident_topic(topic: Topic) -> gossipsub::IdentTopic {
    gossipsub::IdentTopic::new(topic.as_str())
}

#[allow(clippy::too_many_arguments)]
async fn run_swarm_loop(
    mut swarm: Swarm<BusBehaviour>,
    author: String,
    listen_addr: Multiaddr,
    dial_addrs: Vec<Multiaddr>,
    mut command_rx: mpsc::Receiver<Command>,
    inbound_tx: mpsc::Sender<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
    listen_addrs_out: Arc<Mutex<Vec<Multiaddr>>>,
    connected_peers: Arc<AtomicUsize>,
) {
    let topics: Vec<gossipsub::IdentTopic> = Topic::ALL.iter().copied().map(ident_topic).collect();
    for (topic, ident) in Topic::ALL.iter().zip(topics.iter()) {
        if let Err(e) = swarm.behaviour_mut().gossipsub.subscribe(ident) {
            tracing::warn!(target: "networking", %topic, error = %e, "failed to subscribe to gossipsub topic");
        }
    }

    if let Err(e) = swarm.listen_on(listen_addr.clone()) {
        tracing::error!(target: "networking", %listen_addr, error = %e, "failed to listen");
    }
    for addr in &dial_addrs {
        if let Err(e) = swarm.dial(addr.clone()) {
            tracing::warn!(target: "networking", %addr, error = %e, "failed to dial");
        }
    }

    let mut dedup = RecentGossip::new();
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let known_peers = HashSet::<PeerId>::new();
    let _ = known_peers;

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let frame = Message::heartbeat(author.clone(), "still alive");
                if let Ok(data) = serde_json::to_vec(&frame) {
                    let ident = ident_topic(Topic::Heartbeat);
                    match swarm.behaviour_mut().gossipsub.publish(ident, data) {
                        Ok(_) => vladiator_telemetry::metrics().inc_heartbeats_published(),
                        Err(e) => tracing::warn!(target: "networking", error = %e, "failed to publish heartbeat"),
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            event = swarm.select_next_some() => match event {
                SwarmEvent::NewListenAddr { address, .. } => {
                    tracing::info!(target: "networking", %address, "listening");
                    listen_addrs_out.lock().await.push(address);
                }
                SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                    connected_peers.fetch_add(1, Ordering::Relaxed);
                    vladiator_telemetry::metrics().inc_connected_peers();
                    tracing::debug!(target: "networking", %peer_id, "connection established");
                }
                SwarmEvent::ConnectionClosed { peer_id, .. } => {
                    connected_peers.fetch_sub(1, Ordering::Relaxed);
                    vladiator_telemetry::metrics().dec_connected_peers();
                    tracing::debug!(target: "networking", %peer_id, "connection closed");
                }
                SwarmEvent::Behaviour(BusBehaviourEvent::Gossipsub(gossipsub::Event::Message { message, .. })) => {
                    handle_inbound(message.data, &mut dedup, &inbound_tx).await;
                }
                _ => {}
            },
            command = command_rx.recv() => match command {
                Some(Command::Publish(frame, reply)) => {
                    let ident = ident_topic(frame.kind);
                    let result = match serde_json::to_vec(&frame) {
                        Ok(data) => swarm
                            .behaviour_mut()
                            .gossipsub
                            .publish(ident, data)
                            .map(|_| ())
                            .map_err(|e| BusError::Publish(e.to_string())),
                        Err(e) => Err(BusError::Codec(e.to_string())),
                    };
                    let _ = reply.send(result);
                }
                None => break,
            }
        }
    }
}

async fn handle_inbound(
    data: Vec<u8>,
    dedup: &mut RecentGossip,
    inbound_tx: &mpsc::Sender<Message>,
) {
    let frame: Message = match serde_json::from_slice(&data) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(target: "networking", error = %e, "dropping undecodable gossip frame");
            return;
        }
    };

    let topic_str = frame.kind.as_str();
    vladiator_telemetry::metrics().inc_gossip_messages_received(topic_str);

    let is_dup = dedup.check_and_record(
        frame.kind,
        &frame.author,
        &frame.transaction_hash,
        std::time::Instant::now(),
    );
    if is_dup {
        vladiator_telemetry::metrics().inc_dedup_dropped(topic_str);
        return;
    }

    if inbound_tx.send(frame).await.is_err() {
        tracing::debug!(target: "networking", "inbound channel closed; dropping frame");
    }
}
