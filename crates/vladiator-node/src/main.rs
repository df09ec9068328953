// Path: crates/vladiator-node/src/main.rs
#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use libp2p::{identity, Multiaddr};
use std::path::PathBuf;
use std::sync::Arc;
use vladiator_crypto::sign::evm::EvmKeyPair;
use vladiator_crypto::sign::substrate::SubstrateKeyPair;
use vladiator_drivers::{evm::EvmDriver, substrate::SubstrateDriver, ChainDriver};
use vladiator_features::{EchoFeature, MemoFeature, Registry};
use vladiator_networking::{Bus, GossipBus};
use vladiator_orchestrator::{sinks::LoggingSink, ObservabilitySink, Vladiator};
use vladiator_types::config::{NodeConfig, NodeEnv};

#[derive(Parser, Debug)]
#[command(about = "Runs a Vladiator validator node")]
struct Opts {
    /// Path to the network map (`networks.toml`): label -> chain config.
    #[clap(long, env = "NETWORKS_CONFIG")]
    config: PathBuf,

    /// Address this node listens on for gossip connections.
    #[clap(long, env = "LISTEN_ADDRESS", default_value = "/ip4/0.0.0.0/tcp/0")]
    listen_address: Multiaddr,

    /// Address the telemetry HTTP server (`/metrics`, `/healthz`) binds to.
    #[clap(long, env = "TELEMETRY_ADDR", default_value = "127.0.0.1:9615")]
    telemetry_addr: std::net::SocketAddr,

    /// Maximum length a `MemoFeature` payload may carry.
    #[clap(long, env = "MEMO_FEATURE_MAX_LEN", default_value_t = 256)]
    memo_feature_max_len: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    vladiator_telemetry::init::init_tracing()?;
    let metrics_sink = vladiator_telemetry::prometheus::install()?;
    vladiator_telemetry::sinks::SINK
        .set(metrics_sink)
        .map_err(|_| anyhow!("metrics sink must be installed only once"))?;

    let opts = Opts::parse();
    tracing::info!(target: "node", event = "startup", config = ?opts.config);

    tokio::spawn(vladiator_telemetry::http::run_server(opts.telemetry_addr));

    let node_config = NodeConfig::load(&opts.config).context("loading network config")?;
    let env = NodeEnv::from_env().context("reading node environment")?;

    let local_key = match &env.p2p_private_key {
        Some(encoded) => {
            let bytes = base64_decode(encoded).context("decoding P2P_PRIVATE_KEY")?;
            identity::Keypair::from_protobuf_encoding(&bytes)
                .context("parsing P2P_PRIVATE_KEY as a protobuf-encoded libp2p keypair")?
        }
        None => {
            tracing::warn!(target: "node", "no P2P_PRIVATE_KEY set; generating an ephemeral libp2p identity");
            identity::Keypair::generate_ed25519()
        }
    };

    // BOOTNODE: listen on the announced address rather than an ephemeral
    // port (spec §6). The data-stream broadcaster this port historically
    // doubled for is an out-of-scope collaborator; only the listen address
    // itself is honored here.
    let listen_address = if env.bootnode {
        match &env.announce_address {
            Some(addr) => addr
                .parse()
                .context("parsing ANNOUNCE_ADDRESS as a multiaddr")?,
            None => {
                tracing::warn!(target: "node", "BOOTNODE is true but ANNOUNCE_ADDRESS is unset; falling back to --listen-address");
                opts.listen_address.clone()
            }
        }
    } else {
        opts.listen_address.clone()
    };

    let dial_addrs: Vec<Multiaddr> = env
        .bootstrap_peers
        .iter()
        .filter_map(|addr| match addr.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(target: "node", peer = %addr, error = %e, "skipping unparsable bootstrap peer");
                None
            }
        })
        .collect();

    let bus = GossipBus::start(
        local_key,
        env.node_public_key.clone(),
        listen_address,
        &dial_addrs,
    )
    .map_err(|e| anyhow!("starting gossip bus: {e}"))?;
    let bus: Arc<dyn Bus> = Arc::new(bus);

    let drivers = build_drivers(&node_config, &env.node_private_key).await?;
    if drivers.is_empty() {
        return Err(anyhow!("no chain drivers configured in {:?}", opts.config));
    }

    let mut features = Registry::new();
    features.register(Arc::new(EchoFeature));
    features.register(Arc::new(MemoFeature::new(opts.memo_feature_max_len)));

    let sinks: Vec<Arc<dyn ObservabilitySink>> = vec![Arc::new(LoggingSink)];
    let orchestrator = Arc::new(Vladiator::new(
        bus.clone(),
        drivers,
        Arc::new(features),
        env.node_public_key.clone(),
        sinks,
    ));

    let run_handle = tokio::spawn(orchestrator.clone().run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "node", event = "shutdown", reason = "ctrl-c");
        }
    }

    orchestrator.shutdown().await;
    run_handle.abort();
    tracing::info!(target: "node", event = "shutdown", reason = "complete");
    Ok(())
}

/// Builds one driver per configured network, dispatching on `kind` (spec
/// §4.1's chain-family variants). Both families sign with the same
/// `node_private_key` material, reinterpreted under the destination chain's
/// scheme (spec §1: "the node private key is a configuration input").
async fn build_drivers(
    config: &NodeConfig,
    node_private_key: &str,
) -> Result<Vec<Arc<dyn ChainDriver>>> {
    let mut drivers: Vec<Arc<dyn ChainDriver>> = Vec::new();
    for (label, network) in &config.networks {
        let chain_id: u64 = network
            .id
            .parse()
            .with_context(|| format!("network {label:?} has a non-numeric id {:?}", network.id))?;

        match network.kind.as_str() {
            "EVMMV3" => {
                let signing_key = EvmKeyPair::from_hex(node_private_key)
                    .context("parsing NODE_PRIVATE_KEY as an EVM secp256k1 key")?;
                let driver = EvmDriver::connect(
                    chain_id,
                    &network.rpc,
                    &network.message_contract,
                    network.finality,
                    signing_key,
                )
                .with_context(|| format!("connecting EVM driver for {label:?}"))?;
                drivers.push(Arc::new(driver));
            }
            "Reef" | "Substrate" => {
                let seed = hex::decode(node_private_key.trim_start_matches("0x"))
                    .context("NODE_PRIVATE_KEY is not valid hex")?;
                let seed: [u8; 32] = seed
                    .try_into()
                    .map_err(|_| anyhow!("NODE_PRIVATE_KEY must decode to exactly 32 bytes for substrate signing"))?;
                let signing_key =
                    SubstrateKeyPair::from_seed(&seed).context("building substrate signing key")?;
                let driver = SubstrateDriver::connect(
                    chain_id,
                    &network.rpc,
                    &network.message_contract,
                    signing_key,
                )
                .await
                .with_context(|| format!("connecting substrate driver for {label:?}"))?;
                drivers.push(Arc::new(driver));
            }
            other => {
                return Err(anyhow!(
                    "network {label:?} has unrecognized driver kind {other:?}"
                ))
            }
        }
    }
    Ok(drivers)
}

fn base64_decode(s: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(s)
        .map_err(|e| anyhow!("invalid base64: {e}"))
}
