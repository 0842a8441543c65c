//! NFT Bridge operator CLI
//!
//! Runs one bridging flow per invocation against the configured source and
//! target chains and prints the JSON result with explorer links.

use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::info;

use nft_bridge::{
    BridgeOptions, BridgeSettings, ChainContext, Config, EvmSourceChain, EvmTargetChain,
    NftBridge, PaintswapIndex, Progress, SetUrisMode,
};

#[derive(Parser)]
#[command(name = "nft-bridge")]
#[command(about = "Bridge NFT collections between EVM chains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Skip collection validation (verified, size and sale checks)
    #[arg(long = "override", global = true)]
    override_requirements: bool,

    /// Owner of the bridged contract instead of the original's owner()
    #[arg(long, global = true)]
    owner: Option<Address>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a bridged collection and airdrop it to current holders
    Bridge { address: Address },

    /// Airdrop current holders onto an existing bridged collection
    Remint { address: Address },

    /// Mint every bridged token to the operator
    Reclaim { address: Address },

    /// Reclaim, clear, redeploy and re-airdrop a bridged collection
    Rebridge { address: Address },

    /// Approve a collection for bridging
    Approve {
        address: Address,

        /// Revoke approval instead
        #[arg(long)]
        revoke: bool,
    },

    /// Clear the bridge registry entry of a collection
    Clear { address: Address },

    /// Replay token URIs onto a bridged collection
    SetUris {
        address: Address,

        /// First token id to replay
        #[arg(long, default_value_t = 0)]
        start_index: u64,

        /// bridge, direct or enumerable
        #[arg(long, default_value = "bridge")]
        mode: SetUrisMode,
    },

    /// Transfer ownership of a bridged token contract held by the operator
    TransferOwnership { token: Address, new_owner: Address },

    /// Show both sides of a bridged pair
    Resolve { address: Address },
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = Config::load()?;
    info!(
        source_rpc = %config.source_rpc_url,
        target_rpc = %config.target_rpc_url,
        bridge_control = %config.bridge_control_address,
        env = ?config.bridge_env,
        "Configuration loaded"
    );

    let source = EvmSourceChain::new(
        ChainContext::source(config.source_chain_id, config.source_rpc_url.clone()),
        config.royalty_registry_address,
        config.multicall_address,
    )?;
    let target = EvmTargetChain::new(
        ChainContext::target(config.target_chain_id, config.target_rpc_url.clone()),
        config.bridge_control_address,
        &config.deployer_private_key,
        config.wait_for_receipts,
    )?;
    let index = PaintswapIndex::new(&config.nft_index_url, config.index_timeout)?;

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_progress(progress_rx));

    let bridge = NftBridge::new(
        Arc::new(source),
        Arc::new(target),
        Arc::new(index),
        BridgeSettings::from_config(&config),
    )?
    .with_progress(progress_tx);

    let options = BridgeOptions {
        override_requirements: cli.override_requirements,
        owner_override: cli.owner,
    };

    let response = run(&bridge, cli.command, &options).await?;

    drop(bridge);
    let _ = printer.await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    let mut hashes = Vec::new();
    collect_tx_hashes(&response, &mut hashes);
    for hash in &hashes {
        println!("{}", config.tx_link(hash));
    }

    if response.get("error").is_some() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(bridge: &NftBridge, command: Commands, options: &BridgeOptions) -> eyre::Result<Value> {
    let response = match command {
        Commands::Bridge { address } => bridge.bridge(address, options).await?.to_response(),
        Commands::Remint { address } => bridge.remint(address, options).await?.to_response(),
        Commands::Reclaim { address } => bridge.reclaim(address, options).await?.to_response(),
        Commands::Rebridge { address } => bridge.rebridge(address, options).await?.to_response(),
        Commands::Approve { address, revoke } => {
            let tx = bridge.approve(address, !revoke).await?;
            json!({ "collection": address, "approved": !revoke, "tx": tx })
        }
        Commands::Clear { address } => bridge.clear(address).await?.to_response(),
        Commands::SetUris {
            address,
            start_index,
            mode,
        } => bridge.set_uris(address, start_index, mode).await?.to_response(),
        Commands::TransferOwnership { token, new_owner } => {
            let tx = bridge.transfer_ownership(token, new_owner).await?;
            json!({ "token": token, "new_owner": new_owner, "tx": tx })
        }
        Commands::Resolve { address } => match bridge.resolve(address).await? {
            Some(resolution) => serde_json::to_value(resolution)?,
            None => json!({
                "error": "Address is neither an original nor a bridged collection",
                "address": address,
            }),
        },
    };
    Ok(response)
}

async fn print_progress(mut rx: mpsc::UnboundedReceiver<Progress>) {
    while let Some(progress) = rx.recv().await {
        println!("[{}/{}] {}", progress.step, progress.total, progress.message);
    }
}

/// Hashes of every serialized `TxHandle` in a response
fn collect_tx_hashes(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let (Some(Value::String(hash)), Some(Value::Bool(_))) =
                (map.get("hash"), map.get("confirmed"))
            {
                out.push(hash.clone());
                return;
            }
            for v in map.values() {
                collect_tx_hashes(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_tx_hashes(v, out);
            }
        }
        _ => {}
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nft_bridge=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
