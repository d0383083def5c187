//! LSCC node entrypoint: load configuration, assemble the node, run its
//! background workers until interrupted.

use lscc_node::{LsccConfig, Node, Supervisor};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lscc_node=info,lscc_shard=info,lscc_crosschannel=info,lscc_consensus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var("LSCC_CONFIG").ok().map(PathBuf::from);
    let config = LsccConfig::load(config_path.as_deref())?;
    tracing::info!(?config, "starting lscc node");

    let node = Arc::new(Node::new(config));
    let supervisor = Supervisor::start(node.clone());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    supervisor.stop().await;
    Ok(())
}
