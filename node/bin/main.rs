use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::info;

use tracing_chrome::{ChromeLayerBuilder, TraceStyle};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "node")]
#[command(version = "0.1")]
#[command(about = "Remote Execution storage and scheduler frontend", long_about = None)]
struct Args {
    /// Path to the node configuration file
    #[arg(long)]
    config: PathBuf,

    /// Enable traces for visualizing in https://ui.perfetto.dev
    #[arg(long)]
    trace: bool,
}

/// Read the node config
async fn read_config(config_file: PathBuf) -> anyhow::Result<node_lib::Config> {
    let mut file = File::open(&config_file)
        .await
        .with_context(|| format!("Failed to open {}", config_file.display()))?;
    let mut contents = vec![];
    file.read_to_end(&mut contents).await?;
    let contents = std::str::from_utf8(&contents)?;
    toml::from_str(contents).with_context(|| format!("Failed to parse {}", config_file.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = read_config(args.config).await?;

    let _guard = if args.trace {
        let (chrome_layer, guard) = ChromeLayerBuilder::new()
            .include_args(true)
            .trace_style(TraceStyle::Async)
            .build();
        tracing_subscriber::registry().with(chrome_layer).init();
        Some(guard)
    } else {
        tracing_subscriber::fmt::init();
        None
    };

    info!(?config, "starting node");
    let address = config.node.address;
    node_lib::start_node(config.node, node_lib::Connection::Tcp(address)).await
}
