use anyhow::{Context, Result};
use eth_tx_monitor::config::Config;
use eth_tx_monitor::emitter::{Emitter, LogEmitter};
use eth_tx_monitor::monitor::Monitor;
use eth_tx_monitor::rpc::RpcClient;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting transaction monitor");

    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!(
        "RPC URLs: {} endpoint(s) configured",
        config.json_rpc_urls.len()
    );

    // The log file is closed when the emitter is dropped, on every return path.
    let mut emitter = LogEmitter::open(config.log_file()).context("Failed to open log sink")?;

    let client = match RpcClient::connect(&config.json_rpc_urls).await {
        Ok(client) => client,
        Err(e) => {
            emitter.emit(&format!("❌ Connection failed: {}", e));
            error!("RPC connection error: {}", e);
            return Err(e);
        }
    };
    info!("RPC client connected to chain id {}", client.chain_id());

    let mut monitor = Monitor::start(client, emitter, &config).await?;
    monitor.run().await;

    Ok(())
}
