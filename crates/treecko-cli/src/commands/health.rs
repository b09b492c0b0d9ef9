//! Health command - serve or print the service status.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Args;

use treecko_core::{HealthStatus, TransactionStore, TreeckoConfig};

use super::open_store;
use crate::health_server::{HealthServer, StatusProvider};

/// Arguments for the health command.
#[derive(Args)]
pub struct HealthArgs {
    /// Port to listen on (default: from config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the current status as JSON and exit
    #[arg(long)]
    once: bool,
}

pub async fn run(args: HealthArgs, config: &TreeckoConfig) -> anyhow::Result<()> {
    let store = Arc::new(Mutex::new(open_store(config)?));
    let sheets_configured = config.sheet.path.is_some();

    let provider: StatusProvider = Arc::new(move || {
        let connected = store.lock().map(|s| s.is_connected()).unwrap_or(false);
        HealthStatus::now(connected, sheets_configured)
    });

    if args.once {
        println!("{}", serde_json::to_string_pretty(&provider().to_json())?);
        return Ok(());
    }

    let port = args.port.unwrap_or(config.health.port);
    let server = HealthServer::bind(port, provider)
        .await?
        .with_read_timeout(Duration::from_secs(config.health.read_timeout_seconds));
    println!("Health endpoint listening on {}", server.local_addr()?);

    tokio::select! {
        result = server.serve() => result?,
        _ = tokio::signal::ctrl_c() => {}
    }

    Ok(())
}
