//! Operational probe for configured backend dependencies.
//!
//! Loads an uplink TOML config, starts one connection manager per
//! dependency, and reports health until interrupted.

use clap::Parser;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uplink::channel::http_surface;
use uplink::config::load_config;
use uplink::observability::{logging, LogRegistry};
use uplink::{ConnectionManager, TcpConnector};

#[derive(Parser)]
#[command(name = "uplink-probe")]
#[command(about = "Watch the health of configured backend dependencies", long_about = None)]
struct Cli {
    /// Path to the uplink TOML configuration.
    #[arg(short, long, default_value = "uplink.toml")]
    config: PathBuf,

    /// Seconds between health reports.
    #[arg(short, long, default_value_t = 5)]
    report_interval: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init(&config.observability.log_filter);

    let registry = LogRegistry::new();
    let mut managers: Vec<Arc<ConnectionManager<Value, Value>>> = Vec::new();

    for dep in &config.dependencies {
        let connector = Arc::new(TcpConnector::new(dep.connect_timeout()));
        let manager = Arc::new(ConnectionManager::new(
            dep.clone(),
            connector,
            http_surface("/rpc"),
            &registry,
        ));
        if let Err(e) = manager.start().await {
            tracing::error!(service = %dep.name, error = %e, "failed to start manager");
            continue;
        }
        managers.push(manager);
    }

    if managers.is_empty() {
        tracing::error!("no dependencies started, exiting");
        return Ok(());
    }

    let report = Duration::from_secs(cli.report_interval);
    loop {
        tokio::select! {
            _ = tokio::time::sleep(report) => {
                for manager in &managers {
                    println!("{:<24} {}", manager.service_name(), manager.health());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping managers");
                break;
            }
        }
    }

    for manager in &managers {
        manager.stop().await;
    }

    Ok(())
}
