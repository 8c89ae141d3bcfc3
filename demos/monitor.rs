//! Polls a cluster and prints a summary of every published snapshot.
//!
//! ```text
//! PVE_HOST=pve.example.com PVE_USERNAME=monitor PVE_PASSWORD=... \
//!     cargo run --example monitor [config.toml]
//! ```

use pve_fleet_monitor::{MonitorConfig, PollingCoordinator, ProxmoxClient, ProxmoxResult, Snapshot};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_summary(snapshot: &Snapshot) {
    println!(
        "{} nodes, {} VMs, {} containers, {} storage volumes",
        snapshot.nodes.len(),
        snapshot.vms().count(),
        snapshot.containers().count(),
        snapshot.storage.len()
    );
    for node in snapshot.nodes.values() {
        println!(
            "  {:<12} online={:<5} cpu={:>6.2}% mem={:>6.2}%",
            node.node,
            node.is_online(),
            node.cpu_percentage(),
            node.memory_percentage()
        );
        for guest in snapshot.guests_on(&node.node) {
            println!(
                "    {:>5} {:<9} {:<20} running={}",
                guest.vmid,
                guest.kind.to_string(),
                guest.name,
                guest.is_running()
            );
        }
    }
    for volume in snapshot.storage.values() {
        println!(
            "  {:<24} {:>9.2} / {:>9.2} GB ({}%)",
            volume.key(),
            volume.used_gb(),
            volume.total_gb(),
            volume.usage_percentage()
        );
    }
}

#[tokio::main]
async fn main() -> ProxmoxResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MonitorConfig::load_from(path)?,
        None => MonitorConfig::load()?,
    };

    let client = ProxmoxClient::from_config(&config)?;
    if !client.connect().await {
        error!(host = %config.host, "Cannot connect to Proxmox VE, giving up");
        std::process::exit(1);
    }

    let coordinator = Arc::new(PollingCoordinator::with_settings(
        Arc::new(client),
        config.polling_settings(),
    ));

    let mut updates = coordinator.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = Arc::clone(&updates.borrow_and_update());
            print_summary(&snapshot);
        }
    });

    coordinator
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Ctrl-C received");
        })
        .await;

    let status = coordinator.status().await;
    info!(
        cycles = status.cycles,
        consecutive_failures = status.consecutive_failures,
        "Monitor stopped"
    );
    printer.abort();
    Ok(())
}
