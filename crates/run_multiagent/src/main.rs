mod command;
mod config;
mod report;
mod signal;
mod supervisor;

use crate::config::Config;
use crate::signal::ShutdownSignal;
use crate::supervisor::Supervisor;
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

/// Time left to the agents after they were interrupted, before the launcher exits.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the status report.
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    tracing::info!(config = ?config, "Loaded configuration");

    // --- 1. Validate every listing before anything is launched ---
    let agents = specs::read_listings(&config.obj_listing)
        .context("Failed to read agent listings")?;
    specs::ensure_unique(&agents).context("Agents are managed by name; aborting")?;
    print!("{}", report::agent_table(&agents));

    // --- 2. Route SIGINT/SIGTERM into the shutdown channel ---
    let mut shutdown_signal =
        ShutdownSignal::install().context("Failed to install signal handlers")?;
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal.recv().await;
        let _ = shutdown_tx.send(true);
    });

    // --- 3. Launch ---
    let mut supervisor = Supervisor::new(config.supervisor_config());
    supervisor.truncate_capture_file()?;
    println!("Started at: {}", report::timestamp());

    let failures = supervisor.spawn_all(&agents, &shutdown_rx).await;
    for managed in supervisor.agents() {
        println!("Launching agent '{}'", managed.name);
        println!("   {}", managed.command);
    }
    print!("{}", report::spawn_failures(&failures));
    println!("[I] PIDs are {:?}", supervisor.pids());
    println!("[I] wrapper has pid {}", std::process::id());

    // --- 4. Supervise until interrupted ---
    if shutdown_rx.wait_for(|stop| *stop).await.is_err() {
        tracing::warn!("Signal listener stopped; shutting down.");
    }

    println!("\nshutting down...");
    let signalled = supervisor.shutdown().await;
    print!("{}", report::shutdown(&signalled));

    tokio::time::sleep(SHUTDOWN_GRACE).await;
    println!(
        "[] (agent behaviour wrapper) Finished at: {}",
        report::timestamp()
    );
    Ok(())
}
