use anyhow::Context;
use clap::Parser;
use sim_control::SimControl;
use specs::{AgentRecord, DEFAULT_PUB_ADDR, DEFAULT_SUB_ADDR};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

/// `reset_simpop` - moves every agent in one or more listing files back to
/// the pose given in its listing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Config {
    /// Files listing all agents spawned in the simulator (one or more).
    #[arg(short = 'l', long = "obj-listing", required = true, num_args = 1..)]
    obj_listing: Vec<PathBuf>,

    /// Address the simulator publishes its state on.
    #[arg(long, env = "SIM_SUB_ADDR", default_value = DEFAULT_SUB_ADDR)]
    sub_addr: String,

    /// Address the simulator accepts commands on.
    #[arg(long, env = "SIM_PUB_ADDR", default_value = DEFAULT_PUB_ADDR)]
    pub_addr: String,

    /// Verbosity; 1 or more also lists the agents before teleporting.
    #[arg(long, default_value_t = 0)]
    verb: u8,
}

/// One status line per agent: name, type and pose components.
fn pose_line(agent: &AgentRecord, width: usize) -> String {
    let pose = agent
        .pose
        .components()
        .iter()
        .map(|c| format!("{c:+.2}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("\t{:<width$} ({:<4}): {:<20}", agent.name, agent.kind, pose)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    tracing::info!(config = ?config, "Loaded configuration");

    let agents = specs::read_listings(&config.obj_listing)
        .context("Failed to read agent listings")?;
    if agents.is_empty() {
        tracing::info!("No agents listed; nothing to reset.");
        return Ok(());
    }
    if config.verb > 0 {
        println!("[I] resetting {} agents", agents.len());
    }

    let mut control = SimControl::connect(&config.pub_addr, &config.sub_addr)
        .await
        .context("Failed to reach the simulator")?;
    tracing::info!(
        pub_addr = control.pub_addr(),
        sub_addr = control.sub_addr(),
        "Connected to simulator"
    );

    let width = agents.iter().map(|a| a.name.len()).max().unwrap_or(0) + 1;
    for agent in &agents {
        println!("{}", pose_line(agent, width));
        control
            .teleport(&agent.name, &agent.pose)
            .await
            .with_context(|| format!("Failed to teleport '{}'", agent.name))?;
    }

    control.disconnect().await;
    Ok(())
}
