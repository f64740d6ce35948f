use crate::supervisor::SupervisorConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// `run_multiagent` - runs the behaviour program of every agent in one or more
/// listing files, one process per agent.
///
/// Agents may be heterogeneous: each record names its own program and local
/// configuration. Once everything is launched, Ctrl-C is forwarded to every
/// behaviour process so each can close gracefully.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Files listing all agents spawned in the simulator (one or more).
    #[arg(short = 'l', long = "obj-listing", required = true, num_args = 1..)]
    pub obj_listing: Vec<PathBuf>,

    /// Directory the behaviour programs record their output in.
    #[arg(long)]
    pub logpath: PathBuf,

    /// Captures the standard output of all launched behaviour programs.
    ///
    /// The file is cleared at startup.
    #[arg(short = 's', long, default_value = "/tmp/bee_output.txt")]
    pub stdout_logfile: PathBuf,

    /// Program used to run each agent's `exec_script`.
    ///
    /// An empty value runs `exec_script` directly.
    #[arg(long, env = "AGENT_INTERPRETER", default_value = "python")]
    pub interpreter: String,

    /// Pause between the interrupt and forwarding it to the agents.
    #[arg(long, default_value_t = 250)]
    pub settle_ms: u64,
}

impl Config {
    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig {
            interpreter: self.interpreter.clone(),
            logpath: self.logpath.clone(),
            capture_file: self.stdout_logfile.clone(),
            settle_delay: Duration::from_millis(self.settle_ms),
        }
    }
}
