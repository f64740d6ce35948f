use crate::command::LaunchCommand;
use anyhow::Context;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use specs::AgentRecord;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::{process::Child, sync::watch, time::sleep};

/// Configuration for the Supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Program that runs each behaviour script; empty to execute scripts directly.
    pub interpreter: String,
    /// Directory handed to every behaviour program for its own logs.
    pub logpath: PathBuf,
    /// Shared file receiving the standard output of all agents.
    pub capture_file: PathBuf,
    /// Pause between the shutdown request and signalling the agents.
    pub settle_delay: Duration,
}

/// A launched behaviour process.
pub struct ManagedAgent {
    pub name: String,
    pub pid: u32,
    pub command: LaunchCommand,
    child: Child,
}

#[derive(Debug)]
pub struct SpawnFailure {
    pub name: String,
    pub error: anyhow::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalOutcome {
    Delivered,
    /// The process had exited before the signal was sent.
    AlreadyExited,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRecord {
    pub name: String,
    pub pid: u32,
    pub outcome: SignalOutcome,
}

/// Owns the behaviour processes of one run, in launch order.
pub struct Supervisor {
    config: SupervisorConfig,
    agents: Vec<ManagedAgent>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            agents: Vec::new(),
        }
    }

    /// Creates the capture file, or empties it if a previous run left output behind.
    pub fn truncate_capture_file(&self) -> anyhow::Result<()> {
        File::create(&self.config.capture_file).with_context(|| {
            format!(
                "Failed to clear capture file '{}'",
                self.config.capture_file.display()
            )
        })?;
        Ok(())
    }

    /// Launches one process per agent, in order.
    ///
    /// An agent whose process cannot be started is reported and skipped; the
    /// others still run. Once `shutdown_rx` holds `true`, no further agent is
    /// launched.
    pub async fn spawn_all(
        &mut self,
        agents: &[AgentRecord],
        shutdown_rx: &watch::Receiver<bool>,
    ) -> Vec<SpawnFailure> {
        let mut failures = Vec::new();

        for agent in agents {
            // Lets the signal listener run between launches.
            tokio::task::yield_now().await;
            if *shutdown_rx.borrow() {
                tracing::warn!(
                    remaining = agents.len() - self.agents.len() - failures.len(),
                    "Shutdown requested during launch, not starting remaining agents"
                );
                break;
            }

            match self.spawn_agent(agent) {
                Ok(managed) => {
                    tracing::info!(agent = %managed.name, pid = managed.pid, command = %managed.command, "Launched agent");
                    self.agents.push(managed);
                }
                Err(error) => {
                    tracing::error!(agent = %agent.name, error = %error, "Failed to launch agent");
                    failures.push(SpawnFailure {
                        name: agent.name.clone(),
                        error,
                    });
                }
            }
        }

        failures
    }

    /// Starts a single behaviour process with its stdout appended to the capture file.
    fn spawn_agent(&self, agent: &AgentRecord) -> anyhow::Result<ManagedAgent> {
        let command = LaunchCommand::for_agent(agent, &self.config.interpreter, &self.config.logpath);

        let capture = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.capture_file)
            .with_context(|| {
                format!(
                    "Failed to open capture file '{}'",
                    self.config.capture_file.display()
                )
            })?;

        // A separate process group keeps a terminal Ctrl-C from reaching the
        // agents directly; they are interrupted by `shutdown` only.
        let child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::from(capture))
            .process_group(0)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", command.program))?;

        let pid = child
            .id()
            .context("Spawned process exited before its pid could be read")?;

        Ok(ManagedAgent {
            name: agent.name.clone(),
            pid,
            command,
            child,
        })
    }

    pub fn agents(&self) -> &[ManagedAgent] {
        &self.agents
    }

    pub fn pids(&self) -> Vec<u32> {
        self.agents.iter().map(|a| a.pid).collect()
    }

    /// Interrupts every managed process once, in launch order.
    ///
    /// Does not wait for the processes to exit.
    pub async fn shutdown(self) -> Vec<SignalRecord> {
        tracing::info!(agents = self.agents.len(), "Interrupting all managed agent processes...");
        sleep(self.config.settle_delay).await;

        let mut records = Vec::with_capacity(self.agents.len());
        for mut agent in self.agents {
            let outcome = interrupt(&mut agent.child, agent.pid);
            match &outcome {
                SignalOutcome::Delivered => {
                    tracing::debug!(agent = %agent.name, pid = agent.pid, "Sent SIGINT to agent process.")
                }
                SignalOutcome::AlreadyExited => {
                    tracing::debug!(agent = %agent.name, pid = agent.pid, "Agent process had already exited.")
                }
                SignalOutcome::Failed(error) => {
                    tracing::warn!(agent = %agent.name, pid = agent.pid, error, "Failed to interrupt agent process.")
                }
            }
            records.push(SignalRecord {
                name: agent.name,
                pid: agent.pid,
                outcome,
            });
        }
        records
    }
}

fn interrupt(child: &mut Child, pid: u32) -> SignalOutcome {
    // An exited child is reaped here, so its pid is never signalled after reuse.
    if let Ok(Some(_)) = child.try_wait() {
        return SignalOutcome::AlreadyExited;
    }

    let raw = match i32::try_from(pid) {
        Ok(raw) => raw,
        Err(_) => return SignalOutcome::Failed(format!("pid {pid} out of range")),
    };
    match kill(Pid::from_raw(raw), Signal::SIGINT) {
        Ok(()) => SignalOutcome::Delivered,
        Err(Errno::ESRCH) => SignalOutcome::AlreadyExited,
        Err(e) => SignalOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::Pose;
    use std::path::Path;
    use std::time::Instant;

    /// Behaviour stand-in: records each SIGINT it receives in `<dir>/<name>.signals`.
    const BEHAVIOUR: &str = r#"
name="$3"
dir="$(dirname "$0")"
trap 'echo INT >> "$dir/$name.signals"' INT
echo "$name running"
touch "$dir/$name.ready"
i=0
while [ $i -lt 100 ]; do sleep 0.05; i=$((i+1)); done
"#;

    fn agent(name: &str, exec_script: &Path) -> AgentRecord {
        AgentRecord {
            name: name.into(),
            kind: "Bee".into(),
            pose: Pose::new(0.0, 0.0, 0.0),
            exec_script: exec_script.to_path_buf(),
            conf: format!("{}.conf", name.to_lowercase()).into(),
            pub_addr: specs::DEFAULT_PUB_ADDR.into(),
            sub_addr: specs::DEFAULT_SUB_ADDR.into(),
        }
    }

    fn config(dir: &Path, interpreter: &str) -> SupervisorConfig {
        SupervisorConfig {
            interpreter: interpreter.into(),
            logpath: dir.join("logs"),
            capture_file: dir.join("bee_output.txt"),
            settle_delay: Duration::ZERO,
        }
    }

    async fn wait_for(path: &Path) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if path.exists() {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[test]
    fn test_truncate_clears_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = Supervisor::new(config(dir.path(), "sh"));
        std::fs::write(dir.path().join("bee_output.txt"), "stale output\n").unwrap();

        supervisor.truncate_capture_file().unwrap();
        let contents = std::fs::read_to_string(dir.path().join("bee_output.txt")).unwrap();
        assert!(contents.is_empty());
    }

    #[tokio::test]
    async fn test_launch_and_interrupt_each_agent_once() {
        let dir = tempfile::tempdir().unwrap();
        let behav_a = dir.path().join("behavA.py");
        let behav_b = dir.path().join("behavB.py");
        std::fs::write(&behav_a, BEHAVIOUR).unwrap();
        std::fs::write(&behav_b, BEHAVIOUR).unwrap();
        let agents = [agent("A", &behav_a), agent("B", &behav_b)];

        let mut supervisor = Supervisor::new(config(dir.path(), "sh"));
        supervisor.truncate_capture_file().unwrap();
        let (_tx, rx) = watch::channel(false);

        let failures = supervisor.spawn_all(&agents, &rx).await;
        assert!(failures.is_empty());
        assert_eq!(supervisor.pids().len(), 2);

        let names: Vec<_> = supervisor.agents().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        for managed in supervisor.agents() {
            let args = &managed.command.args;
            assert!(args.contains(&managed.name));
            assert!(args.contains(&format!("{}.conf", managed.name.to_lowercase())));
            assert!(args.contains(&specs::DEFAULT_PUB_ADDR.to_owned()));
            assert!(args.contains(&specs::DEFAULT_SUB_ADDR.to_owned()));
        }

        // Signals sent before the trap is installed would kill the shell outright.
        assert!(wait_for(&dir.path().join("A.ready")).await);
        assert!(wait_for(&dir.path().join("B.ready")).await);

        let pids = supervisor.pids();
        let records = supervisor.shutdown().await;
        assert_eq!(records.iter().map(|r| r.pid).collect::<Vec<_>>(), pids);
        assert!(records.iter().all(|r| r.outcome == SignalOutcome::Delivered));

        for name in ["A", "B"] {
            let signals = dir.path().join(format!("{name}.signals"));
            assert!(wait_for(&signals).await);
            sleep(Duration::from_millis(200)).await;
            assert_eq!(std::fs::read_to_string(&signals).unwrap(), "INT\n");
        }

        let captured = std::fs::read_to_string(dir.path().join("bee_output.txt")).unwrap();
        assert!(captured.contains("A running"));
        assert!(captured.contains("B running"));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let agents = [
            agent("missing", &dir.path().join("no_such_program")),
            agent("shell", Path::new("/bin/sh")),
        ];

        let mut supervisor = Supervisor::new(config(dir.path(), ""));
        let (_tx, rx) = watch::channel(false);
        let failures = supervisor.spawn_all(&agents, &rx).await;

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "missing");
        assert_eq!(supervisor.agents().len(), 1);
        assert_eq!(supervisor.agents()[0].name, "shell");

        let records = supervisor.shutdown().await;
        assert_eq!(records.len(), 1);
        assert!(!matches!(records[0].outcome, SignalOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_no_launch_after_shutdown_requested() {
        let dir = tempfile::tempdir().unwrap();
        let agents = [agent("A", Path::new("/bin/sh"))];

        let mut supervisor = Supervisor::new(config(dir.path(), ""));
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let failures = supervisor.spawn_all(&agents, &rx).await;
        assert!(failures.is_empty());
        assert!(supervisor.pids().is_empty());
        assert!(supervisor.shutdown().await.is_empty());
    }

    #[tokio::test]
    async fn test_exited_agent_is_not_signalled() {
        let dir = tempfile::tempdir().unwrap();
        // `sh` rejects the launcher's flags and exits immediately.
        let agents = [agent("quick", Path::new("/bin/sh"))];

        let mut supervisor = Supervisor::new(config(dir.path(), ""));
        let (_tx, rx) = watch::channel(false);
        supervisor.spawn_all(&agents, &rx).await;
        sleep(Duration::from_millis(500)).await;

        let records = supervisor.shutdown().await;
        assert_eq!(records[0].outcome, SignalOutcome::AlreadyExited);
    }
}
