//! Human-readable status written to stdout.

use crate::supervisor::{SignalOutcome, SignalRecord, SpawnFailure};
use specs::AgentRecord;
use std::fmt::Write;

/// Summarises the agents about to be run, one row per agent.
pub fn agent_table(agents: &[AgentRecord]) -> String {
    let width = agents.iter().map(|a| a.name.len()).max().unwrap_or(0) + 1;

    let mut out = String::new();
    let _ = writeln!(out, "[I] {} agents to run:", agents.len());
    let _ = writeln!(
        out,
        "\t{:<width$} ({:<4})  {:<20} {:<20}",
        "agent", "type", "behav", "config"
    );
    for agent in agents {
        let _ = writeln!(
            out,
            "\t{:<width$} ({:<4}): {:<20} {:<20}",
            agent.name,
            agent.kind,
            agent.exec_script.to_string_lossy(),
            agent.conf.to_string_lossy(),
        );
    }
    out
}

pub fn spawn_failures(failures: &[SpawnFailure]) -> String {
    let mut out = String::new();
    for failure in failures {
        let _ = writeln!(
            out,
            "[W] agent '{}' was not launched: {}",
            failure.name, failure.error
        );
    }
    out
}

pub fn shutdown(records: &[SignalRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = match &record.outcome {
            SignalOutcome::Delivered => writeln!(out, "  killing process  {}", record.pid),
            SignalOutcome::AlreadyExited => {
                writeln!(out, "  process {} ({}) had already exited", record.pid, record.name)
            }
            SignalOutcome::Failed(e) => {
                writeln!(out, "  could not signal process {}: {}", record.pid, e)
            }
        };
    }
    out
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use specs::Pose;

    fn agent(name: &str, kind: &str, exec: &str, conf: &str) -> AgentRecord {
        AgentRecord {
            name: name.into(),
            kind: kind.into(),
            pose: Pose::new(0.0, 0.0, 0.0),
            exec_script: exec.into(),
            conf: conf.into(),
            pub_addr: specs::DEFAULT_PUB_ADDR.into(),
            sub_addr: specs::DEFAULT_SUB_ADDR.into(),
        }
    }

    #[test]
    fn test_agent_table_columns() {
        let table = agent_table(&[
            agent("A", "Bee", "behavA.py", "a.conf"),
            agent("casu-01", "Casu", "behavB.py", "b.conf"),
        ]);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "[I] 2 agents to run:");
        assert!(lines[1].starts_with("\tagent    (type)  behav"));
        assert!(lines[2].starts_with("\tA        (Bee ): behavA.py"));
        assert!(lines[2].contains(" a.conf"));
        assert!(lines[3].starts_with("\tcasu-01  (Casu): behavB.py"));
        assert!(lines[3].contains(" b.conf"));
    }

    #[test]
    fn test_shutdown_lines() {
        let text = shutdown(&[
            SignalRecord {
                name: "A".into(),
                pid: 41,
                outcome: SignalOutcome::Delivered,
            },
            SignalRecord {
                name: "B".into(),
                pid: 42,
                outcome: SignalOutcome::AlreadyExited,
            },
        ]);
        assert_eq!(
            text,
            "  killing process  41\n  process 42 (B) had already exited\n"
        );
    }
}
