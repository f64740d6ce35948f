use specs::AgentRecord;
use std::fmt;
use std::path::Path;

/// The program and arguments used to run one agent's behaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Builds the command line for `agent`.
    ///
    /// With a non-empty `interpreter` the behaviour script is passed to it as the
    /// first argument; otherwise the script is executed directly.
    pub fn for_agent(agent: &AgentRecord, interpreter: &str, logpath: &Path) -> Self {
        let script = agent.exec_script.to_string_lossy().into_owned();
        let (program, mut args) = if interpreter.is_empty() {
            (script, Vec::new())
        } else {
            (interpreter.to_owned(), vec![script])
        };

        args.extend([
            format!("--logpath={}", logpath.display()),
            "-bn".to_owned(),
            agent.name.clone(),
            "-sa".to_owned(),
            agent.sub_addr.clone(),
            "-pa".to_owned(),
            agent.pub_addr.clone(),
            "-c".to_owned(),
            agent.conf.to_string_lossy().into_owned(),
        ]);

        Self { program, args }
    }

    pub fn to_command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
