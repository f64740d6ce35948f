use crate::error::SpecError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Address the simulator listens on for commands when a listing omits it.
pub const DEFAULT_PUB_ADDR: &str = "tcp://127.0.0.1:5556";
/// Address the simulator publishes state on when a listing omits it.
pub const DEFAULT_SUB_ADDR: &str = "tcp://127.0.0.1:5555";

/// Planar pose of an agent in simulator coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians.
    pub theta: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.x, self.y, self.theta]
    }
}

impl TryFrom<Vec<f64>> for Pose {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y] => Ok(Self::new(*x, *y, 0.0)),
            [x, y, theta] => Ok(Self::new(*x, *y, *theta)),
            other => Err(format!(
                "pose must have 2 or 3 components (x, y[, theta]), got {}",
                other.len()
            )),
        }
    }
}

/// One simulated agent as described by a listing file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub pose: Pose,
    /// Behaviour program run for this agent.
    pub exec_script: PathBuf,
    /// Local configuration handed to the behaviour program.
    pub conf: PathBuf,
    #[serde(default = "default_pub_addr")]
    pub pub_addr: String,
    #[serde(default = "default_sub_addr")]
    pub sub_addr: String,
}

fn default_pub_addr() -> String {
    DEFAULT_PUB_ADDR.to_owned()
}

fn default_sub_addr() -> String {
    DEFAULT_SUB_ADDR.to_owned()
}

/// Parses a listing from its YAML text. `origin` is only used for error reporting.
pub fn parse_listing(yaml: &str, origin: &Path) -> Result<Vec<AgentRecord>, SpecError> {
    // An empty document is an empty listing, not an error.
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str(yaml).map_err(|e| SpecError::parse(origin, e))
}

/// Reads every agent record from a single listing file.
pub fn read_listing(path: impl AsRef<Path>) -> Result<Vec<AgentRecord>, SpecError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;
    let records = parse_listing(&yaml, path)?;
    tracing::debug!(path = %path.display(), agents = records.len(), "Read agent listing");
    Ok(records)
}

/// Reads and concatenates several listings, preserving argument order.
///
/// Fails on the first file that cannot be read or parsed.
pub fn read_listings<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<AgentRecord>, SpecError> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(read_listing(path)?);
    }
    Ok(records)
}

/// Returns every agent name that occurs more than once, sorted, each reported once.
pub fn find_duplicates(records: &[AgentRecord]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.name.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(name, _)| name.to_owned())
        .collect()
}

/// Fails with [`SpecError::DuplicateAgents`] if any agent name is repeated.
pub fn ensure_unique(records: &[AgentRecord]) -> Result<(), SpecError> {
    let duplicates = find_duplicates(records);
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(SpecError::DuplicateAgents(duplicates))
    }
}
