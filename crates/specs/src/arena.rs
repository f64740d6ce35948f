//! Project (`.assisi`) and arena (`.arena`) files.
//!
//! A project names the arena file, which places nodes physically, and the
//! neighbourhood graph (`nbg`, DOT format), which connects them. Both names are
//! relative to the directory holding the project file.

use crate::error::SpecError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Physical position of an arena node. Extra keys (`z`, `yaw`, ...) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ArenaPose {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArenaNode {
    #[serde(default)]
    pub pose: Option<ArenaPose>,
}

/// Arena layers, each mapping node names to their placement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Arena {
    pub layers: BTreeMap<String, BTreeMap<String, ArenaNode>>,
}

impl Arena {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;
        serde_yaml::from_str(&yaml).map_err(|e| SpecError::parse(path, e))
    }

    /// Collapses all layers into a single name -> node table.
    ///
    /// Node names must be unique across layers.
    pub fn flatten(&self) -> Result<BTreeMap<String, ArenaNode>, SpecError> {
        let mut all = BTreeMap::new();
        for nodes in self.layers.values() {
            for (name, node) in nodes {
                if all.insert(name.clone(), node.clone()).is_some() {
                    return Err(SpecError::DuplicateArenaNode(name.clone()));
                }
            }
        }
        Ok(all)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectFile {
    arena: Option<String>,
    nbg: Option<String>,
}

/// A loaded project file with its referenced files resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSpec {
    /// Directory containing the project file.
    pub root: PathBuf,
    pub arena_path: PathBuf,
    pub nbg_path: PathBuf,
}

impl ProjectSpec {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpecError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| SpecError::io(path, e))?;
        let file: ProjectFile =
            serde_yaml::from_str(&yaml).map_err(|e| SpecError::parse(path, e))?;

        let absolute = std::path::absolute(path).map_err(|e| SpecError::io(path, e))?;
        let root = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let arena = file.arena.ok_or_else(|| SpecError::MissingProjectKey {
            path: path.to_path_buf(),
            key: "arena",
        })?;
        let nbg = file.nbg.ok_or_else(|| SpecError::MissingProjectKey {
            path: path.to_path_buf(),
            key: "nbg",
        })?;

        Ok(Self {
            arena_path: root.join(arena),
            nbg_path: root.join(nbg),
            root,
        })
    }

    /// Default output location: the topology file with a `.layout` suffix appended.
    pub fn default_layout_path(&self) -> PathBuf {
        let mut name = self.nbg_path.clone().into_os_string();
        name.push(".layout");
        PathBuf::from(name)
    }
}
