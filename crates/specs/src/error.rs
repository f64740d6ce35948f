use std::path::PathBuf;

/// Errors raised while loading or validating specification files.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("duplicate agent names in specification: {}", .0.join(", "))]
    DuplicateAgents(Vec<String>),

    #[error("duplicate node name '{0}' across arena layers")]
    DuplicateArenaNode(String),

    #[error("project file {path:?} does not name a '{key}' file")]
    MissingProjectKey { path: PathBuf, key: &'static str },
}

impl SpecError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
