//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for application-level dict-aggregator operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods in the CLI and loading helpers.
pub type Result<T> = anyhow::Result<T>;

/// Error reported by a dictionary backend operation.
///
/// Backend errors never abort a lookup: a failed article fetch is rendered as an
/// inline notice, a failed search contributes zero results.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend rejected the query before starting any work.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The backend started the operation but could not complete it.
    #[error("{message}")]
    Failed { backend: String, message: String },
}

impl BackendError {
    /// Shorthand for [`BackendError::Failed`].
    pub fn failed(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

/// Error returned when loading a dictionary file fails.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dictionary file could not be read.
    #[error("failed to read dictionary {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dictionary file is not valid TOML or does not match the expected layout.
    #[error("failed to parse dictionary {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The dictionary parsed but its content is unusable.
    #[error("invalid dictionary {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Error returned when reading or applying the configuration file fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A group references a dictionary id that was not loaded.
    #[error("group '{group}' references unknown dictionary '{dictionary}'")]
    UnknownDictionary { group: String, dictionary: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_backend_error_display() {
        check!(BackendError::failed("dict-a", "connection reset").to_string() == "connection reset");
        check!(BackendError::InvalidQuery("empty word".into()).to_string() == "invalid query: empty word");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownDictionary {
            group: "Main".into(),
            dictionary: "missing".into(),
        };
        check!(err.to_string() == "group 'Main' references unknown dictionary 'missing'");
    }
}
