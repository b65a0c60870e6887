use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageMapError {
    #[error("Missing `{name}`")]
    MissingArgument { name: String },

    #[error("Invalid filter [{descriptor}]")]
    InvalidPredicate { descriptor: String },

    #[error("Unable to load stats for [{path}]: {source}")]
    StatUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to list directory [{path}]: {source}")]
    ListUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PageMapError>;

impl PageMapError {
    pub(crate) fn missing(name: &str) -> Self {
        Self::MissingArgument {
            name: name.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArgument { .. } => 2,
            Self::InvalidPredicate { .. } | Self::InvalidPattern { .. } => 3,
            Self::StatUnavailable { .. } | Self::ListUnavailable { .. } => 4,
            Self::ConfigParse { .. } | Self::ConfigKeyNotFound { .. } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message() {
        let err = PageMapError::missing("base_path");
        assert_eq!(err.to_string(), "Missing `base_path`");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_io_errors_fall_back_to_generic_code() {
        let err = PageMapError::from(std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), 1);
    }
}
