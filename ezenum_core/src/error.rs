use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EzenumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scan root does not exist or is not a directory: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in file {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Invalid regex pattern: {0}")]
    Regex(String),
}

impl From<regex::Error> for EzenumError {
    fn from(err: regex::Error) -> Self {
        EzenumError::Regex(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EzenumError>;

impl EzenumError {
    pub fn parse_error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EzenumError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        EzenumError::Config(message.into())
    }

    pub fn walk(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        EzenumError::Walk {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Path of the file or directory the error is about, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            EzenumError::RootNotFound { path }
            | EzenumError::Walk { path, .. }
            | EzenumError::Read { path, .. }
            | EzenumError::Write { path, .. } => Some(path),
            EzenumError::Parse { file, .. } => Some(file),
            _ => None,
        }
    }
}
