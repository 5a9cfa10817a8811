use std::path::PathBuf;

use glide_core::ConfigError;
use glide_core::input_parser::InputParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("step {step}: bad input record: {source}")]
    Input {
        step: usize,
        #[source]
        source: InputParseError,
    },

    #[error("invalid script: {message}")]
    InvalidScript { message: String },

    #[error("required path does not exist: {path}")]
    MissingPath { path: PathBuf },

    #[error("host still holds {count} resource(s) after dispose")]
    LeakDetected { count: usize },
}

impl HarnessError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Input { .. } | Self::InvalidScript { .. } => 2,
            Self::LeakDetected { .. } => 3,
            _ => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScript {
            message: message.into(),
        }
    }
}
