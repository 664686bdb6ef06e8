// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur during pipeline configuration validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The rail count is zero or above the supported maximum
    RailCountOutOfRange {
        /// The configured rail count
        requested: usize,
        /// The largest accepted rail count
        maximum: usize,
    },
    /// The source range produces no values
    EmptySourceRange {
        /// Inclusive range start
        start: i64,
        /// Exclusive range end
        end: i64,
    },
    /// A stage references an implementation that doesn't exist
    UnknownStage {
        /// Position of the stage in the pipeline
        index: usize,
        /// The unresolved implementation name
        name: String,
    },
    /// Two stages share the same id
    DuplicateStageId {
        /// The duplicate stage ID
        stage_id: String,
    },
    /// The output history buffer cannot hold anything
    ZeroHistoryCapacity,
    /// The async terminal was configured without any in-flight capacity
    ZeroAsyncCapacity,
    /// A dedicated rail runtime was requested with no worker threads
    ZeroWorkerThreads,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::RailCountOutOfRange { requested, maximum } => {
                write!(
                    f,
                    "Rail count {} is out of range: expected 1..={}",
                    requested, maximum
                )
            }
            ValidationError::EmptySourceRange { start, end } => {
                write!(f, "Source range {}..{} produces no values", start, end)
            }
            ValidationError::UnknownStage { index, name } => {
                write!(f, "Stage #{} uses unknown implementation '{}'", index, name)
            }
            ValidationError::DuplicateStageId { stage_id } => {
                write!(f, "Duplicate stage ID: '{}'", stage_id)
            }
            ValidationError::ZeroHistoryCapacity => {
                write!(f, "History capacity must be greater than zero")
            }
            ValidationError::ZeroAsyncCapacity => {
                write!(f, "Async capacity must be greater than zero")
            }
            ValidationError::ZeroWorkerThreads => {
                write!(f, "Worker threads must be greater than zero when set")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a pipeline configuration or building its runtime.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration validation failed:\n{}", format_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Stage(#[from] crate::errors::StageError),

    #[error(transparent)]
    Buffer(#[from] crate::errors::BufferError),

    #[error("Failed to build rail runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
