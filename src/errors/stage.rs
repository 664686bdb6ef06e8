// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for stage lookup and instantiation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// No built-in stage is registered under this name.
    #[error("Unknown stage implementation: '{name}'")]
    UnknownStage { name: String },

    /// A stage option is missing or has the wrong type.
    #[error("Stage '{stage}' has invalid option '{option}': {reason}")]
    InvalidOption {
        stage: String,
        option: String,
        reason: String,
    },
}
