// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Configuration file loaded.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_railyard::observability::messages::config::ConfigLoaded;
///
/// let msg = ConfigLoaded {
///     path: "configs/squares.yaml",
///     rails: 4,
///     stage_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub rails: usize,
    pub stage_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded pipeline config '{}': {} rails, {} stages",
            self.path, self.rails, self.stage_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            rails = self.rails,
            stage_count = self.stage_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "config_loaded",
            span_name = name,
            path = self.path,
            rails = self.rails,
            stage_count = self.stage_count,
        )
    }
}

/// Configuration failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_railyard::errors::ValidationError;
/// use the_railyard::observability::messages::config::ConfigRejected;
///
/// let error = ValidationError::ZeroHistoryCapacity;
/// let msg = ConfigRejected { error: &error };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ConfigRejected<'a> {
    pub error: &'a dyn std::error::Error,
}

impl Display for ConfigRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Configuration rejected: {}", self.error)
    }
}

impl StructuredLog for ConfigRejected<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("config_rejected", span_name = name, error = %self.error)
    }
}
