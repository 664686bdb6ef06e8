// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for parallel pipeline lifecycle and rail events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline start and terminal operation selection
//! * Producer completion and upstream failure
//! * Rail completion and stage failure
//! * Failure broadcast to the remaining rails

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Parallel pipeline started.
///
/// # Log Level
/// `debug!` - Emitted once per terminal operation
///
/// # Example
/// ```
/// use the_railyard::observability::messages::rail::PipelineStarted;
///
/// let msg = PipelineStarted { rails: 4 };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct PipelineStarted {
    pub rails: usize,
}

impl Display for PipelineStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Starting parallel pipeline on {} rails", self.rails)
    }
}

impl StructuredLog for PipelineStarted {
    fn log(&self) {
        tracing::debug!(rails = self.rails, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pipeline", span_name = name, rails = self.rails)
    }
}

/// Producer drained the upstream and completed every rail.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
///
/// # Example
/// ```
/// use the_railyard::observability::messages::rail::ProducerFinished;
///
/// let msg = ProducerFinished {
///     delivered: 100,
///     rails: 4,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ProducerFinished {
    pub delivered: usize,
    pub rails: usize,
}

impl Display for ProducerFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Producer finished: {} values delivered across {} rails",
            self.delivered, self.rails
        )
    }
}

impl StructuredLog for ProducerFinished {
    fn log(&self) {
        tracing::debug!(
            delivered = self.delivered,
            rails = self.rails,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "producer_finished",
            span_name = name,
            delivered = self.delivered,
            rails = self.rails,
        )
    }
}

/// Producer stopped early because every rail consumer went away.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
pub struct ProducerAbandoned {
    pub delivered: usize,
}

impl Display for ProducerAbandoned {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Producer stopped after {} values: every rail was cancelled",
            self.delivered
        )
    }
}

impl StructuredLog for ProducerAbandoned {
    fn log(&self) {
        tracing::debug!(delivered = self.delivered, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "producer_abandoned",
            span_name = name,
            delivered = self.delivered,
        )
    }
}

/// A pipeline failure was recorded and broadcast to every rail.
///
/// # Log Level
/// `warn!` - The pipeline is being torn down
///
/// # Example
/// ```
/// use the_railyard::errors::FlowError;
/// use the_railyard::observability::messages::rail::PipelineFailed;
///
/// let error = FlowError::rail(1, anyhow::anyhow!("bad value"));
/// let msg = PipelineFailed {
///     rails: 4,
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct PipelineFailed<'a> {
    pub rails: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for PipelineFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline failed, broadcasting to {} rails: {}",
            self.rails, self.error
        )
    }
}

impl StructuredLog for PipelineFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            rails = self.rails,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "pipeline_failed",
            span_name = name,
            rails = self.rails,
            error = %self.error,
        )
    }
}

/// One rail finished its terminal operation.
///
/// # Log Level
/// `trace!` - Per-rail detail
pub struct RailCompleted {
    pub rail: usize,
    pub items: usize,
}

impl Display for RailCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Rail {} completed with {} items", self.rail, self.items)
    }
}

impl StructuredLog for RailCompleted {
    fn log(&self) {
        tracing::trace!(rail = self.rail, items = self.items, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "rail_completed",
            span_name = name,
            rail = self.rail,
            items = self.items,
        )
    }
}

/// A terminal operation finished successfully.
///
/// # Log Level
/// `debug!` - Normal lifecycle event
///
/// # Example
/// ```
/// use the_railyard::observability::messages::rail::PipelineCompleted;
/// use std::time::Duration;
///
/// let msg = PipelineCompleted {
///     terminal: "collect_rails",
///     rails: 4,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct PipelineCompleted<'a> {
    pub terminal: &'a str,
    pub rails: usize,
    pub duration: Duration,
}

impl Display for PipelineCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline {} completed on {} rails in {:?}",
            self.terminal, self.rails, self.duration
        )
    }
}

impl StructuredLog for PipelineCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            terminal = self.terminal,
            rails = self.rails,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline_completed",
            span_name = name,
            terminal = self.terminal,
            rails = self.rails,
            duration = ?self.duration,
        )
    }
}
