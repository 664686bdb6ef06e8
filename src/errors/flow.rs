// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Terminal errors observed by rails, joiners and scoped tasks.
//!
//! A pipeline failure has to reach every rail exactly once, so `FlowError` is
//! `Clone`. User errors are carried as `Arc<anyhow::Error>` to make that cheap.

use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while running a parallel pipeline or a scoped task.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    /// The requested rail count is outside the accepted range.
    #[error("Invalid parallelism: {requested} rails requested, expected at least 1")]
    InvalidParallelism { requested: usize },

    /// Pulling the next value from the upstream stream failed.
    #[error("Upstream failed: {cause}")]
    Upstream { cause: Arc<anyhow::Error> },

    /// A stage running on one rail failed. Every other rail observes the same error.
    #[error("Rail {rail} failed: {cause}")]
    Rail { rail: usize, cause: Arc<anyhow::Error> },

    /// An ordered async map was asked to keep zero tasks in flight.
    #[error("Invalid capacity: {requested}, expected at least 1")]
    InvalidCapacity { requested: usize },

    /// The mapping function failed for one element of an ordered async map.
    #[error("Element {index} failed: {cause}")]
    Element { index: usize, cause: Arc<anyhow::Error> },

    /// A spawned task panicked or was aborted by the runtime.
    #[error("Task failed: {message}")]
    TaskFailed { message: String },

    /// The pipeline or scope was cancelled before the work finished.
    #[error("Cancelled")]
    Cancelled,

    /// The scope was already closed when new work was submitted.
    #[error("Scope is closed")]
    Closed,
}

impl FlowError {
    pub fn upstream(cause: anyhow::Error) -> Self {
        FlowError::Upstream { cause: Arc::new(cause) }
    }

    pub fn rail(rail: usize, cause: anyhow::Error) -> Self {
        FlowError::Rail { rail, cause: Arc::new(cause) }
    }

    pub fn element(index: usize, cause: anyhow::Error) -> Self {
        FlowError::Element { index, cause: Arc::new(cause) }
    }

    /// A task panicked; `payload` is what `catch_unwind` returned.
    pub fn panicked(task: &str, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            format!("{} panicked: {}", task, text)
        } else if let Some(text) = payload.downcast_ref::<String>() {
            format!("{} panicked: {}", task, text)
        } else {
            format!("{} panicked", task)
        };
        FlowError::TaskFailed { message }
    }

    /// Index of the failing rail, if the failure started inside a rail stage.
    pub fn rail_index(&self) -> Option<usize> {
        match self {
            FlowError::Rail { rail, .. } => Some(*rail),
            _ => None,
        }
    }
}

impl From<tokio::task::JoinError> for FlowError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            FlowError::Cancelled
        } else {
            FlowError::TaskFailed { message: err.to_string() }
        }
    }
}
