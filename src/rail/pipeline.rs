// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared, type-erased control block for one parallel pipeline.
//!
//! Every rail slot, the producer and the joiner hold an `Arc<Pipeline>`. The
//! first failure recorded here is the one every rail observes; recording it
//! also cancels the token, which wakes anything parked on a rendezvous.

use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::errors::FlowError;
use crate::observability::messages::rail::PipelineFailed;
use crate::observability::messages::StructuredLog;

#[derive(Debug)]
pub(crate) struct Pipeline {
    rails: usize,
    token: CancellationToken,
    failure: OnceLock<FlowError>,
}

impl Pipeline {
    pub(crate) fn new(rails: usize) -> Self {
        Self {
            rails,
            token: CancellationToken::new(),
            failure: OnceLock::new(),
        }
    }

    /// Record `error` unless a failure is already recorded, then tear the
    /// pipeline down. Returns the failure every rail will observe.
    pub(crate) fn fail(&self, error: FlowError) -> FlowError {
        let mut first = false;
        let recorded = self
            .failure
            .get_or_init(|| {
                first = true;
                error
            })
            .clone();

        if first {
            PipelineFailed {
                rails: self.rails,
                error: &recorded,
            }
            .log();
        }

        self.token.cancel();
        recorded
    }

    /// Stop the pipeline without recording a failure (the consumer went away).
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }

    pub(crate) fn failure(&self) -> Option<FlowError> {
        self.failure.get().cloned()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The terminal error a rail reports once the pipeline is torn down.
    pub(crate) fn terminal_error(&self) -> FlowError {
        self.failure().unwrap_or(FlowError::Cancelled)
    }

    pub(crate) fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

/// Run one of the pipeline's tasks, turning a panic into a recorded
/// `TaskFailed` so parked rails and joiners wake up instead of waiting on a
/// task that is gone. Returns `None` if the task panicked.
pub(crate) async fn supervise<F>(pipeline: Arc<Pipeline>, task: String, future: F) -> Option<F::Output>
where
    F: Future,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(output) => Some(output),
        Err(payload) => {
            pipeline.fail(FlowError::panicked(&task, payload.as_ref()));
            None
        }
    }
}

/// Cancels the pipeline when a terminal operation is dropped before it finishes.
pub(crate) struct PipelineGuard(pub(crate) Arc<Pipeline>);

impl Drop for PipelineGuard {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_wins() {
        let pipeline = Pipeline::new(3);

        let first = pipeline.fail(FlowError::rail(0, anyhow::anyhow!("first")));
        let second = pipeline.fail(FlowError::rail(2, anyhow::anyhow!("second")));

        assert_eq!(first.rail_index(), Some(0));
        assert_eq!(second.rail_index(), Some(0));
        assert!(pipeline.is_cancelled());
        assert_eq!(pipeline.terminal_error().rail_index(), Some(0));
    }

    #[test]
    fn test_cancel_without_failure_reports_cancelled() {
        let pipeline = Pipeline::new(1);
        pipeline.cancel();

        assert!(pipeline.is_cancelled());
        assert!(pipeline.failure().is_none());
        assert!(matches!(pipeline.terminal_error(), FlowError::Cancelled));
    }

    #[tokio::test]
    async fn test_supervise_records_panic_and_cancels() {
        let pipeline = Arc::new(Pipeline::new(2));

        let finished = supervise(pipeline.clone(), "rail 0".to_string(), async { 7 }).await;
        assert_eq!(finished, Some(7));
        assert!(!pipeline.is_cancelled());

        let panicked = supervise(pipeline.clone(), "producer".to_string(), async {
            panic!("source exploded")
        })
        .await;

        assert_eq!(panicked, None::<()>);
        assert!(pipeline.is_cancelled());
        match pipeline.failure() {
            Some(FlowError::TaskFailed { message }) => {
                assert_eq!(message, "producer panicked: source exploded");
            }
            other => panic!("unexpected failure: {:?}", other),
        }
    }
}
