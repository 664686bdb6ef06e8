// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single-slot fan-out mailbox between the producer and one rail.
//!
//! The consumer side marks itself `ready` and parks; the producer may only
//! place a value into a slot whose consumer is ready and empty. A value
//! therefore never waits in a slot for a consumer that did not ask for it.
//!
//! ```text
//!   producer ──offer──▶ [ slot 0 ] ──next──▶ rail 0
//!            ──offer──▶ [ slot 1 ] ──next──▶ rail 1
//!                 ▲                   │
//!                 └──── ready signal ─┘
//! ```

use futures::stream::{self, BoxStream, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

use crate::errors::FlowError;
use crate::rail::pipeline::Pipeline;

struct SlotState<T> {
    value: Option<T>,
    ready: bool,
    done: bool,
    cancelled: bool,
}

/// What a rail consumer sees when it asks for the next value.
#[derive(Debug)]
pub(crate) enum RailEvent<T> {
    Value(T),
    Done,
    Failed(FlowError),
}

pub(crate) struct RailSlot<T> {
    index: usize,
    state: Mutex<SlotState<T>>,
    /// Wakes this rail's consumer.
    wake: Notify,
    /// Shared with every slot; wakes the producer when any rail becomes ready.
    ready_signal: Arc<Notify>,
    pipeline: Arc<Pipeline>,
}

impl<T> RailSlot<T> {
    pub(crate) fn new(index: usize, ready_signal: Arc<Notify>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            index,
            state: Mutex::new(SlotState {
                value: None,
                ready: false,
                done: false,
                cancelled: false,
            }),
            wake: Notify::new(),
            ready_signal,
            pipeline,
        }
    }

    fn state(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Hand `value` to this rail if its consumer is waiting for one.
    /// The value comes back in `Err` when the rail cannot take it right now.
    pub(crate) fn offer(&self, value: T) -> Result<(), T> {
        let mut state = self.state();
        if state.cancelled || state.done || !state.ready || state.value.is_some() {
            return Err(value);
        }
        state.value = Some(value);
        state.ready = false;
        drop(state);

        self.wake.notify_one();
        Ok(())
    }

    /// Mark the upstream as exhausted for this rail.
    pub(crate) fn complete(&self) {
        self.state().done = true;
        self.wake.notify_one();
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    /// The consumer is gone; the producer must skip this rail from now on.
    pub(crate) fn cancel(&self) {
        {
            let mut state = self.state();
            state.cancelled = true;
            state.ready = false;
            state.value = None;
        }
        self.ready_signal.notify_one();
    }

    /// Wait for the next value, completion or the pipeline failure.
    pub(crate) async fn next(&self) -> RailEvent<T> {
        loop {
            {
                let mut state = self.state();
                if self.pipeline.is_cancelled() {
                    state.value = None;
                    return RailEvent::Failed(self.pipeline.terminal_error());
                }
                if let Some(value) = state.value.take() {
                    return RailEvent::Value(value);
                }
                if state.done {
                    return RailEvent::Done;
                }
                state.ready = true;
            }

            self.ready_signal.notify_one();
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = self.pipeline.cancelled() => {}
            }
        }
    }
}

/// Owns the consuming end of a rail; dropping it cancels the rail.
pub(crate) struct RailConsumer<T> {
    slot: Arc<RailSlot<T>>,
}

impl<T> RailConsumer<T> {
    pub(crate) fn new(slot: Arc<RailSlot<T>>) -> Self {
        Self { slot }
    }
}

impl<T> Drop for RailConsumer<T> {
    fn drop(&mut self) {
        self.slot.cancel();
    }
}

/// Turn a rail consumer into a stream that ends after completion or after
/// yielding the pipeline failure once.
pub(crate) fn rail_stream<T: Send + 'static>(
    consumer: RailConsumer<T>,
) -> BoxStream<'static, Result<T, FlowError>> {
    stream::unfold(Some(consumer), |consumer| async move {
        let consumer = consumer?;
        match consumer.slot.next().await {
            RailEvent::Value(value) => Some((Ok(value), Some(consumer))),
            RailEvent::Done => None,
            RailEvent::Failed(error) => Some((Err(error), None)),
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn slot(pipeline: &Arc<Pipeline>) -> (Arc<RailSlot<i32>>, Arc<Notify>) {
        let signal = Arc::new(Notify::new());
        (
            Arc::new(RailSlot::new(0, signal.clone(), pipeline.clone())),
            signal,
        )
    }

    #[test]
    fn test_offer_rejected_until_consumer_is_ready() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, _) = slot(&pipeline);

        assert_eq!(slot.offer(7), Err(7));
    }

    #[tokio::test]
    async fn test_ready_consumer_receives_offered_value() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, signal) = slot(&pipeline);

        let consumer = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.next().await })
        };

        // The consumer announces readiness through the shared signal.
        signal.notified().await;
        assert!(slot.offer(42).is_ok());

        match consumer.await.unwrap() {
            RailEvent::Value(v) => assert_eq!(v, 42),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_second_offer_rejected_while_slot_is_full() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, signal) = slot(&pipeline);

        let waiter = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.next().await })
        };
        signal.notified().await;

        assert!(slot.offer(1).is_ok());
        assert_eq!(slot.offer(2), Err(2));
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_ends_the_rail() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, _) = slot(&pipeline);
        slot.complete();

        assert!(matches!(slot.next().await, RailEvent::Done));
    }

    #[tokio::test]
    async fn test_failure_wakes_parked_consumer() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, _) = slot(&pipeline);

        let waiter = {
            let slot = slot.clone();
            tokio::spawn(async move { slot.next().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        pipeline.fail(FlowError::upstream(anyhow::anyhow!("source broke")));

        match waiter.await.unwrap() {
            RailEvent::Failed(FlowError::Upstream { .. }) => {}
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropping_consumer_cancels_slot() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, _) = slot(&pipeline);

        drop(RailConsumer::new(slot.clone()));

        assert!(slot.is_cancelled());
        assert_eq!(slot.offer(3), Err(3));
    }

    #[tokio::test]
    async fn test_rail_stream_yields_failure_once() {
        let pipeline = Arc::new(Pipeline::new(1));
        let (slot, _) = slot(&pipeline);
        pipeline.fail(FlowError::rail(0, anyhow::anyhow!("stage blew up")));

        let items: Vec<_> = rail_stream(RailConsumer::new(slot)).collect().await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(FlowError::Rail { rail: 0, .. })));
    }
}
