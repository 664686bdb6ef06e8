// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The single producer loop that fans one upstream out to every rail.
//!
//! The producer keeps a round-robin cursor. For each upstream value it offers
//! to the rails starting at the cursor; the first ready rail takes it and the
//! cursor moves past that rail. When no rail is ready the producer parks on
//! the shared ready signal until some consumer asks for a value.

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::errors::FlowError;
use crate::observability::messages::rail::{ProducerAbandoned, ProducerFinished};
use crate::observability::messages::StructuredLog;
use crate::rail::pipeline::Pipeline;
use crate::rail::slot::RailSlot;

/// Outcome of trying to place one value.
enum Delivery {
    Delivered,
    Abandoned,
    Stopped,
}

pub(crate) struct Producer<T> {
    slots: Vec<Arc<RailSlot<T>>>,
    ready_signal: Arc<Notify>,
    pipeline: Arc<Pipeline>,
    cursor: usize,
    delivered: usize,
}

impl<T: Send + 'static> Producer<T> {
    pub(crate) fn new(
        slots: Vec<Arc<RailSlot<T>>>,
        ready_signal: Arc<Notify>,
        pipeline: Arc<Pipeline>,
    ) -> Self {
        Self {
            slots,
            ready_signal,
            pipeline,
            cursor: 0,
            delivered: 0,
        }
    }

    /// Drain `upstream` into the rails, then complete every rail.
    ///
    /// An upstream error is recorded on the pipeline, which broadcasts it to
    /// every rail; the rails are not completed in that case.
    pub(crate) async fn run<S>(mut self, upstream: S)
    where
        S: Stream<Item = anyhow::Result<T>> + Send,
    {
        futures::pin_mut!(upstream);

        loop {
            let item = tokio::select! {
                biased;
                _ = self.pipeline.cancelled() => return,
                item = upstream.next() => item,
            };

            match item {
                None => break,
                Some(Err(cause)) => {
                    self.pipeline.fail(FlowError::upstream(cause));
                    return;
                }
                Some(Ok(value)) => match self.deliver(value).await {
                    Delivery::Delivered => {}
                    Delivery::Stopped => return,
                    Delivery::Abandoned => {
                        ProducerAbandoned {
                            delivered: self.delivered,
                        }
                        .log();
                        return;
                    }
                },
            }
        }

        for slot in &self.slots {
            slot.complete();
        }
        ProducerFinished {
            delivered: self.delivered,
            rails: self.slots.len(),
        }
        .log();
    }

    async fn deliver(&mut self, value: T) -> Delivery {
        let rails = self.slots.len();
        let mut pending = value;

        loop {
            let mut live = 0;
            for offset in 0..rails {
                let index = (self.cursor + offset) % rails;
                let slot = &self.slots[index];
                if slot.is_cancelled() {
                    continue;
                }
                live += 1;
                match slot.offer(pending) {
                    Ok(()) => {
                        tracing::trace!(rail = slot.index(), "handed value to rail");
                        self.cursor = (index + 1) % rails;
                        self.delivered += 1;
                        return Delivery::Delivered;
                    }
                    Err(rejected) => pending = rejected,
                }
            }

            if live == 0 {
                return Delivery::Abandoned;
            }

            tokio::select! {
                _ = self.pipeline.cancelled() => return Delivery::Stopped,
                _ = self.ready_signal.notified() => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rail::slot::RailEvent;
    use futures::stream;

    fn rig(rails: usize) -> (Vec<Arc<RailSlot<u32>>>, Arc<Notify>, Arc<Pipeline>) {
        let pipeline = Arc::new(Pipeline::new(rails));
        let signal = Arc::new(Notify::new());
        let slots = (0..rails)
            .map(|i| Arc::new(RailSlot::new(i, signal.clone(), pipeline.clone())))
            .collect();
        (slots, signal, pipeline)
    }

    async fn drain(slot: Arc<RailSlot<u32>>) -> Vec<u32> {
        let mut values = Vec::new();
        while let RailEvent::Value(v) = slot.next().await {
            values.push(v);
        }
        values
    }

    #[tokio::test]
    async fn test_single_rail_receives_everything_in_order() {
        let (slots, signal, pipeline) = rig(1);
        let consumer = tokio::spawn(drain(slots[0].clone()));

        Producer::new(slots, signal, pipeline)
            .run(stream::iter((0..20).map(Ok)))
            .await;

        assert_eq!(consumer.await.unwrap(), (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_every_value_reaches_exactly_one_rail() {
        let (slots, signal, pipeline) = rig(3);
        let consumers: Vec<_> = slots.iter().map(|s| tokio::spawn(drain(s.clone()))).collect();

        Producer::new(slots, signal, pipeline)
            .run(stream::iter((0..100).map(Ok)))
            .await;

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_upstream_error_fails_pipeline() {
        let (slots, signal, pipeline) = rig(2);
        let upstream = stream::iter(vec![Ok(1), Err(anyhow::anyhow!("read failed")), Ok(3)]);
        let consumers: Vec<_> = slots
            .iter()
            .map(|s| {
                let slot = s.clone();
                tokio::spawn(async move {
                    loop {
                        match slot.next().await {
                            RailEvent::Value(_) => continue,
                            other => return other,
                        }
                    }
                })
            })
            .collect();

        Producer::new(slots, signal, pipeline.clone()).run(upstream).await;

        assert!(matches!(pipeline.failure(), Some(FlowError::Upstream { .. })));
        for consumer in consumers {
            assert!(matches!(consumer.await.unwrap(), RailEvent::Failed(_)));
        }
    }

    #[tokio::test]
    async fn test_producer_stops_when_every_rail_is_cancelled() {
        let (slots, signal, pipeline) = rig(2);
        for slot in &slots {
            slot.cancel();
        }

        // An endless upstream must not keep the producer alive.
        Producer::new(slots, signal, pipeline)
            .run(stream::repeat_with(|| Ok(1)))
            .await;
    }
}
