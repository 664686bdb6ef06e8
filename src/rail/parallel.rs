// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Parallel rails over a single upstream stream.
//!
//! A [`ParallelFlow`] fans one upstream sequence out to N independently
//! scheduled rails, applies per-rail stages, and then either re-joins the
//! rails into one stream or reduces them.
//!
//! # Execution Model
//!
//! ```text
//!                       ┌── rail 0: map ─ filter ──┐
//!   upstream ─ producer ┼── rail 1: map ─ filter ──┼─ joiner ─ sequential stream
//!                       └── rail 2: map ─ filter ──┘
//! ```
//!
//! - **Producer**: one task pulls the upstream and hands each value to the next
//!   ready rail, round-robin. If no rail is ready it parks until one asks.
//! - **Rails**: each rail runs as its own task on the runtime chosen by its
//!   [`RailScheduler`]. Stages on a rail run sequentially for that rail.
//! - **Joiner**: `sequential()` drains whichever rail currently holds a value.
//!   Rails are drained fairly; no ordering is guaranteed across rails.
//!
//! # Failure Semantics
//!
//! An upstream error or an error returned by any rail stage is recorded once
//! and broadcast: every rail observes that same error exactly once and stops,
//! the producer stops pulling, and the terminal operation returns it. A panic
//! in the upstream or in a rail stage is recorded the same way, as
//! [`FlowError::TaskFailed`]. There is no retry and no partial recovery.
//!
//! # Examples
//!
//! ```rust
//! use futures::stream;
//! use the_railyard::rail::ParallelExt;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), the_railyard::errors::FlowError> {
//! let rails = stream::iter(1..=10).parallel(3)?;
//!
//! let total = rails
//!     .map(|v: u64| v * v)
//!     .filter(|v| v % 2 == 0)
//!     .reduce(|a, b| a + b)
//!     .await?;
//!
//! assert_eq!(total, Some(4 + 16 + 36 + 64 + 100));
//! # Ok(())
//! # }
//! ```

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::errors::FlowError;
use crate::observability::messages::rail::{PipelineCompleted, PipelineStarted, RailCompleted};
use crate::observability::messages::StructuredLog;
use crate::rail::join::{JoinSlot, Joiner};
use crate::rail::pipeline::{supervise, Pipeline, PipelineGuard};
use crate::rail::producer::Producer;
use crate::rail::scheduler::RailScheduler;
use crate::rail::slot::{rail_stream, RailConsumer, RailSlot};

/// The consuming end of one rail after its stages have been applied.
pub type RailStream<T> = BoxStream<'static, Result<T, FlowError>>;

/// N rails fed from one upstream stream.
///
/// Nothing runs until a terminal operation ([`sequential`](Self::sequential),
/// [`collect_rails`](Self::collect_rails), [`collect`](Self::collect) or
/// [`reduce`](Self::reduce)) is called.
pub struct ParallelFlow<T> {
    rails: Vec<RailStream<T>>,
    pipeline: Arc<Pipeline>,
    producer: BoxFuture<'static, ()>,
    scheduler: RailScheduler,
}

/// Fan `upstream` out to `rails` rails.
pub fn parallel<S, T>(upstream: S, rails: usize) -> Result<ParallelFlow<T>, FlowError>
where
    S: Stream<Item = T> + Send + 'static,
    T: Send + 'static,
{
    try_parallel(upstream.map(Ok), rails)
}

/// Fan a fallible `upstream` out to `rails` rails. The first upstream error
/// fails the whole pipeline.
pub fn try_parallel<S, T>(upstream: S, rails: usize) -> Result<ParallelFlow<T>, FlowError>
where
    S: Stream<Item = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    if rails == 0 {
        return Err(FlowError::InvalidParallelism { requested: rails });
    }

    let pipeline = Arc::new(Pipeline::new(rails));
    let ready_signal = Arc::new(Notify::new());
    let slots: Vec<Arc<RailSlot<T>>> = (0..rails)
        .map(|index| Arc::new(RailSlot::new(index, ready_signal.clone(), pipeline.clone())))
        .collect();

    let rail_streams = slots
        .iter()
        .map(|slot| rail_stream(RailConsumer::new(slot.clone())))
        .collect();
    let producer = Producer::new(slots, ready_signal, pipeline.clone())
        .run(upstream)
        .boxed();

    Ok(ParallelFlow {
        rails: rail_streams,
        pipeline,
        producer,
        scheduler: RailScheduler::default(),
    })
}

/// `stream.parallel(n)` sugar for any `Send` stream.
pub trait ParallelExt: Stream + Sized {
    fn parallel(self, rails: usize) -> Result<ParallelFlow<Self::Item>, FlowError>
    where
        Self: Send + 'static,
        Self::Item: Send + 'static,
    {
        parallel(self, rails)
    }
}

impl<S: Stream> ParallelExt for S {}

/// End a rail right after it yields an error.
fn fuse_on_error<T, S>(rail: S) -> RailStream<T>
where
    T: Send + 'static,
    S: Stream<Item = Result<T, FlowError>> + Send + 'static,
{
    rail.scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    })
    .boxed()
}

enum JoinState<T> {
    Pending(ParallelFlow<T>),
    Running(Joiner<T>),
    Finished,
}

impl<T: Send + 'static> ParallelFlow<T> {
    /// Number of rails.
    pub fn rails(&self) -> usize {
        self.rails.len()
    }

    /// Run every rail on `handle`.
    pub fn run_on(mut self, handle: Handle) -> Self {
        self.scheduler = RailScheduler::Shared(handle);
        self
    }

    /// Pick the runtime for each rail by index.
    pub fn run_on_each<F>(mut self, select: F) -> Self
    where
        F: Fn(usize) -> Handle + Send + Sync + 'static,
    {
        self.scheduler = RailScheduler::PerRail(Arc::new(select));
        self
    }

    pub fn with_scheduler(mut self, scheduler: RailScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    fn transform<U, F>(self, mut stage: F) -> ParallelFlow<U>
    where
        U: Send + 'static,
        F: FnMut(usize, RailStream<T>, &Arc<Pipeline>) -> RailStream<U>,
    {
        let ParallelFlow {
            rails,
            pipeline,
            producer,
            scheduler,
        } = self;

        let rails = rails
            .into_iter()
            .enumerate()
            .map(|(index, rail)| stage(index, rail, &pipeline))
            .collect();

        ParallelFlow {
            rails,
            pipeline,
            producer,
            scheduler,
        }
    }

    /// Transform every value on its rail.
    pub fn map<U, F>(self, f: F) -> ParallelFlow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.transform(|_, rail, _| {
            let f = f.clone();
            rail.map(move |item| item.map(|value| f(value))).boxed()
        })
    }

    /// Transform every value on its rail; an `Err` fails the whole pipeline.
    pub fn try_map<U, F>(self, f: F) -> ParallelFlow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.transform(|index, rail, pipeline| {
            let f = f.clone();
            let pipeline = pipeline.clone();
            fuse_on_error(rail.map(move |item| {
                item.and_then(|value| {
                    f(value).map_err(|cause| pipeline.fail(FlowError::rail(index, cause)))
                })
            }))
        })
    }

    /// Run an async stage per value; each rail awaits its own values one at a time.
    pub fn map_async<U, F, Fut>(self, f: F) -> ParallelFlow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<U>> + Send + 'static,
    {
        let f = Arc::new(f);
        self.transform(|index, rail, pipeline| {
            let f = f.clone();
            let pipeline = pipeline.clone();
            fuse_on_error(rail.then(move |item| {
                let f = f.clone();
                let pipeline = pipeline.clone();
                async move {
                    match item {
                        Ok(value) => f(value)
                            .await
                            .map_err(|cause| pipeline.fail(FlowError::rail(index, cause))),
                        Err(error) => Err(error),
                    }
                }
            }))
        })
    }

    /// Keep only the values matching `predicate`. Errors always pass through.
    pub fn filter<F>(self, predicate: F) -> ParallelFlow<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        self.transform(|_, rail, _| {
            let predicate = predicate.clone();
            rail.filter(move |item| {
                let keep = match item {
                    Ok(value) => predicate(value),
                    Err(_) => true,
                };
                future::ready(keep)
            })
            .boxed()
        })
    }

    /// Transform and filter in one step; `None` drops the value.
    pub fn filter_map<U, F>(self, f: F) -> ParallelFlow<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        self.transform(|_, rail, _| {
            let f = f.clone();
            rail.filter_map(move |item| future::ready(item.map(|value| f(value)).transpose()))
                .boxed()
        })
    }

    /// Fold each rail independently, starting from `seed()`. Every rail
    /// yields exactly one value, the seed itself for a rail that saw nothing.
    pub fn reduce_rails<R, S, F>(self, seed: S, fold: F) -> ParallelFlow<R>
    where
        R: Send + 'static,
        S: Fn() -> R + Send + Sync + 'static,
        F: Fn(R, T) -> R + Send + Sync + 'static,
    {
        let seed = Arc::new(seed);
        let fold = Arc::new(fold);
        self.transform(|_, rail, _| {
            let seed = seed.clone();
            let fold = fold.clone();
            stream::once(async move {
                rail.try_fold(seed(), move |acc, value| future::ready(Ok(fold(acc, value))))
                    .await
            })
            .boxed()
        })
    }

    /// Reduce each rail, then combine the rail results in rail order.
    /// Returns `None` when the upstream produced nothing that reached the end
    /// of the rails.
    pub async fn reduce<F>(self, combine: F) -> Result<Option<T>, FlowError>
    where
        F: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let combine = Arc::new(combine);
        let per_rail = {
            let combine = combine.clone();
            self.reduce_rails(
                || None,
                move |acc: Option<T>, value: T| match acc {
                    Some(acc) => Some(combine(acc, value)),
                    None => Some(value),
                },
            )
        };

        let partials = per_rail.collect_rails().await?;
        Ok(partials
            .into_iter()
            .flatten()
            .flatten()
            .reduce(|a, b| combine(a, b)))
    }

    /// Run every rail to completion and return its values, indexed by rail.
    pub async fn collect_rails(self) -> Result<Vec<Vec<T>>, FlowError> {
        let started = Instant::now();
        let ParallelFlow {
            rails,
            pipeline,
            producer,
            scheduler,
        } = self;
        let rail_count = rails.len();
        let _guard = PipelineGuard(pipeline.clone());

        PipelineStarted { rails: rail_count }.log();
        let producer = tokio::spawn(supervise(pipeline.clone(), "producer".to_string(), producer));
        let tasks: Vec<_> = rails
            .into_iter()
            .enumerate()
            .map(|(index, rail)| {
                let rail_task = async move {
                    let values: Result<Vec<T>, FlowError> = rail.try_collect().await;
                    if let Ok(values) = &values {
                        RailCompleted {
                            rail: index,
                            items: values.len(),
                        }
                        .log();
                    }
                    values
                };
                scheduler.spawn(
                    index,
                    supervise(pipeline.clone(), format!("rail {}", index), rail_task),
                )
            })
            .collect();

        let mut collected = Vec::with_capacity(rail_count);
        for task in tasks {
            match task.await {
                Ok(Some(Ok(values))) => collected.push(values),
                Ok(Some(Err(error))) => {
                    pipeline.fail(error);
                }
                // Recorded by `supervise`.
                Ok(None) => {}
                Err(join_error) => {
                    pipeline.fail(join_error.into());
                }
            }
        }
        if let Err(join_error) = producer.await {
            pipeline.fail(join_error.into());
        }

        match pipeline.failure() {
            Some(failure) => Err(failure),
            None => {
                PipelineCompleted {
                    terminal: "collect_rails",
                    rails: rail_count,
                    duration: started.elapsed(),
                }
                .log();
                Ok(collected)
            }
        }
    }

    /// Re-join the rails into one stream.
    ///
    /// Values are taken from whichever rail holds one, scanning fairly from
    /// the rail drained last; there is no ordering across rails. A pipeline
    /// failure is the final item. Dropping the stream cancels the pipeline.
    pub fn sequential(self) -> BoxStream<'static, Result<T, FlowError>> {
        stream::unfold(JoinState::Pending(self), |state| async move {
            let mut joiner = match state {
                JoinState::Pending(flow) => flow.start_join(),
                JoinState::Running(joiner) => joiner,
                JoinState::Finished => return None,
            };

            match joiner.next().await {
                Some(Ok(value)) => Some((Ok(value), JoinState::Running(joiner))),
                Some(Err(error)) => Some((Err(error), JoinState::Finished)),
                None => None,
            }
        })
        .boxed()
    }

    /// Re-join the rails and gather every value; the first failure wins.
    pub async fn collect(self) -> Result<Vec<T>, FlowError> {
        self.sequential().try_collect().await
    }

    fn start_join(self) -> Joiner<T> {
        let ParallelFlow {
            rails,
            pipeline,
            producer,
            scheduler,
        } = self;
        let rail_count = rails.len();
        PipelineStarted { rails: rail_count }.log();

        let value_signal = Arc::new(Notify::new());
        let slots: Vec<Arc<JoinSlot<T>>> = (0..rail_count)
            .map(|_| Arc::new(JoinSlot::new(value_signal.clone(), pipeline.clone())))
            .collect();

        let mut tasks = Vec::with_capacity(rail_count + 1);
        let producer = supervise(pipeline.clone(), "producer".to_string(), producer);
        tasks.push(tokio::spawn(producer.map(|_| ())));
        for (index, (mut rail, slot)) in rails.into_iter().zip(slots.iter().cloned()).enumerate() {
            // A panicking rail never finishes its slot; `supervise` fails the
            // pipeline instead, which wakes the joiner.
            let rail_task = async move {
                let mut items = 0;
                while let Some(item) = rail.next().await {
                    match item {
                        Ok(value) => {
                            if !slot.put(value).await {
                                break;
                            }
                            items += 1;
                        }
                        // Already recorded on the pipeline; the joiner reports it.
                        Err(_) => break,
                    }
                }
                slot.finish();
                RailCompleted { rail: index, items }.log();
            };
            let rail_task = supervise(pipeline.clone(), format!("rail {}", index), rail_task);
            tasks.push(scheduler.spawn(index, rail_task.map(|_| ())));
        }

        Joiner::new(slots, value_signal, pipeline, tasks)
    }
}
