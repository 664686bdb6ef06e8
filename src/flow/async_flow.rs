// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::errors::FlowError;

/// A stream whose elements are mapped by spawned tasks.
///
/// Up to `capacity` elements are in flight at once, each on its own task,
/// but results are always emitted in upstream order. A slow element holds
/// back the ones behind it.
pub struct AsyncFlow<T> {
    upstream: BoxStream<'static, T>,
    handle: Option<Handle>,
}

/// Deferred results of [`AsyncFlow::async_map`].
///
/// Nothing is spawned until the results are streamed or collected. Further
/// stages added with [`then`](Self::then) run inside the same per-element
/// task, so upstream order holds across the whole chain.
pub struct OrderedMap<U> {
    work: BoxStream<'static, BoxFuture<'static, anyhow::Result<U>>>,
    capacity: usize,
    handle: Option<Handle>,
}

/// Aborts the task if the result is no longer wanted.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<T: Send + 'static> AsyncFlow<T> {
    pub fn new<S>(upstream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self {
            upstream: upstream.boxed(),
            handle: None,
        }
    }

    /// Spawn the per-element tasks on `handle` instead of the current runtime.
    pub fn on(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Map every element with `f`, at most `capacity` at a time.
    pub fn async_map<U, F, Fut>(self, capacity: usize, f: F) -> Result<OrderedMap<U>, FlowError>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<U>> + Send + 'static,
    {
        if capacity == 0 {
            return Err(FlowError::InvalidCapacity { requested: capacity });
        }

        let work = self.upstream.map(move |item| f(item).boxed()).boxed();

        Ok(OrderedMap {
            work,
            capacity,
            handle: self.handle,
        })
    }
}

impl<U: Send + 'static> OrderedMap<U> {
    /// Add another async stage. It runs in the same task as the stages
    /// before it, right after they finish for that element, under the same
    /// capacity.
    pub fn then<V, F, Fut>(self, f: F) -> OrderedMap<V>
    where
        V: Send + 'static,
        F: Fn(U) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let f = Arc::new(f);
        let work = self
            .work
            .map(move |earlier| {
                let f = f.clone();
                async move { f(earlier.await?).await }.boxed()
            })
            .boxed();

        OrderedMap {
            work,
            capacity: self.capacity,
            handle: self.handle,
        }
    }

    /// Spawn the element tasks and yield their results in upstream order.
    ///
    /// The first failing element ends the output with its error; elements
    /// still in flight at that point are aborted.
    pub fn into_stream(self) -> BoxStream<'static, Result<U, FlowError>> {
        let OrderedMap {
            work,
            capacity,
            handle,
        } = self;

        work.enumerate()
            .map(move |(index, work)| {
                let task = match &handle {
                    Some(handle) => handle.spawn(work),
                    None => tokio::spawn(work),
                };
                let mut task = AbortOnDrop(task);
                async move {
                    match (&mut task.0).await {
                        Ok(Ok(value)) => Ok(value),
                        Ok(Err(cause)) => Err(FlowError::element(index, cause)),
                        Err(join_error) => Err(join_error.into()),
                    }
                }
            })
            .buffered(capacity)
            .scan(false, |failed, item| {
                if *failed {
                    return future::ready(None);
                }
                *failed = item.is_err();
                future::ready(Some(item))
            })
            .boxed()
    }

    /// Gather every result, stopping at the first error.
    pub async fn collect(self) -> Result<Vec<U>, FlowError> {
        self.into_stream().try_collect().await
    }
}

/// `stream.async_map(capacity, f)` sugar for any `Send` stream.
pub trait AsyncFlowExt: Stream + Sized {
    fn async_map<U, F, Fut>(self, capacity: usize, f: F) -> Result<OrderedMap<U>, FlowError>
    where
        Self: Send + 'static,
        Self::Item: Send + 'static,
        U: Send + 'static,
        F: Fn(Self::Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<U>> + Send + 'static,
    {
        AsyncFlow::new(self).async_map(capacity, f)
    }
}

impl<S: Stream> AsyncFlowExt for S {}
