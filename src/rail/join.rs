// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fan-in side of the rendezvous used by `ParallelFlow::sequential`.
//!
//! Each rail task owns one `JoinSlot` and `put`s values into it, parking
//! while the slot is occupied. The joiner scans the slots round-robin from the
//! last rail it drained and takes whichever value is present, so every rail
//! gets a fair turn but values from different rails interleave freely.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::errors::FlowError;
use crate::rail::pipeline::Pipeline;

struct JoinState<T> {
    value: Option<T>,
    done: bool,
}

/// Result of a non-blocking take.
pub(crate) enum Take<T> {
    Taken(T),
    Empty,
    Done,
}

pub(crate) struct JoinSlot<T> {
    state: Mutex<JoinState<T>>,
    /// Wakes the rail task once the joiner emptied the slot.
    space: Notify,
    /// Shared with every slot; wakes the joiner when any rail has a value.
    value_signal: Arc<Notify>,
    pipeline: Arc<Pipeline>,
}

impl<T> JoinSlot<T> {
    pub(crate) fn new(value_signal: Arc<Notify>, pipeline: Arc<Pipeline>) -> Self {
        Self {
            state: Mutex::new(JoinState {
                value: None,
                done: false,
            }),
            space: Notify::new(),
            value_signal,
            pipeline,
        }
    }

    fn state(&self) -> MutexGuard<'_, JoinState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `value` once the slot is free. Returns `false` if the pipeline
    /// was torn down first; the value is dropped in that case.
    pub(crate) async fn put(&self, value: T) -> bool {
        let mut pending = Some(value);
        loop {
            {
                let mut state = self.state();
                if self.pipeline.is_cancelled() {
                    return false;
                }
                if state.value.is_none() {
                    state.value = pending.take();
                    drop(state);
                    self.value_signal.notify_one();
                    return true;
                }
            }

            tokio::select! {
                _ = self.space.notified() => {}
                _ = self.pipeline.cancelled() => return false,
            }
        }
    }

    /// The rail will not put anything else.
    pub(crate) fn finish(&self) {
        self.state().done = true;
        self.value_signal.notify_one();
    }

    pub(crate) fn take(&self) -> Take<T> {
        let mut state = self.state();
        match state.value.take() {
            Some(value) => {
                drop(state);
                self.space.notify_one();
                Take::Taken(value)
            }
            None if state.done => Take::Done,
            None => Take::Empty,
        }
    }
}

/// Drains the join slots of a running pipeline.
///
/// Dropping the joiner cancels the pipeline, which releases the producer and
/// every rail task.
pub(crate) struct Joiner<T> {
    slots: Vec<Arc<JoinSlot<T>>>,
    value_signal: Arc<Notify>,
    pipeline: Arc<Pipeline>,
    cursor: usize,
    tasks: Vec<JoinHandle<()>>,
}

impl<T> Joiner<T> {
    pub(crate) fn new(
        slots: Vec<Arc<JoinSlot<T>>>,
        value_signal: Arc<Notify>,
        pipeline: Arc<Pipeline>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            slots,
            value_signal,
            pipeline,
            cursor: 0,
            tasks,
        }
    }

    /// Next value from whichever rail holds one; the pipeline failure, if
    /// any, is reported as the final item.
    pub(crate) async fn next(&mut self) -> Option<Result<T, FlowError>> {
        let rails = self.slots.len();
        loop {
            if let Some(failure) = self.pipeline.failure() {
                return Some(Err(failure));
            }

            let mut finished = 0;
            for offset in 0..rails {
                let index = (self.cursor + offset) % rails;
                match self.slots[index].take() {
                    Take::Taken(value) => {
                        self.cursor = (index + 1) % rails;
                        return Some(Ok(value));
                    }
                    Take::Done => finished += 1,
                    Take::Empty => {}
                }
            }

            if finished == rails {
                return self.finish().await;
            }
            if self.pipeline.is_cancelled() {
                return Some(Err(self.pipeline.terminal_error()));
            }

            tokio::select! {
                _ = self.value_signal.notified() => {}
                _ = self.pipeline.cancelled() => {}
            }
        }
    }

    /// Every rail finished; reap the tasks so a panic is not lost.
    async fn finish(&mut self) -> Option<Result<T, FlowError>> {
        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                self.pipeline.fail(err.into());
            }
        }
        self.pipeline.failure().map(Err)
    }
}

impl<T> Drop for Joiner<T> {
    fn drop(&mut self) {
        self.pipeline.cancel();
    }
}
