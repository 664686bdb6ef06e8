// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::Mutex;

use super::RingBuffer;
use crate::errors::BufferError;

/// A [`RingBuffer`] shared between tasks.
///
/// Clones refer to the same buffer. Each method holds the lock for that one
/// operation, so a `snapshot` never observes a half-applied push.
#[derive(Debug)]
pub struct SharedRingBuffer<T> {
    inner: Arc<Mutex<RingBuffer<T>>>,
}

impl<T> Clone for SharedRingBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> SharedRingBuffer<T> {
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(RingBuffer::new(capacity)?)),
        })
    }

    pub async fn push(&self, value: T) -> Option<T> {
        self.inner.lock().await.push(value)
    }

    pub async fn pop(&self) -> Option<T> {
        self.inner.lock().await.pop()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.inner.lock().await.capacity()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    /// Remove every element, oldest first.
    pub async fn drain(&self) -> Vec<T> {
        self.inner.lock().await.drain_all()
    }
}

impl<T: Clone> SharedRingBuffer<T> {
    /// Owned copy of the current contents, oldest first.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.lock().await.to_vec()
    }
}
