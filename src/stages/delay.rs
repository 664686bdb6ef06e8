// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::traits::{Stage, StageKind};

/// Sleeps before passing the value on; simulates a slow per-value call.
pub struct DelayStage {
    delay: Duration,
}

impl DelayStage {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Stage for DelayStage {
    async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(Some(value))
    }

    fn name(&self) -> &'static str {
        "delay"
    }

    fn kind(&self) -> StageKind {
        StageKind::Map
    }
}
