// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::bail;
use async_trait::async_trait;

use crate::traits::{Stage, StageKind};

/// Fails when it sees one specific value. Used to exercise failure broadcast.
pub struct FailOnStage {
    trigger: i64,
}

impl FailOnStage {
    pub fn new(trigger: i64) -> Self {
        Self { trigger }
    }
}

#[async_trait]
impl Stage for FailOnStage {
    async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>> {
        if value == self.trigger {
            bail!("fail_on stage rejected value {}", value);
        }
        Ok(Some(value))
    }

    fn name(&self) -> &'static str {
        "fail_on"
    }

    fn kind(&self) -> StageKind {
        StageKind::Map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fails_only_on_trigger() {
        let stage = FailOnStage::new(13);
        assert_eq!(stage.apply(12).await.unwrap(), Some(12));

        let err = stage.apply(13).await.unwrap_err();
        assert!(err.to_string().contains("13"));
    }
}
