// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::rail::ParallelFlow;
use crate::traits::Stage;

/// An ordered list of stages applied to each value on a rail.
///
/// A filter stage that drops the value short-circuits the rest of the chain.
#[derive(Clone, Default)]
pub struct StageChain {
    stages: Vec<Arc<dyn Stage>>,
}

impl StageChain {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Arc<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>> {
        let mut current = value;
        for stage in &self.stages {
            match stage.apply(current).await? {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Run this chain on every rail of `flow`; a stage error fails the pipeline.
    pub fn attach(self, flow: ParallelFlow<i64>) -> ParallelFlow<i64> {
        let chain = Arc::new(self);
        flow.map_async(move |value| {
            let chain = chain.clone();
            async move { chain.apply(value).await }
        })
        .filter_map(|value| value)
    }
}

impl std::fmt::Debug for StageChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageChain")
            .field("stages", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FlowError;
    use crate::rail::parallel;
    use crate::stages::{ArithmeticStage, FailOnStage, PredicateStage};
    use futures::stream;

    fn chain(stages: Vec<Arc<dyn Stage>>) -> StageChain {
        StageChain::new(stages)
    }

    #[tokio::test]
    async fn test_empty_chain_is_identity() {
        let chain = StageChain::default();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(17).await.unwrap(), Some(17));
    }

    #[tokio::test]
    async fn test_stages_apply_in_order() {
        let chain = chain(vec![
            Arc::new(ArithmeticStage::increment()) as Arc<dyn Stage>,
            Arc::new(ArithmeticStage::square()),
        ]);

        assert_eq!(chain.apply(2).await.unwrap(), Some(9));
        assert_eq!(chain.names(), vec!["increment", "square"]);
    }

    #[tokio::test]
    async fn test_filter_short_circuits() {
        let chain = chain(vec![
            Arc::new(PredicateStage::keep_even()) as Arc<dyn Stage>,
            Arc::new(FailOnStage::new(3)),
        ]);

        // 3 is dropped before it reaches the failing stage.
        assert_eq!(chain.apply(3).await.unwrap(), None);
        assert_eq!(chain.apply(4).await.unwrap(), Some(4));
    }

    #[tokio::test]
    async fn test_attach_runs_chain_on_every_rail() {
        let chain = chain(vec![
            Arc::new(PredicateStage::keep_odd()) as Arc<dyn Stage>,
            Arc::new(ArithmeticStage::double()),
        ]);

        let flow = parallel(stream::iter(0i64..10), 3).unwrap();
        let mut values = chain.attach(flow).collect().await.unwrap();
        values.sort_unstable();

        assert_eq!(values, vec![2, 6, 10, 14, 18]);
    }

    #[tokio::test]
    async fn test_attach_reports_stage_failure() {
        let chain = chain(vec![Arc::new(FailOnStage::new(5)) as Arc<dyn Stage>]);

        let flow = parallel(stream::iter(0i64..100), 4).unwrap();
        let err = chain.attach(flow).collect().await.unwrap_err();

        assert!(matches!(err, FlowError::Rail { .. }));
        assert!(err.to_string().contains("rejected value 5"));
    }
}
