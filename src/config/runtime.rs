// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use futures::stream;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::Instrument;

use crate::buffer::SharedRingBuffer;
use crate::config::{Config, SourceConfig, Terminal};
use crate::errors::{ConfigError, FlowError, ValidationError};
use crate::flow::AsyncFlow;
use crate::observability::messages::rail::PipelineStarted;
use crate::observability::messages::StructuredLog;
use crate::rail::{parallel, ParallelFlow};
use crate::stages::{StageChain, StageFactory};

/// Pipeline runtime builder - turns a validated configuration into a runnable pipeline.
///
/// Creates the stage chain from the configured stage names, the history
/// buffer and, when `parallelism.worker_threads` is set, a dedicated
/// multi-thread runtime the rails are scheduled on.
///
/// # Examples
/// ```
/// use the_railyard::config::{Config, RuntimeBuilder};
/// use the_railyard::config::PipelineOutcome;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config: Config = serde_yaml::from_str(
///     "source: { start: 1, end: 4 }\nstages:\n  - stage: square\n",
/// )?;
///
/// let runtime = RuntimeBuilder::from_config(&config)?;
/// let outcome = runtime.run().await?;
///
/// assert_eq!(outcome, PipelineOutcome::Sum(Some(1 + 4 + 9)));
/// # Ok(())
/// # }
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(cfg: &Config) -> Result<PipelineRuntime, ConfigError> {
        let chain = StageChain::new(StageFactory::create_stages(&cfg.stages)?);
        let history = SharedRingBuffer::new(cfg.history.capacity)?;

        let rail_runtime = match cfg.parallelism.worker_threads {
            Some(0) => {
                return Err(ConfigError::Invalid(vec![ValidationError::ZeroWorkerThreads]));
            }
            Some(workers) => Some(
                Builder::new_multi_thread()
                    .worker_threads(workers)
                    .thread_name("rail-worker")
                    .enable_all()
                    .build()
                    .map_err(ConfigError::Runtime)?,
            ),
            None => None,
        };

        Ok(PipelineRuntime {
            chain,
            source: cfg.source,
            rails: cfg.parallelism.rails,
            async_capacity: cfg.parallelism.async_capacity,
            terminal: cfg.terminal,
            history,
            rail_runtime: RailRuntime(rail_runtime),
        })
    }
}

/// Owns the optional dedicated rail runtime.
///
/// The pipeline is usually dropped from async code, where a blocking
/// runtime shutdown would panic, so the runtime is shut down in the background.
struct RailRuntime(Option<Runtime>);

impl RailRuntime {
    fn handle(&self) -> Option<Handle> {
        self.0.as_ref().map(|runtime| runtime.handle().clone())
    }
}

impl Drop for RailRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Total of every surviving value; `None` when nothing survived.
    Sum(Option<i64>),
    Values(Vec<i64>),
    Rails(Vec<Vec<i64>>),
}

impl Display for PipelineOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineOutcome::Sum(Some(total)) => write!(f, "sum = {}", total),
            PipelineOutcome::Sum(None) => write!(f, "sum = <no values>"),
            PipelineOutcome::Values(values) => write!(f, "{} values: {:?}", values.len(), values),
            PipelineOutcome::Rails(rails) => {
                for (index, rail) in rails.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "rail {}: {} values {:?}", index, rail.len(), rail)?;
                }
                Ok(())
            }
        }
    }
}

/// A pipeline ready to run, built by [`RuntimeBuilder`].
pub struct PipelineRuntime {
    chain: StageChain,
    source: SourceConfig,
    rails: usize,
    async_capacity: usize,
    terminal: Terminal,
    history: SharedRingBuffer<i64>,
    rail_runtime: RailRuntime,
}

impl PipelineRuntime {
    pub fn chain(&self) -> &StageChain {
        &self.chain
    }

    pub fn terminal(&self) -> Terminal {
        self.terminal
    }

    pub fn rails(&self) -> usize {
        self.rails
    }

    /// The most recent values that reached the terminal, oldest first.
    pub fn history(&self) -> &SharedRingBuffer<i64> {
        &self.history
    }

    /// Run the pipeline once. A stage failure on any rail fails the run.
    pub async fn run(&self) -> Result<PipelineOutcome, FlowError> {
        let span = PipelineStarted { rails: self.rails }.span(self.terminal.as_str());
        self.run_terminal().instrument(span).await
    }

    async fn run_terminal(&self) -> Result<PipelineOutcome, FlowError> {
        match self.terminal {
            Terminal::Sum => self
                .rail_flow()?
                .reduce(|a, b| a.saturating_add(b))
                .await
                .map(PipelineOutcome::Sum),
            Terminal::Collect => self.rail_flow()?.collect().await.map(PipelineOutcome::Values),
            Terminal::CollectRails => self
                .rail_flow()?
                .collect_rails()
                .await
                .map(PipelineOutcome::Rails),
            Terminal::Ordered => self.run_ordered().await,
        }
    }

    fn rail_flow(&self) -> Result<ParallelFlow<i64>, FlowError> {
        let mut flow = parallel(stream::iter(self.source.range()), self.rails)?;
        if let Some(handle) = self.rail_runtime.handle() {
            flow = flow.run_on(handle);
        }

        let history = self.history.clone();
        Ok(self.chain.clone().attach(flow).map_async(move |value| {
            let history = history.clone();
            async move {
                history.push(value).await;
                Ok(value)
            }
        }))
    }

    async fn run_ordered(&self) -> Result<PipelineOutcome, FlowError> {
        let mut flow = AsyncFlow::new(stream::iter(self.source.range()));
        if let Some(handle) = self.rail_runtime.handle() {
            flow = flow.on(handle);
        }

        let chain = Arc::new(self.chain.clone());
        let results = flow
            .async_map(self.async_capacity, move |value| {
                let chain = chain.clone();
                async move { chain.apply(value).await }
            })?
            .collect()
            .await?;

        let values: Vec<i64> = results.into_iter().flatten().collect();
        for value in &values {
            self.history.push(*value).await;
        }
        Ok(PipelineOutcome::Values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(yaml: &str) -> PipelineRuntime {
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        RuntimeBuilder::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_sum_terminal() {
        let runtime = runtime(
            r#"
parallelism: { rails: 3 }
source: { start: 0, end: 10 }
stages:
  - stage: keep_even
  - stage: double
"#,
        );

        let outcome = runtime.run().await.unwrap();
        assert_eq!(outcome, PipelineOutcome::Sum(Some(2 * (2 + 4 + 6 + 8))));
        assert_eq!(runtime.chain().names(), vec!["keep_even", "double"]);
    }

    #[tokio::test]
    async fn test_sum_of_nothing_is_none() {
        let runtime = runtime(
            "source: { start: -10, end: 0 }\nstages:\n  - stage: keep_positive\n",
        );

        assert_eq!(runtime.run().await.unwrap(), PipelineOutcome::Sum(None));
        assert!(runtime.history().is_empty().await);
    }

    #[tokio::test]
    async fn test_collect_rails_terminal_uses_every_rail() {
        let runtime = runtime(
            "parallelism: { rails: 4 }\nsource: { start: 0, end: 40 }\nterminal: collect_rails\n",
        );

        match runtime.run().await.unwrap() {
            PipelineOutcome::Rails(rails) => {
                assert_eq!(rails.len(), 4);
                assert_eq!(rails.iter().map(Vec::len).sum::<usize>(), 40);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ordered_terminal_keeps_order_and_history() {
        let runtime = runtime(
            r#"
source: { start: 1, end: 21 }
stages:
  - stage: keep_odd
  - stage: negate
terminal: ordered
history: { capacity: 3 }
"#,
        );

        let outcome = runtime.run().await.unwrap();
        let expected: Vec<i64> = (1..21).filter(|v| v % 2 != 0).map(|v| -v).collect();
        assert_eq!(outcome, PipelineOutcome::Values(expected));
        assert_eq!(runtime.history().snapshot().await, vec![-15, -17, -19]);
    }

    #[tokio::test]
    async fn test_history_is_bounded_for_rail_terminals() {
        let runtime = runtime(
            "source: { start: 0, end: 100 }\nterminal: collect\nhistory: { capacity: 5 }\n",
        );

        runtime.run().await.unwrap();
        assert_eq!(runtime.history().len().await, 5);
    }

    #[tokio::test]
    async fn test_stage_failure_fails_the_run() {
        let runtime = runtime(
            r#"
source: { start: 0, end: 1000 }
stages:
  - stage: fail_on
    options: { value: 500 }
terminal: collect
"#,
        );

        let err = runtime.run().await.unwrap_err();
        assert!(matches!(err, FlowError::Rail { .. }));
    }

    #[tokio::test]
    async fn test_ordered_failure_reports_element() {
        let runtime = runtime(
            "source: { start: 0, end: 10 }\nstages:\n  - stage: fail_on\n    options: { value: 6 }\nterminal: ordered\n",
        );

        let err = runtime.run().await.unwrap_err();
        assert!(matches!(err, FlowError::Element { index: 6, .. }));
    }

    #[tokio::test]
    async fn test_dedicated_rail_runtime() {
        let runtime = runtime(
            "parallelism: { rails: 2, worker_threads: 2 }\nsource: { start: 0, end: 50 }\n",
        );

        let expected: i64 = (0..50).sum();
        assert_eq!(runtime.run().await.unwrap(), PipelineOutcome::Sum(Some(expected)));
    }

    #[test]
    fn test_stage_options_are_checked_when_building() {
        let config: Config =
            serde_yaml::from_str("source: { start: 0, end: 1 }\nstages:\n  - stage: fail_on\n")
                .unwrap();

        assert!(matches!(
            RuntimeBuilder::from_config(&config),
            Err(ConfigError::Stage(_))
        ));
    }

    #[test]
    fn test_zero_worker_threads_is_not_clamped() {
        let config: Config = serde_yaml::from_str(
            "parallelism: { worker_threads: 0 }\nsource: { start: 0, end: 1 }\n",
        )
        .unwrap();

        match RuntimeBuilder::from_config(&config) {
            Err(ConfigError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::ZeroWorkerThreads]);
            }
            other => panic!("expected invalid config, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(PipelineOutcome::Sum(Some(3)).to_string(), "sum = 3");
        assert_eq!(
            PipelineOutcome::Rails(vec![vec![1], vec![]]).to_string(),
            "rail 0: 1 values [1]\nrail 1: 0 values []"
        );
    }
}
