// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{load_and_validate_config, PipelineOutcome, RuntimeBuilder, Terminal};
use crate::errors::FlowError;

fn odd_square_sum() -> i64 {
    (0i64..1000).filter(|v| v % 2 != 0).map(|v| v * v).sum()
}

/// The sample YAML and TOML configs describe the same pipeline
#[test]
fn test_yaml_and_toml_samples_agree() {
    let yaml = load_and_validate_config("configs/odd-squares.yaml").unwrap();
    let toml = load_and_validate_config("configs/odd-squares.toml").unwrap();

    assert_eq!(yaml.parallelism.rails, toml.parallelism.rails);
    assert_eq!(yaml.source, toml.source);
    assert_eq!(yaml.terminal, toml.terminal);
    let names = |cfg: &crate::config::Config| -> Vec<String> {
        cfg.stages.iter().map(|s| s.stage.clone()).collect()
    };
    assert_eq!(names(&yaml), names(&toml));
    assert_eq!(yaml.history.capacity, 8);
}

#[tokio::test]
async fn test_odd_squares_sample() {
    let config = load_and_validate_config("configs/odd-squares.yaml").unwrap();
    let runtime = RuntimeBuilder::from_config(&config).unwrap();

    let outcome = runtime.run().await.unwrap();

    assert_eq!(outcome, PipelineOutcome::Sum(Some(odd_square_sum())));
    assert_eq!(runtime.history().len().await, 8);
}

#[tokio::test]
async fn test_slow_rails_sample() {
    let config = load_and_validate_config("configs/slow-rails.yaml").unwrap();
    assert_eq!(config.parallelism.worker_threads, Some(4));
    let runtime = RuntimeBuilder::from_config(&config).unwrap();

    match runtime.run().await.unwrap() {
        PipelineOutcome::Rails(rails) => {
            assert_eq!(rails.len(), 8);
            let mut all: Vec<i64> = rails.into_iter().flatten().collect();
            all.sort_unstable();
            assert_eq!(all, (2..66).collect::<Vec<_>>());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_ordered_sample() {
    let config = load_and_validate_config("configs/ordered.yaml").unwrap();
    assert_eq!(config.terminal, Terminal::Ordered);
    let runtime = RuntimeBuilder::from_config(&config).unwrap();

    let outcome = runtime.run().await.unwrap();

    let expected: Vec<i64> = (0..20).filter(|v| v % 2 != 0).map(|v| -(v * v)).collect();
    assert_eq!(outcome, PipelineOutcome::Values(expected.clone()));
    assert_eq!(runtime.history().snapshot().await, expected[expected.len() - 5..].to_vec());
}

#[tokio::test]
async fn test_failing_stage_sample() {
    let config = load_and_validate_config("configs/failing-stage.yaml").unwrap();
    let runtime = RuntimeBuilder::from_config(&config).unwrap();

    let err = runtime.run().await.unwrap_err();

    assert!(matches!(err, FlowError::Rail { .. }));
    assert!(err.to_string().contains("4242"));
}
