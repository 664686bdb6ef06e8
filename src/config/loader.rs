// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::config::consts::{DEFAULT_ASYNC_CAPACITY, DEFAULT_HISTORY_CAPACITY, DEFAULT_RAILS};
use crate::errors::ConfigError;
use crate::observability::messages::config::{ConfigLoaded, ConfigRejected};
use crate::observability::messages::StructuredLog;

/// Complete configuration for one pipeline run.
///
/// A run pulls the integers of `source` through `parallelism.rails` rails,
/// applies `stages` in order on each rail and finishes with `terminal`.
///
/// # Example
/// ```yaml
/// parallelism:
///   rails: 4
///   worker_threads: 2
/// source:
///   start: 1
///   end: 101
/// stages:
///   - id: odd_only
///     stage: keep_odd
///   - stage: square
/// terminal: sum
/// history:
///   capacity: 8
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parallelism: ParallelismOptions,
    pub source: SourceConfig,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
    #[serde(default)]
    pub terminal: Terminal,
    #[serde(default)]
    pub history: HistoryOptions,
}

/// How many rails to run and where to run them.
///
/// # Fields
/// * `rails` - Number of rails (defaults to 4)
/// * `worker_threads` - Run rails on a dedicated multi-thread runtime with this
///   many workers; when absent rails share the caller's runtime
/// * `async_capacity` - In-flight limit for the `ordered` terminal (defaults to 8)
#[derive(Debug, Clone, Deserialize)]
pub struct ParallelismOptions {
    #[serde(default = "default_rails")]
    pub rails: usize,
    pub worker_threads: Option<usize>,
    #[serde(default = "default_async_capacity")]
    pub async_capacity: usize,
}

impl Default for ParallelismOptions {
    fn default() -> Self {
        Self {
            rails: DEFAULT_RAILS,
            worker_threads: None,
            async_capacity: DEFAULT_ASYNC_CAPACITY,
        }
    }
}

fn default_rails() -> usize {
    DEFAULT_RAILS
}

fn default_async_capacity() -> usize {
    DEFAULT_ASYNC_CAPACITY
}

/// Half-open integer range feeding the pipeline.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub start: i64,
    pub end: i64,
}

impl SourceConfig {
    pub fn range(&self) -> Range<i64> {
        self.start..self.end
    }
}

/// One stage on every rail.
///
/// # Fields
/// * `id` - Optional unique label for the stage
/// * `stage` - Built-in implementation name, see `StageFactory`
/// * `options` - Stage-specific options such as `millis` for `delay`
#[derive(Debug, Clone, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub id: Option<String>,
    pub stage: String,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>,
}

/// What to do with the rails once every stage ran.
///
/// # Variants
/// * `Sum` - Reduce every surviving value to one total
/// * `Collect` - Re-join the rails and gather every value
/// * `CollectRails` - Gather values per rail
/// * `Ordered` - Skip the rails and map concurrently in upstream order
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    #[default]
    Sum,
    Collect,
    CollectRails,
    Ordered,
}

impl Terminal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::Sum => "sum",
            Terminal::Collect => "collect",
            Terminal::CollectRails => "collect_rails",
            Terminal::Ordered => "ordered",
        }
    }
}

/// How many recent outputs to keep for reporting.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HistoryOptions {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

/// Load a config from a YAML file, or TOML when the path ends in `.toml`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_toml = path.extension().and_then(|ext| ext.to_str()) == Some("toml");
    let cfg: Config = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Load a config and run every validation check on it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_config(&cfg) {
        for error in &validation_errors {
            ConfigRejected { error }.log();
        }
        return Err(ConfigError::Invalid(validation_errors));
    }

    ConfigLoaded {
        path: &path.display().to_string(),
        rails: cfg.parallelism.rails,
        stage_count: cfg.stages.len(),
    }
    .log();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
parallelism:
  rails: 3
source:
  start: 0
  end: 10
stages:
  - id: evens
    stage: keep_even
  - stage: delay
    options:
      millis: 5
terminal: collect_rails
"#;

        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.parallelism.rails, 3);
        assert_eq!(cfg.parallelism.async_capacity, DEFAULT_ASYNC_CAPACITY);
        assert_eq!(cfg.source.range(), 0..10);
        assert_eq!(cfg.stages.len(), 2);
        assert_eq!(cfg.stages[0].id.as_deref(), Some("evens"));
        assert_eq!(cfg.stages[1].options["millis"].as_u64(), Some(5));
        assert_eq!(cfg.terminal, Terminal::CollectRails);
        assert_eq!(cfg.history.capacity, DEFAULT_HISTORY_CAPACITY);
    }

    #[test]
    fn test_defaults_apply_to_minimal_config() {
        let cfg: Config = serde_yaml::from_str("source: { start: 1, end: 2 }").unwrap();

        assert_eq!(cfg.parallelism.rails, DEFAULT_RAILS);
        assert_eq!(cfg.parallelism.worker_threads, None);
        assert!(cfg.stages.is_empty());
        assert_eq!(cfg.terminal, Terminal::Sum);
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_config(
            ".yaml",
            "source:\n  start: -5\n  end: 5\nterminal: ordered\n",
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.source, SourceConfig { start: -5, end: 5 });
        assert_eq!(cfg.terminal, Terminal::Ordered);
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_config(
            ".toml",
            r#"
terminal = "collect"

[parallelism]
rails = 2

[source]
start = 0
end = 4

[[stages]]
stage = "fail_on"
options = { value = 3 }
"#,
        );

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.parallelism.rails, 2);
        assert_eq!(cfg.terminal, Terminal::Collect);
        assert_eq!(cfg.stages[0].options["value"].as_i64(), Some(3));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_config("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }

    #[test]
    fn test_load_and_validate_rejects_invalid_config() {
        let file = write_config(
            ".yaml",
            "parallelism: { rails: 0 }\nsource: { start: 3, end: 3 }\n",
        );

        match load_and_validate_config(file.path()) {
            Err(ConfigError::Invalid(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_load_and_validate_valid_config() {
        let file = write_config(
            ".yml",
            "source: { start: 0, end: 100 }\nstages:\n  - stage: square\n",
        );

        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.stages[0].stage, "square");
    }
}
