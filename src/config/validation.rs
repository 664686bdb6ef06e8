// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for pipeline correctness.
//!
//! Every check runs and every problem is reported, so a user can fix a
//! configuration in one pass:
//!
//! 1. **Parallelism**: rail count within `1..=MAX_RAILS`, non-zero async capacity
//! 2. **Source**: the range yields at least one value
//! 3. **Stages**: every implementation name is known, stage ids are unique
//! 4. **History**: capacity is non-zero
//!
//! # Examples
//!
//! ```rust
//! use the_railyard::config::validate_config;
//! use the_railyard::errors::ValidationError;
//!
//! let config = serde_yaml::from_str(
//!     "source: { start: 0, end: 10 }\nstages:\n  - stage: cube\n",
//! )
//! .unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::UnknownStage {
//!         index: 0,
//!         name: "cube".to_string()
//!     }]
//! );
//! ```

use std::collections::HashSet;

use crate::config::consts::MAX_RAILS;
use crate::config::Config;
use crate::errors::ValidationError;
use crate::stages::StageFactory;

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_parallelism(config, &mut errors);
    validate_source(config, &mut errors);
    validate_stages(config, &mut errors);

    if config.history.capacity == 0 {
        errors.push(ValidationError::ZeroHistoryCapacity);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_parallelism(config: &Config, errors: &mut Vec<ValidationError>) {
    let rails = config.parallelism.rails;
    if rails == 0 || rails > MAX_RAILS {
        errors.push(ValidationError::RailCountOutOfRange {
            requested: rails,
            maximum: MAX_RAILS,
        });
    }
    if config.parallelism.async_capacity == 0 {
        errors.push(ValidationError::ZeroAsyncCapacity);
    }
    if config.parallelism.worker_threads == Some(0) {
        errors.push(ValidationError::ZeroWorkerThreads);
    }
}

fn validate_source(config: &Config, errors: &mut Vec<ValidationError>) {
    if config.source.start >= config.source.end {
        errors.push(ValidationError::EmptySourceRange {
            start: config.source.start,
            end: config.source.end,
        });
    }
}

fn validate_stages(config: &Config, errors: &mut Vec<ValidationError>) {
    let mut seen_ids = HashSet::new();

    for (index, stage) in config.stages.iter().enumerate() {
        if !StageFactory::is_stage_available(&stage.stage) {
            errors.push(ValidationError::UnknownStage {
                index,
                name: stage.stage.clone(),
            });
        }

        if let Some(id) = &stage.id {
            if !seen_ids.insert(id.as_str()) {
                errors.push(ValidationError::DuplicateStageId {
                    stage_id: id.clone(),
                });
            }
        }
    }
}
