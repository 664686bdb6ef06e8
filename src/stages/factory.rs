// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{ArithmeticStage, DelayStage, FailOnStage, PredicateStage};
use crate::config::StageConfig;
use crate::errors::StageError;
use crate::traits::Stage;

/// Creates built-in stage instances by name.
pub struct StageFactory;

impl StageFactory {
    /// Create a stage instance from configuration.
    ///
    /// The `stage` field selects the implementation:
    /// - "square", "double", "increment", "negate" -> ArithmeticStage
    /// - "keep_even", "keep_odd", "keep_positive" -> PredicateStage
    /// - "delay" -> DelayStage (option `millis`, defaults to 0)
    /// - "fail_on" -> FailOnStage (option `value`, required)
    pub fn create_stage(config: &StageConfig) -> Result<Arc<dyn Stage>, StageError> {
        match config.stage.as_str() {
            "square" => Ok(Arc::new(ArithmeticStage::square())),
            "double" => Ok(Arc::new(ArithmeticStage::double())),
            "increment" => Ok(Arc::new(ArithmeticStage::increment())),
            "negate" => Ok(Arc::new(ArithmeticStage::negate())),

            "keep_even" => Ok(Arc::new(PredicateStage::keep_even())),
            "keep_odd" => Ok(Arc::new(PredicateStage::keep_odd())),
            "keep_positive" => Ok(Arc::new(PredicateStage::keep_positive())),

            "delay" => {
                let millis = match config.options.get("millis") {
                    Some(value) => value.as_u64().ok_or_else(|| StageError::InvalidOption {
                        stage: config.stage.clone(),
                        option: "millis".to_string(),
                        reason: "expected a non-negative integer".to_string(),
                    })?,
                    None => 0,
                };
                Ok(Arc::new(DelayStage::from_millis(millis)))
            }

            "fail_on" => {
                let trigger = config
                    .options
                    .get("value")
                    .and_then(|value| value.as_i64())
                    .ok_or_else(|| StageError::InvalidOption {
                        stage: config.stage.clone(),
                        option: "value".to_string(),
                        reason: "expected an integer".to_string(),
                    })?;
                Ok(Arc::new(FailOnStage::new(trigger)))
            }

            _ => Err(StageError::UnknownStage {
                name: config.stage.clone(),
            }),
        }
    }

    /// Create every stage in order.
    pub fn create_stages(configs: &[StageConfig]) -> Result<Vec<Arc<dyn Stage>>, StageError> {
        configs.iter().map(Self::create_stage).collect()
    }

    pub fn list_available_stages() -> Vec<&'static str> {
        vec![
            "square",
            "double",
            "increment",
            "negate",
            "keep_even",
            "keep_odd",
            "keep_positive",
            "delay",
            "fail_on",
        ]
    }

    pub fn is_stage_available(name: &str) -> bool {
        Self::list_available_stages().contains(&name)
    }
}
