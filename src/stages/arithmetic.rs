// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use async_trait::async_trait;

use crate::traits::{Stage, StageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Square,
    Double,
    Increment,
    Negate,
}

/// Checked integer arithmetic; overflow fails the pipeline instead of wrapping.
pub struct ArithmeticStage {
    operation: Operation,
}

impl ArithmeticStage {
    pub fn square() -> Self {
        Self { operation: Operation::Square }
    }

    pub fn double() -> Self {
        Self { operation: Operation::Double }
    }

    pub fn increment() -> Self {
        Self { operation: Operation::Increment }
    }

    pub fn negate() -> Self {
        Self { operation: Operation::Negate }
    }
}

#[async_trait]
impl Stage for ArithmeticStage {
    async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>> {
        let result = match self.operation {
            Operation::Square => value.checked_mul(value),
            Operation::Double => value.checked_mul(2),
            Operation::Increment => value.checked_add(1),
            Operation::Negate => value.checked_neg(),
        };

        result
            .map(Some)
            .ok_or_else(|| anyhow!("{} of {} overflows i64", self.name(), value))
    }

    fn name(&self) -> &'static str {
        match self.operation {
            Operation::Square => "square",
            Operation::Double => "double",
            Operation::Increment => "increment",
            Operation::Negate => "negate",
        }
    }

    fn kind(&self) -> StageKind {
        StageKind::Map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_arithmetic_operations() {
        struct TestCase {
            name: &'static str,
            stage: ArithmeticStage,
            input: i64,
            expected: i64,
        }

        let test_cases = vec![
            TestCase { name: "square", stage: ArithmeticStage::square(), input: -7, expected: 49 },
            TestCase { name: "double", stage: ArithmeticStage::double(), input: 21, expected: 42 },
            TestCase { name: "increment", stage: ArithmeticStage::increment(), input: -1, expected: 0 },
            TestCase { name: "negate", stage: ArithmeticStage::negate(), input: 5, expected: -5 },
        ];

        for case in test_cases {
            let output = case.stage.apply(case.input).await.unwrap();
            assert_eq!(output, Some(case.expected), "case: {}", case.name);
            assert_eq!(case.stage.name(), case.name);
            assert_eq!(case.stage.kind(), StageKind::Map);
        }
    }

    #[tokio::test]
    async fn test_overflow_is_an_error() {
        let err = ArithmeticStage::square().apply(i64::MAX).await.unwrap_err();
        assert!(err.to_string().contains("overflows"));

        assert!(ArithmeticStage::negate().apply(i64::MIN).await.is_err());
    }
}
