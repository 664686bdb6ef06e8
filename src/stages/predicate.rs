// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::traits::{Stage, StageKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate {
    Even,
    Odd,
    Positive,
}

/// Drops values that don't satisfy a fixed predicate.
pub struct PredicateStage {
    predicate: Predicate,
}

impl PredicateStage {
    pub fn keep_even() -> Self {
        Self { predicate: Predicate::Even }
    }

    pub fn keep_odd() -> Self {
        Self { predicate: Predicate::Odd }
    }

    pub fn keep_positive() -> Self {
        Self { predicate: Predicate::Positive }
    }

    fn accepts(&self, value: i64) -> bool {
        match self.predicate {
            Predicate::Even => value % 2 == 0,
            Predicate::Odd => value % 2 != 0,
            Predicate::Positive => value > 0,
        }
    }
}

#[async_trait]
impl Stage for PredicateStage {
    async fn apply(&self, value: i64) -> anyhow::Result<Option<i64>> {
        Ok(self.accepts(value).then_some(value))
    }

    fn name(&self) -> &'static str {
        match self.predicate {
            Predicate::Even => "keep_even",
            Predicate::Odd => "keep_odd",
            Predicate::Positive => "keep_positive",
        }
    }

    fn kind(&self) -> StageKind {
        StageKind::Filter
    }
}
