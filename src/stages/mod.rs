// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in integer stages that run on each rail of a pipeline.

pub mod arithmetic;
pub mod chain;
pub mod delay;
pub mod factory;
pub mod fail_on;
pub mod predicate;

pub use arithmetic::ArithmeticStage;
pub use chain::StageChain;
pub use delay::DelayStage;
pub use factory::StageFactory;
pub use fail_on::FailOnStage;
pub use predicate::PredicateStage;
