// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the railyard. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between the human-readable and structured output
//! * Provide consistent, structured logging output
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::rail` - Parallel pipeline lifecycle, producer and rail events
//! * `messages::scope` - Closeable scope and shutdown guard events
//! * `messages::codec` - Record serialization failures
//! * `messages::config` - Configuration loading and validation
//!
//! # Usage
//!
//! ```rust
//! use the_railyard::observability::messages::rail::PipelineStarted;
//! use the_railyard::observability::messages::StructuredLog;
//!
//! let msg = PipelineStarted { rails: 4 };
//! msg.log();
//! ```

mod logging;
pub mod messages;

pub use logging::init_logging;
