// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit the same event with typed `tracing` fields.
//!
//! * `rail` - Parallel pipeline lifecycle, producer and rail events
//! * `scope` - Closeable scope and shutdown guard events
//! * `codec` - Record serialization failures
//! * `config` - Configuration loading and validation
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_railyard::observability::messages::rail::ProducerFinished;
//!
//! let msg = ProducerFinished {
//!     delivered: 100,
//!     rails: 4,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod codec;
pub mod config;
pub mod rail;
pub mod scope;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its natural level with structured fields attached.
    fn log(&self);

    /// Open a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}
