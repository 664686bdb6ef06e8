// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for record serialization failures.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A record could not be encoded or decoded.
///
/// # Log Level
/// `error!` - The caller receives the same error as a `CodecError`
///
/// # Example
/// ```
/// use the_railyard::observability::messages::codec::CodecFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::InvalidData, "truncated");
/// let msg = CodecFailed {
///     format: "json",
///     operation: "deserialize",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CodecFailed<'a> {
    pub format: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CodecFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to {} {} record: {}",
            self.operation, self.format, self.error
        )
    }
}

impl StructuredLog for CodecFailed<'_> {
    fn log(&self) {
        tracing::error!(
            format = self.format,
            operation = self.operation,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "codec_failed",
            span_name = name,
            format = self.format,
            operation = self.operation,
            error = %self.error,
        )
    }
}
