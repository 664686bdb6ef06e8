// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised when constructing ring buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A ring buffer needs room for at least one element.
    #[error("Ring buffer capacity must be greater than zero")]
    ZeroCapacity,
}
