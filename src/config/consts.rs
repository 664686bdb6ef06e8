// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Rail count used when a config does not set `parallelism.rails`
pub const DEFAULT_RAILS: usize = 4;
/// Largest accepted rail count
pub const MAX_RAILS: usize = 256;
/// Number of most recent outputs kept for reporting
pub const DEFAULT_HISTORY_CAPACITY: usize = 16;
/// In-flight element limit for the ordered terminal
pub const DEFAULT_ASYNC_CAPACITY: usize = 8;
