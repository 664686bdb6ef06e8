// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Explicitly owned task scopes and cleanup hooks.
//!
//! A [`CloseableScope`] owns the tasks spawned through it and cancels them on
//! close or drop. A [`ShutdownGuard`] owns cleanup callbacks and runs them in
//! reverse registration order exactly once.

mod closeable;
mod shutdown;

pub use closeable::CloseableScope;
pub use shutdown::ShutdownGuard;
