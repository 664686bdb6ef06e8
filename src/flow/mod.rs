// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Order-preserving concurrent map over a stream.

mod async_flow;

pub use async_flow::{AsyncFlow, AsyncFlowExt, OrderedMap};
