// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod buffer;     // ring buffers
pub mod codec;      // record serializers
pub mod config;     // config + runtime builder
pub mod errors;     // error handling
pub mod flow;       // ordered async map
pub mod observability;
pub mod rail;       // parallel rails
pub mod scope;      // closeable scopes, shutdown hooks
pub mod stages;     // built-in stages
pub mod traits;     // unified abstractions
