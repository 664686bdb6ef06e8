// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod buffer;
mod codec;
mod config;
mod flow;
mod stage;

pub use buffer::BufferError;
pub use codec::CodecError;
pub use config::{ConfigError, ValidationError};
pub use flow::FlowError;
pub use stage::StageError;
