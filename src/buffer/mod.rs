// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fixed-capacity ring buffers that overwrite their oldest element.

mod ring_buffer;
mod shared;

pub use ring_buffer::RingBuffer;
pub use shared::SharedRingBuffer;
