// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Record serializers with explicit results.
//!
//! Every failure, including empty input, comes back as a [`CodecError`] and is
//! logged once through [`CodecFailed`](crate::observability::messages::codec::CodecFailed).
//! The text variants wrap the serialized bytes in standard base64.

mod json;
mod serializer;
mod yaml;

pub use json::JsonRecordSerializer;
pub use serializer::RecordSerializer;
pub use yaml::YamlRecordSerializer;
