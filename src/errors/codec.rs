// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for record serialization.
//!
//! Serializers return these instead of an empty value so callers can tell
//! "nothing to decode" apart from "decoding failed".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    /// Nothing to decode.
    #[error("Cannot deserialize {format} record from empty input")]
    EmptyInput { format: &'static str },

    /// The value could not be encoded.
    #[error("Failed to serialize {format} record: {message}")]
    Encode { format: &'static str, message: String },

    /// The bytes were not a valid record of the requested type.
    #[error("Failed to deserialize {format} record: {message}")]
    Decode { format: &'static str, message: String },

    /// The text form was not valid base64.
    #[error("Invalid base64 text: {0}")]
    Text(#[from] base64::DecodeError),
}
