// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::CodecError;
use crate::observability::messages::codec::CodecFailed;
use crate::observability::messages::StructuredLog;

/// Turns records into bytes and back.
///
/// Implementors provide `encode`/`decode` for one wire format; the provided
/// methods add the empty-input check, list helpers, base64 text and logging.
pub trait RecordSerializer {
    /// Short format name used in errors and logs.
    fn format(&self) -> &'static str;

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;

    fn serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        self.encode(value)
            .map_err(|error| report(self.format(), "serialize", error))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        if bytes.is_empty() {
            let error = CodecError::EmptyInput {
                format: self.format(),
            };
            return Err(report(self.format(), "deserialize", error));
        }
        self.decode(bytes)
            .map_err(|error| report(self.format(), "deserialize", error))
    }

    fn serialize_list<T: Serialize>(&self, values: &[T]) -> Result<Vec<u8>, CodecError> {
        self.serialize(values)
    }

    fn deserialize_list<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Vec<T>, CodecError> {
        self.deserialize(bytes)
    }

    fn serialize_to_text<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        Ok(STANDARD.encode(self.serialize(value)?))
    }

    fn deserialize_from_text<T: DeserializeOwned>(&self, text: &str) -> Result<T, CodecError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|error| report(self.format(), "deserialize", error.into()))?;
        self.deserialize(&bytes)
    }
}

fn report(format: &str, operation: &str, error: CodecError) -> CodecError {
    CodecFailed {
        format,
        operation,
        error: &error,
    }
    .log();
    error
}
