// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RecordSerializer;
use crate::errors::CodecError;

const FORMAT: &str = "yaml";

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRecordSerializer;

impl RecordSerializer for YamlRecordSerializer {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| CodecError::Encode {
                format: FORMAT,
                message: e.to_string(),
            })
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_yaml::from_slice(bytes).map_err(|e| CodecError::Decode {
            format: FORMAT,
            message: e.to_string(),
        })
    }
}
