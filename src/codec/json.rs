// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::RecordSerializer;
use crate::errors::CodecError;

const FORMAT: &str = "json";

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordSerializer;

impl RecordSerializer for JsonRecordSerializer {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Encode {
            format: FORMAT,
            message: e.to_string(),
        })
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Decode {
            format: FORMAT,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Reading {
        rail: usize,
        value: i64,
    }

    #[test]
    fn test_record_round_trip() {
        let codec = JsonRecordSerializer;
        let reading = Reading { rail: 2, value: -9 };

        let bytes = codec.serialize(&reading).unwrap();
        assert_eq!(bytes, br#"{"rail":2,"value":-9}"#.to_vec());
        assert_eq!(codec.deserialize::<Reading>(&bytes).unwrap(), reading);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = JsonRecordSerializer.deserialize::<Reading>(&[]).unwrap_err();
        assert!(matches!(err, CodecError::EmptyInput { format: "json" }));

        let err = JsonRecordSerializer.deserialize_list::<Reading>(b"").unwrap_err();
        assert!(matches!(err, CodecError::EmptyInput { .. }));
    }

    #[test]
    fn test_malformed_input_is_a_decode_error() {
        let err = JsonRecordSerializer
            .deserialize::<Reading>(br#"{"rail": "two"}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::Decode { format: "json", .. }));
    }

    #[test]
    fn test_list_round_trip() {
        let codec = JsonRecordSerializer;
        let readings = vec![Reading { rail: 0, value: 1 }, Reading { rail: 1, value: 4 }];

        let bytes = codec.serialize_list(&readings).unwrap();
        assert_eq!(codec.deserialize_list::<Reading>(&bytes).unwrap(), readings);
    }

    #[test]
    fn test_text_is_base64() {
        let codec = JsonRecordSerializer;

        let text = codec.serialize_to_text(&[1, 2, 3]).unwrap();
        assert_eq!(text, "WzEsMiwzXQ==");
        assert_eq!(codec.deserialize_from_text::<Vec<u8>>(&text).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_base64_text() {
        let err = JsonRecordSerializer
            .deserialize_from_text::<Vec<u8>>("not base64!")
            .unwrap_err();
        assert!(matches!(err, CodecError::Text(_)));
    }
}
