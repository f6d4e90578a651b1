//! Compression Codec
//!
//! Lossless transform for oversized values: JSON serialization followed by
//! DEFLATE. The encoded form can be larger than the input for small or
//! incompressible payloads; callers accept that.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

/// Serialized size of a value in bytes, `0` when it cannot be serialized.
pub fn serialized_size<V: Serialize>(value: &V) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}

// == Compress ==
/// Encodes a value into compressed bytes.
pub fn compress<V: Serialize>(value: &V) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    let buffer = Vec::with_capacity(json.len() / 2);
    let mut encoder = DeflateEncoder::new(buffer, Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

// == Decompress ==
/// Reverses [`compress`].
pub fn decompress<V: DeserializeOwned>(encoded: &[u8]) -> Result<V> {
    let mut json = Vec::new();
    DeflateDecoder::new(encoded)
        .read_to_end(&mut json)
        .map_err(|e| CacheError::Codec(format!("inflate failed: {e}")))?;
    Ok(serde_json::from_slice(&json)?)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Lesson {
        title: String,
        tags: Vec<String>,
        score: Option<f64>,
    }

    #[test]
    fn test_serialized_size_matches_json_length() {
        assert_eq!(serialized_size(&"abc"), 5);
        assert_eq!(serialized_size(&42u32), 2);
    }

    #[test]
    fn test_round_trip_struct() {
        let lesson = Lesson {
            title: "Thermodynamics".repeat(20),
            tags: vec!["physics".to_string(), "heat".to_string()],
            score: Some(9.5),
        };

        let encoded = compress(&lesson).unwrap();
        let decoded: Lesson = decompress(&encoded).unwrap();
        assert_eq!(decoded, lesson);
    }

    #[test]
    fn test_repetitive_payload_shrinks() {
        let value = "x".repeat(4096);
        let encoded = compress(&value).unwrap();
        assert!(encoded.len() < serialized_size(&value));
    }

    #[test]
    fn test_small_payload_may_grow() {
        let value = "a";
        let encoded = compress(&value).unwrap();
        let decoded: String = decompress(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decompress_garbage_is_codec_error() {
        let result: Result<String> = decompress(&[0xff, 0x00, 0x13, 0x37]);
        assert!(matches!(result, Err(CacheError::Codec(_))));
    }

    #[test]
    fn test_decompress_wrong_type_is_codec_error() {
        let encoded = compress(&"text").unwrap();
        let result: Result<u64> = decompress(&encoded);
        assert!(matches!(result, Err(CacheError::Codec(_))));
    }
}
