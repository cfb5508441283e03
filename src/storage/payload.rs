// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Content accepted by `StorageService::write_file`.

use bytes::Bytes;

use crate::error::Result;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_BINARY: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 text, stored as `text/plain`.
    Text(String),
    /// Structured value, serialised to JSON and stored as `application/json`.
    Json(serde_json::Value),
    /// Raw bytes, stored as `application/octet-stream`.
    Binary(Bytes),
}

impl Payload {
    /// Content type used when the caller does not pass one.
    pub fn content_type(&self) -> &'static str {
        match self {
            Payload::Text(_) => CONTENT_TYPE_TEXT,
            Payload::Json(_) => CONTENT_TYPE_JSON,
            Payload::Binary(_) => CONTENT_TYPE_BINARY,
        }
    }

    pub fn into_bytes(self) -> Result<Bytes> {
        Ok(match self {
            Payload::Text(s) => Bytes::from(s),
            Payload::Json(v) => Bytes::from(serde_json::to_vec(&v)?),
            Payload::Binary(b) => b,
        })
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self { Payload::Text(s) }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self { Payload::Text(s.to_string()) }
}

impl From<serde_json::Value> for Payload {
    fn from(v: serde_json::Value) -> Self { Payload::Json(v) }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self { Payload::Binary(Bytes::from(b)) }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self { Payload::Binary(b) }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self { Payload::Binary(Bytes::copy_from_slice(b)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_type_follows_variant() {
        assert_eq!(Payload::from("hello").content_type(), "text/plain");
        assert_eq!(Payload::from(json!({"a": 1})).content_type(), "application/json");
        assert_eq!(Payload::from(vec![0u8, 1, 2]).content_type(), "application/octet-stream");
    }

    #[test]
    fn json_is_serialised() {
        let bytes = Payload::from(json!({"model": "v2", "score": 0.5})).into_bytes().unwrap();
        let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back["model"], "v2");
        assert_eq!(back["score"], 0.5);
    }
}
