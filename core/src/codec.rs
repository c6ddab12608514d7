//! JSON decoding seam.
//!
//! Requests are form-encoded, so the codec only ever decodes. Response
//! entities stay as `serde_json::Value` and are handed to the caller as-is.

use serde_json::Value;

/// Decodes a raw response body into a loosely typed JSON value.
pub trait JsonCodec {
    fn decode(&self, body: &str) -> Result<Value, String>;
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn decode(&self, body: &str) -> Result<Value, String> {
        serde_json::from_str(body).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_objects_and_arrays() {
        let codec = SerdeJsonCodec;
        let obj = codec.decode(r#"{"id":1,"name":"Inbox"}"#).unwrap();
        assert_eq!(obj["name"], "Inbox");
        let arr = codec.decode("[1,2]").unwrap();
        assert_eq!(arr.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn rejects_plain_text() {
        assert!(SerdeJsonCodec.decode("LOGIN_ERROR").is_err());
    }
}
