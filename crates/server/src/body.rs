//! Response bodies on the JSON host binding.
//!
//! Bodies that are valid UTF-8 travel as text in `body`. Anything else is
//! carried in `body_base64`, so the host always gets the stored bytes back.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    Utf8,
    Base64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodedBody {
    pub encoding: BodyEncoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_base64: Option<String>,
    /// Length of the raw bytes.
    pub body_len: usize,
}

impl EncodedBody {
    pub fn encode(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self {
                encoding: BodyEncoding::Utf8,
                body: Some(text.to_string()),
                body_base64: None,
                body_len: bytes.len(),
            },
            Err(_) => Self {
                encoding: BodyEncoding::Base64,
                body: None,
                body_base64: Some(STANDARD.encode(bytes)),
                body_len: bytes.len(),
            },
        }
    }
}

#[cfg(test)]
pub(crate) fn decode(body: &EncodedBody) -> Vec<u8> {
    match body.encoding {
        BodyEncoding::Utf8 => body.body.clone().unwrap().into_bytes(),
        BodyEncoding::Base64 => STANDARD.decode(body.body_base64.as_deref().unwrap()).unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEAD: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0xfe];

    #[test]
    fn test_text_stays_text() {
        let body = EncodedBody::encode("<html>ü</html>".as_bytes());
        assert_eq!(body.encoding, BodyEncoding::Utf8);
        assert_eq!(body.body.as_deref(), Some("<html>ü</html>"));
        assert!(body.body_base64.is_none());
        assert_eq!(body.body_len, 15);
    }

    #[test]
    fn test_binary_is_base64_and_lossless() {
        let body = EncodedBody::encode(PNG_HEAD);
        assert_eq!(body.encoding, BodyEncoding::Base64);
        assert!(body.body.is_none());
        assert_eq!(body.body_len, PNG_HEAD.len());
        assert_eq!(decode(&body), PNG_HEAD);
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(EncodedBody::encode(&[0xff])).unwrap();
        assert_eq!(value, serde_json::json!({"encoding": "base64", "body_base64": "/w==", "body_len": 1}));

        let value = serde_json::to_value(EncodedBody::encode(b"ok")).unwrap();
        assert_eq!(value, serde_json::json!({"encoding": "utf8", "body": "ok", "body_len": 2}));
    }
}
