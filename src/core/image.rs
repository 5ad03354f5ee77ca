// src/core/image.rs
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Image payload is empty")]
    Empty,

    #[error("Malformed image encoding: {0}")]
    Malformed(String),
}

/// Turns a transport-encoded image into raw bytes.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, encoded: &str) -> Result<Vec<u8>, DecodeError>;
}

/// Standard-alphabet base64, with or without a `data:<mime>;base64,` prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Decoder;

impl ImageDecoder for Base64Decoder {
    fn decode(&self, encoded: &str) -> Result<Vec<u8>, DecodeError> {
        let payload = match encoded.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => encoded,
        };
        // Line-wrapped encoders (MIME, `base64` CLI) insert CR/LF.
        let payload: String = payload.split_ascii_whitespace().collect();
        if payload.is_empty() {
            return Err(DecodeError::Empty);
        }

        BASE64_STANDARD
            .decode(payload)
            .map_err(|e| DecodeError::Malformed(e.to_string()))
    }
}
