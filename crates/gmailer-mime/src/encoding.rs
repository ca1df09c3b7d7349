//! MIME encoding and decoding utilities.
//!
//! Supports Base64, the URL-safe unpadded Base64 variant expected by the
//! Gmail API, and RFC 2047 encoded-words.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

/// Encodes data as Base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decodes Base64 data.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    STANDARD.decode(data).map_err(Into::into)
}

/// Encodes data as Base64url: `+` becomes `-`, `/` becomes `_`, and
/// trailing `=` padding is dropped.
#[must_use]
pub fn encode_base64url(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decodes unpadded Base64url data.
///
/// # Errors
///
/// Returns an error if the input is not valid unpadded Base64url.
pub fn decode_base64url(data: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(data).map_err(Into::into)
}

/// Encodes a header value as a UTF-8 Base64 encoded-word.
///
/// Format: `=?UTF-8?B?<base64>?=`. The value is always encoded, even when
/// it is plain ASCII.
#[must_use]
pub fn encode_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", encode_base64(text.as_bytes()))
}

/// Decodes an RFC 2047 encoded-word.
///
/// Values that are not encoded-words are returned unchanged. Only the
/// `B` encoding with a UTF-8 compatible charset is supported.
///
/// # Errors
///
/// Returns an error if the encoded-word is malformed or uses `Q` encoding.
pub fn decode_word(text: &str) -> Result<String> {
    let Some(inner) = text.strip_prefix("=?").and_then(|t| t.strip_suffix("?=")) else {
        return Ok(text.to_string());
    };

    let parts: Vec<&str> = inner.split('?').collect();
    let [_charset, encoding, encoded_text] = parts.as_slice() else {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    };

    if encoding.eq_ignore_ascii_case("B") {
        let decoded = decode_base64(encoded_text)?;
        String::from_utf8(decoded).map_err(Into::into)
    } else {
        Err(Error::InvalidEncoding(format!(
            "Unsupported encoding: {encoding}"
        )))
    }
}
