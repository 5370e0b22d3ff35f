//! Encoding utilities for hex and base64.
//!
//! TON services disagree about alphabets: toncenter v3 speaks standard
//! base64, explorers put URL-safe base64 in paths, tonviewer uses hex. The
//! helpers here accept all of them.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::error::{ReplayError, Result};

// =============================================================================
// Base64
// =============================================================================

/// Encode bytes to a standard (padded) base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Encode bytes to URL-safe (padded) base64.
pub fn base64_url_encode(bytes: &[u8]) -> String {
    URL_SAFE.encode(bytes)
}

/// Decode base64 in either alphabet, with or without padding.
///
/// `context` names the value in the error message (e.g. "transaction hash").
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    let b64 = b64.trim();
    let engines = [&STANDARD, &URL_SAFE, &STANDARD_NO_PAD, &URL_SAFE_NO_PAD];
    engines
        .iter()
        .find_map(|engine| engine.decode(b64).ok())
        .ok_or_else(|| ReplayError::codec(context, format!("'{}' is not valid base64", b64)))
}

// =============================================================================
// Hex
// =============================================================================

/// Parse a hex string (optional `0x` prefix) to raw bytes.
pub fn parse_hex_bytes(hex_str: &str, context: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.trim();
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str)
        .map_err(|e| ReplayError::codec(context, format!("invalid hex '{}': {}", hex_str, e)))
}

// =============================================================================
// 256-bit values
// =============================================================================

/// Decode a 32-byte value written as 64 hex digits or as base64.
///
/// Hex wins when the text is exactly 64 hex digits; everything else is
/// tried as base64.
pub fn decode_bytes32(text: &str, context: &str) -> Result<[u8; 32]> {
    let text = text.trim();
    let bytes = if text.len() == 64 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        parse_hex_bytes(text, context)?
    } else {
        base64_decode(text, context)?
    };
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        ReplayError::codec(context, format!("expected 32 bytes, got {}", bytes.len()))
    })
}
