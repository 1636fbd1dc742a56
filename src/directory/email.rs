//! Decoder for the XOR-obfuscated email addresses the directory serves.
//!
//! The token is a hex string. The first byte is the key, and every later
//! byte XOR the key is one character of the address.

use crate::error::FieldError;

const LABEL: &str = "Email";

/// Decodes an obfuscated email token such as `"1b7a5b7e..."`.
pub fn decode_obfuscated(token: &str) -> Result<String, FieldError> {
    let token = token.trim();
    if token.len() < 2 {
        return Err(malformed("token too short"));
    }
    if token.len() % 2 != 0 {
        return Err(malformed("odd number of hex digits"));
    }
    if !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed("non-hex character"));
    }

    let mut bytes =
        token.as_bytes().chunks(2).map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]));

    // Length was checked above, so there is always a key byte.
    let key = bytes.next().unwrap_or_default();

    Ok(bytes.map(|b| char::from(b ^ key)).collect())
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

/// Obfuscates an address with the given key. Inverse of [`decode_obfuscated`].
pub fn encode_obfuscated(plain: &str, key: u8) -> String {
    std::iter::once(key)
        .chain(plain.bytes().map(|b| b ^ key))
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn malformed(reason: &str) -> FieldError {
    FieldError::Malformed { label: LABEL, reason: reason.to_string() }
}
