//! Format checks for keys, signatures and names.
//!
//! These are shape checks only. They never decode key material and never
//! bind a private key to a public key; that binding is proven by a
//! signature or not at all.

use crate::codec::SEPARATORS;

/// Hex characters of an encoded 32-byte key.
pub const KEY_HEX_LEN: usize = 64;

/// Hex characters of an encoded 64-byte signature.
pub const SIGNATURE_HEX_LEN: usize = 128;

/// True if every character is a lowercase hex digit.
///
/// Uppercase digits are rejected so that every key and signature has
/// exactly one textual form inside a payload.
pub fn is_lower_hex(s: &str) -> bool {
    s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

fn check_hex(s: &str, len: usize) -> bool {
    s.len() == len && is_lower_hex(s)
}

/// Check the shape of a hex-encoded public key.
pub fn check_public_key(s: &str) -> bool {
    check_hex(s, KEY_HEX_LEN)
}

/// Check the shape of a hex-encoded private key (32-byte seed).
pub fn check_private_key(s: &str) -> bool {
    check_hex(s, KEY_HEX_LEN)
}

/// Check the shape of a hex-encoded signature.
pub fn check_signature(s: &str) -> bool {
    check_hex(s, SIGNATURE_HEX_LEN)
}

/// Check that a name can be placed in a payload without ambiguity.
///
/// A name must be non-empty, contain neither separator token, and must not
/// start or end with a separator character. The last rule stops a name from
/// merging with an adjacent separator, e.g. `"a;"` followed by `";;"`.
pub fn check_name(s: &str) -> bool {
    let (Some(first), Some(last)) = (s.chars().next(), s.chars().last()) else {
        return false;
    };

    if s.contains(SEPARATORS.field) || s.contains(SEPARATORS.list) {
        return false;
    }

    !SEPARATORS.is_delimiter(first) && !SEPARATORS.is_delimiter(last)
}
