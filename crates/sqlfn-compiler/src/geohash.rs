//! Geohash text encoding.
//!
//! A geohash value is stored right aligned in an `i64`; its precision in
//! bits lives in the column type. Text form uses the geohash base32
//! alphabet, five bits per character.

use sqlfn_core::{Constant, GEOHASH_MAX_BITS};

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Maximum number of base32 characters in a geohash.
pub const MAX_CHARS: usize = (GEOHASH_MAX_BITS / 5) as usize;

fn decode_char(c: u8) -> Option<i64> {
    let c = c.to_ascii_lowercase();
    BASE32.iter().position(|&b| b == c).map(|i| i as i64)
}

/// Encode the leading `bits` of `text` as a geohash.
///
/// Fails when `text` has fewer characters than `bits` requires or contains
/// a character outside the alphabet. Extra characters are ignored.
pub fn from_string(text: &str, bits: u8) -> Option<i64> {
    if bits == 0 || bits > GEOHASH_MAX_BITS {
        return None;
    }
    let chars = usize::from(bits).div_ceil(5);
    let bytes = text.as_bytes();
    if bytes.len() < chars {
        return None;
    }
    let mut value = 0i64;
    for &b in &bytes[..chars] {
        value = (value << 5) | decode_char(b)?;
    }
    Some(value >> (chars * 5 - usize::from(bits)))
}

/// Drop the low bits of a geohash to reduce its precision.
#[inline]
pub fn narrow(value: i64, from_bits: u8, to_bits: u8) -> i64 {
    debug_assert!(to_bits <= from_bits);
    value >> (from_bits - to_bits)
}

/// Render a geohash whose precision is a whole number of characters.
pub fn to_string(value: i64, bits: u8) -> Option<String> {
    if bits == 0 || bits % 5 != 0 {
        return None;
    }
    let chars = usize::from(bits / 5);
    let mut out = vec![0u8; chars];
    let mut v = value;
    for slot in out.iter_mut().rev() {
        *slot = BASE32[(v & 0x1f) as usize];
        v >>= 5;
    }
    String::from_utf8(out).ok()
}

/// Parse a geohash literal token.
///
/// - `#<chars>` gives `5 * len` bits.
/// - `#<chars>/<bits>` keeps the leading `bits`, which must not exceed the
///   characters supplied.
/// - `##<binary digits>` gives one bit per digit.
///
/// Returns `None` when the token is not a well-formed geohash literal.
pub fn parse_literal(token: &str) -> Option<Constant> {
    if let Some(binary) = token.strip_prefix("##") {
        let bits = binary.len();
        if bits == 0 || bits > usize::from(GEOHASH_MAX_BITS) {
            return None;
        }
        let mut value = 0i64;
        for b in binary.bytes() {
            let bit = match b {
                b'0' => 0,
                b'1' => 1,
                _ => return None,
            };
            value = (value << 1) | bit;
        }
        return Some(Constant::geohash(bits as u8, value));
    }

    let body = token.strip_prefix('#')?;
    let (chars, bits) = match body.split_once('/') {
        Some((chars, bits)) => (chars, Some(bits.parse::<u8>().ok()?)),
        None => (body, None),
    };
    if chars.is_empty() || chars.len() > MAX_CHARS {
        return None;
    }
    let available = (chars.len() * 5) as u8;
    let bits = bits.unwrap_or(available);
    if bits == 0 || bits > available {
        return None;
    }
    from_string(chars, bits).map(|value| Constant::geohash(bits, value))
}
