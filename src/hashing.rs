//! SHA-256 helpers for session keys and anonymised log fields.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;

/// Lower-case hex of the SHA-256 digest of `text`.
pub fn sha256_hex(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Short, stable pseudonym for an identifier such as an email address.
/// Case and surrounding whitespace are ignored.
pub fn anon_hash(text: &str) -> String {
    let mut hex = sha256_hex(&text.trim().to_lowercase());
    hex.truncate(12);
    hex
}
