//! SHA-256 hex digest helpers.
//!
//! Certificate verification tokens are a prefix of a SHA-256 hex digest, so
//! the full-length and truncated forms both live here.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compute a SHA-256 hex digest and keep only the first `len` hex characters.
///
/// `len` is clamped to the full digest length (64).
pub fn sha256_hex_prefix(data: &[u8], len: usize) -> String {
    let mut hex = sha256_hex(data);
    hex.truncate(len.min(hex.len()));
    hex
}
