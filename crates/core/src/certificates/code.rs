//! Certificate code generation and format checks.
//!
//! Codes look like `CERT-20240110-7QX2M9KD`: a fixed prefix, the issue date
//! and eight random characters from `[A-Z0-9]`.

use std::sync::LazyLock;

use chrono::NaiveDate;
use rand::Rng;
use regex::Regex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Leading segment of every certificate code.
pub const CODE_PREFIX: &str = "CERT";

/// Number of random characters in the trailing segment.
pub const CODE_RANDOM_LENGTH: usize = 8;

/// Characters the random segment is drawn from.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Upper bound on regeneration attempts when a code collides.
pub const MAX_CODE_ATTEMPTS: usize = 5;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CERT-\d{8}-[A-Z0-9]{8}$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a code for `date` using the thread-local CSPRNG.
pub fn generate_certificate_code(date: NaiveDate) -> String {
    generate_certificate_code_with(date, &mut rand::rng())
}

/// Generate a code for `date` drawing the random segment from `rng`.
pub fn generate_certificate_code_with<R: Rng>(date: NaiveDate, rng: &mut R) -> String {
    let suffix: String = (0..CODE_RANDOM_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    format!("{CODE_PREFIX}-{}-{suffix}", date.format("%Y%m%d"))
}

/// `true` if `code` has the `CERT-YYYYMMDD-XXXXXXXX` shape.
pub fn is_well_formed(code: &str) -> bool {
    CODE_RE.is_match(code)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
