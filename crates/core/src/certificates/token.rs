//! Verification tokens binding a certificate code to the server secret.
//!
//! `token = sha256_hex(code + secret)[..16]`. Only the token is ever exposed;
//! the secret stays inside [`VerificationSigner`].

use std::fmt;

use subtle::ConstantTimeEq;

use crate::hashing::sha256_hex_prefix;

/// Length of a verification token in hex characters.
pub const TOKEN_LENGTH: usize = 16;

/// Mints and checks verification tokens with an injected secret.
#[derive(Clone)]
pub struct VerificationSigner {
    secret: String,
}

impl VerificationSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Derive the token for `certificate_code`.
    pub fn compute_token(&self, certificate_code: &str) -> String {
        let mut input = String::with_capacity(certificate_code.len() + self.secret.len());
        input.push_str(certificate_code);
        input.push_str(&self.secret);
        sha256_hex_prefix(input.as_bytes(), TOKEN_LENGTH)
    }

    /// Check `presented` against the token for `certificate_code`.
    ///
    /// The comparison does not short-circuit on the first differing byte.
    pub fn verify(&self, certificate_code: &str, presented: &str) -> bool {
        let expected = self.compute_token(certificate_code);
        expected.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl fmt::Debug for VerificationSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}
