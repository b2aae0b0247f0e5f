//! Certificate issuance and verification.
//!
//! - [`code`]: human-readable `CERT-YYYYMMDD-XXXXXXXX` code generation.
//! - [`expiry`]: validity resolution and expiry arithmetic.
//! - [`token`]: secret-bound verification tokens.
//! - [`issuer`]: eligibility checks and at-most-once issuance.
//! - [`verifier`]: token checks and presentation status.

pub mod code;
pub mod expiry;
pub mod issuer;
pub mod token;
pub mod verifier;

use serde::Serialize;

use crate::types::{DbId, Metadata, Timestamp};

pub use issuer::{CertificateIssuer, Eligibility, IssueOutcome};
pub use token::VerificationSigner;
pub use verifier::{CertificateVerifier, PresentationResult};

/// Path prefix of the public verification endpoint.
pub const VERIFY_PATH_PREFIX: &str = "/certificates/verify";

/// Build the public verification path `/certificates/verify/{code}/{token}`.
///
/// Code and token stay separate segments so the code alone can still be
/// used for lookups.
pub fn verification_path(code: &str, token: &str) -> String {
    format!("{VERIFY_PATH_PREFIX}/{code}/{token}")
}

/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Certificate {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub certificate_code: String,
    pub verification_token: String,
    pub issued_at: Timestamp,
    /// `None` means the certificate never expires.
    pub expires_at: Option<Timestamp>,
    pub download_count: i32,
    pub metadata: Metadata,
}

impl Certificate {
    /// `true` if the certificate has an expiry that lies before `now`.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    pub fn verification_path(&self) -> String {
        verification_path(&self.certificate_code, &self.verification_token)
    }
}

/// Everything needed to insert a certificate row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCertificate {
    pub user_id: DbId,
    pub course_id: DbId,
    pub certificate_code: String,
    pub verification_token: String,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub metadata: Metadata,
}

/// The course fields that govern issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoursePolicy {
    pub course_id: DbId,
    pub certificate_available: bool,
    /// Course-level override; see [`expiry::resolve_validity_years`].
    pub certificate_validity_years: Option<i32>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn certificate(expires_at: Option<Timestamp>) -> Certificate {
        Certificate {
            id: 1,
            user_id: 2,
            course_id: 3,
            certificate_code: "CERT-20240110-AB12CD34".into(),
            verification_token: "0123456789abcdef".into(),
            issued_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            expires_at,
            download_count: 0,
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn verification_path_keeps_code_and_token_separate() {
        assert_eq!(
            verification_path("CERT-20240110-AB12CD34", "0123456789abcdef"),
            "/certificates/verify/CERT-20240110-AB12CD34/0123456789abcdef"
        );
    }

    #[test]
    fn certificate_without_expiry_never_expires() {
        let cert = certificate(None);
        let far_future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        assert!(!cert.is_expired_at(far_future));
    }

    #[test]
    fn certificate_expires_after_expiry_instant() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();
        let cert = certificate(Some(expiry));
        assert!(!cert.is_expired_at(expiry));
        assert!(cert.is_expired_at(Utc.with_ymd_and_hms(2026, 1, 11, 0, 0, 0).unwrap()));
    }
}
