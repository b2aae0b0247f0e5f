//! Certificate authenticity and validity checks.
//!
//! [`CertificateVerifier::verify`] authenticates a (code, token) pair without
//! touching the store. [`CertificateVerifier::validate_for_presentation`]
//! looks a code up and reports whether it is currently valid.

use chrono::Utc;
use serde::Serialize;

use super::token::VerificationSigner;
use super::Certificate;
use crate::store::{CertificateStore, StoreError};
use crate::types::Timestamp;

pub const MSG_NOT_FOUND: &str = "Certificate not found";
pub const MSG_EXPIRED: &str = "Certificate has expired";
pub const MSG_VALID: &str = "Certificate is valid";
pub const MSG_INVALID_TOKEN: &str = "Invalid verification token";

/// Status reported to whoever presented a certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationResult {
    pub valid: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
}

impl PresentationResult {
    fn rejected(message: &'static str, certificate: Option<Certificate>) -> Self {
        Self {
            valid: false,
            message,
            certificate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CertificateVerifier<S> {
    store: S,
    signer: VerificationSigner,
}

impl<S: CertificateStore> CertificateVerifier<S> {
    pub fn new(store: S, signer: VerificationSigner) -> Self {
        Self { store, signer }
    }

    pub fn compute_token(&self, certificate_code: &str) -> String {
        self.signer.compute_token(certificate_code)
    }

    /// Constant-time check of `presented_token` against the code's token.
    pub fn verify(&self, certificate_code: &str, presented_token: &str) -> bool {
        self.signer.verify(certificate_code, presented_token)
    }

    pub async fn validate_for_presentation(
        &self,
        certificate_code: &str,
    ) -> Result<PresentationResult, StoreError> {
        self.validate_for_presentation_at(certificate_code, Utc::now())
            .await
    }

    /// Look `certificate_code` up and report its status as of `now`.
    pub async fn validate_for_presentation_at(
        &self,
        certificate_code: &str,
        now: Timestamp,
    ) -> Result<PresentationResult, StoreError> {
        let Some(certificate) = self.store.find_certificate_by_code(certificate_code).await? else {
            return Ok(PresentationResult::rejected(MSG_NOT_FOUND, None));
        };

        if certificate.is_expired_at(now) {
            return Ok(PresentationResult::rejected(MSG_EXPIRED, Some(certificate)));
        }

        Ok(PresentationResult {
            valid: true,
            message: MSG_VALID,
            certificate: Some(certificate),
        })
    }

    /// Token check followed by the presentation lookup.
    ///
    /// A bad token is rejected before the store is consulted, so the response
    /// does not reveal whether the code exists.
    pub async fn verify_and_validate(
        &self,
        certificate_code: &str,
        presented_token: &str,
    ) -> Result<PresentationResult, StoreError> {
        if !self.verify(certificate_code, presented_token) {
            tracing::debug!(code = %certificate_code, "Rejected certificate token");
            return Ok(PresentationResult::rejected(MSG_INVALID_TOKEN, None));
        }
        self.validate_for_presentation(certificate_code).await
    }
}
