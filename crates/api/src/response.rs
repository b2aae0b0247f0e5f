//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `serde_json::json!({ "data": ... })`.

use coursehub_core::certificates::Certificate;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A certificate together with its absolute public verification URL.
#[derive(Debug, Serialize)]
pub struct CertificateResponse {
    #[serde(flatten)]
    pub certificate: Certificate,
    pub verification_url: String,
}

impl CertificateResponse {
    /// `base_url` is the public origin, with or without a trailing slash.
    pub fn new(certificate: Certificate, base_url: &str) -> Self {
        let verification_url = format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            certificate.verification_path()
        );
        Self {
            certificate,
            verification_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use coursehub_core::types::Metadata;

    use super::*;

    #[test]
    fn verification_url_joins_base_and_path() {
        let certificate = Certificate {
            id: 1,
            user_id: 1,
            course_id: 1,
            certificate_code: "CERT-20240110-AB12CD34".into(),
            verification_token: "0123456789abcdef".into(),
            issued_at: Utc::now(),
            expires_at: None,
            download_count: 0,
            metadata: Metadata::new(),
        };
        let response = CertificateResponse::new(certificate, "https://learn.example.com/");
        assert_eq!(
            response.verification_url,
            "https://learn.example.com/certificates/verify/CERT-20240110-AB12CD34/0123456789abcdef"
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["certificate_code"], "CERT-20240110-AB12CD34");
        assert_eq!(json["verification_url"], response.verification_url);
    }
}
