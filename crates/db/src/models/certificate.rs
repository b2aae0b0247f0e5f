//! Certificate row model and DTOs.
//!
//! Rows are converted into [`coursehub_core::certificates::Certificate`]
//! before leaving the repository, so callers only see the domain type.

use coursehub_core::certificates::Certificate;
use coursehub_core::types::{DbId, Metadata, Timestamp};
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `certificates` table.
#[derive(Debug, Clone, FromRow)]
pub struct CertificateRow {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub certificate_code: String,
    pub verification_token: String,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub download_count: i32,
    pub metadata: Json<Metadata>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CertificateRow> for Certificate {
    fn from(row: CertificateRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            course_id: row.course_id,
            certificate_code: row.certificate_code,
            verification_token: row.verification_token,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            download_count: row.download_count,
            metadata: row.metadata.0,
        }
    }
}

/// DTO for requesting issuance of a certificate.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCertificate {
    pub user_id: DbId,
    pub course_id: DbId,
    #[serde(default)]
    pub metadata: Metadata,
}

/// DTO for merging keys into a certificate's metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCertificateMetadata {
    pub metadata: Metadata,
}
