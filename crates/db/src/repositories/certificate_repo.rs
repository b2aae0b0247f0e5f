//! Repository for the `certificates` table.
//!
//! Certificates are written once by issuance; afterwards only
//! `download_count` and `metadata` change.

use coursehub_core::certificates::{Certificate, NewCertificate};
use coursehub_core::types::{DbId, Metadata};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::certificate::CertificateRow;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

const COLUMNS: &str = "\
    id, user_id, course_id, certificate_code, verification_token, issued_at, \
    expires_at, download_count, metadata, created_at, updated_at";

/// Provides persistence for issued certificates.
pub struct CertificateRepo;

impl CertificateRepo {
    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a certificate produced by issuance.
    ///
    /// Fails with `uq_certificates_user_course` or `uq_certificates_code`
    /// when the pair or the code is already taken.
    pub async fn create(pool: &PgPool, new: &NewCertificate) -> Result<Certificate, sqlx::Error> {
        let query = format!(
            "INSERT INTO certificates
                (user_id, course_id, certificate_code, verification_token, issued_at,
                 expires_at, metadata)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(new.user_id)
            .bind(new.course_id)
            .bind(&new.certificate_code)
            .bind(&new.verification_token)
            .bind(new.issued_at)
            .bind(new.expires_at)
            .bind(Json(&new.metadata))
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Increment `download_count` by one and return the updated row.
    ///
    /// With `max_downloads` set, the increment only happens while the count
    /// is below the cap. Returns `None` if the row is missing or capped.
    pub async fn record_download(
        pool: &PgPool,
        id: DbId,
        max_downloads: Option<i32>,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!(
            "UPDATE certificates SET
                download_count = download_count + 1,
                updated_at = NOW()
             WHERE id = $1 AND ($2::INTEGER IS NULL OR download_count < $2)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(id)
            .bind(max_downloads)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Shallow-merge `patch` into the stored metadata object.
    pub async fn merge_metadata(
        pool: &PgPool,
        id: DbId,
        patch: &Metadata,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!(
            "UPDATE certificates SET
                metadata = metadata || $2,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(id)
            .bind(Json(patch))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Delete a certificate by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM certificates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM certificates WHERE id = $1");
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn find_by_user_and_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM certificates WHERE user_id = $1 AND course_id = $2");
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn find_by_code(
        pool: &PgPool,
        certificate_code: &str,
    ) -> Result<Option<Certificate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM certificates WHERE certificate_code = $1");
        let row = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(certificate_code)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Into::into))
    }

    pub async fn code_exists(pool: &PgPool, certificate_code: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM certificates WHERE certificate_code = $1)")
                .bind(certificate_code)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Certificates of a course, most recently issued first.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Certificate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM certificates WHERE course_id = $1 ORDER BY issued_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Certificates held by a user, most recently issued first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Certificate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM certificates WHERE user_id = $1 ORDER BY issued_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, CertificateRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
