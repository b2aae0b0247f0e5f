//! Persistence seams consumed by the progress and certificate services.
//!
//! The `core` crate has no database dependency. The services are written
//! against these traits; `coursehub_db::PgStore` implements them over
//! PostgreSQL and the unit tests implement them in memory.

use std::future::Future;

use crate::certificates::{Certificate, CoursePolicy, NewCertificate};
use crate::types::DbId;

/// Errors reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a concurrent issuance).
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Any other backend failure (connection, query, decoding).
    #[error("Persistence error: {0}")]
    Backend(String),
}

/// Read access to lessons and lesson progress.
pub trait ProgressStore: Send + Sync {
    /// Number of lessons belonging to `course_id`.
    fn count_lessons(
        &self,
        course_id: DbId,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Number of `completed = true` progress rows of `user_id` whose lesson
    /// belongs to `course_id`.
    fn count_completed_lessons(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;
}

/// Read/write access to certificates and the course fields issuance needs.
pub trait CertificateStore: Send + Sync {
    /// Certificate settings of a course, or `None` if the course does not exist.
    fn find_course_policy(
        &self,
        course_id: DbId,
    ) -> impl Future<Output = Result<Option<CoursePolicy>, StoreError>> + Send;

    fn find_certificate_for(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> impl Future<Output = Result<Option<Certificate>, StoreError>> + Send;

    fn find_certificate_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Certificate>, StoreError>> + Send;

    fn certificate_code_exists(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert a new certificate row.
    ///
    /// Must fail with [`StoreError::UniqueViolation`] when either the code or
    /// the (user, course) pair is already taken.
    fn insert_certificate(
        &self,
        new: NewCertificate,
    ) -> impl Future<Output = Result<Certificate, StoreError>> + Send;

    /// Ids of every user enrolled in `course_id`.
    fn list_enrolled_user_ids(
        &self,
        course_id: DbId,
    ) -> impl Future<Output = Result<Vec<DbId>, StoreError>> + Send;
}
