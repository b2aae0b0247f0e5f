//! PostgreSQL implementation of the `coursehub_core` persistence traits.

use coursehub_core::certificates::{Certificate, CoursePolicy, NewCertificate};
use coursehub_core::store::{CertificateStore, ProgressStore, StoreError};
use coursehub_core::types::DbId;

use crate::repositories::{
    CertificateRepo, CourseRepo, EnrollmentRepo, LessonProgressRepo, LessonRepo,
};
use crate::DbPool;

/// SQLSTATE reported by PostgreSQL for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Store backed by the shared connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// Unique violations keep the constraint name so callers can tell the
/// (user, course) race from a code collision.
pub fn classify_store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return StoreError::UniqueViolation {
                constraint: db_err.constraint().unwrap_or("unknown").to_string(),
            };
        }
    }
    StoreError::Backend(err.to_string())
}

impl ProgressStore for PgStore {
    async fn count_lessons(&self, course_id: DbId) -> Result<i64, StoreError> {
        LessonRepo::count_by_course(&self.pool, course_id)
            .await
            .map_err(classify_store_error)
    }

    async fn count_completed_lessons(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, StoreError> {
        LessonProgressRepo::count_completed_for_course(&self.pool, user_id, course_id)
            .await
            .map_err(classify_store_error)
    }
}

impl CertificateStore for PgStore {
    async fn find_course_policy(&self, course_id: DbId) -> Result<Option<CoursePolicy>, StoreError> {
        let course = CourseRepo::find_by_id(&self.pool, course_id)
            .await
            .map_err(classify_store_error)?;
        Ok(course.map(|c| c.policy()))
    }

    async fn find_certificate_for(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Certificate>, StoreError> {
        CertificateRepo::find_by_user_and_course(&self.pool, user_id, course_id)
            .await
            .map_err(classify_store_error)
    }

    async fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>, StoreError> {
        CertificateRepo::find_by_code(&self.pool, code)
            .await
            .map_err(classify_store_error)
    }

    async fn certificate_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        CertificateRepo::code_exists(&self.pool, code)
            .await
            .map_err(classify_store_error)
    }

    async fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate, StoreError> {
        CertificateRepo::create(&self.pool, &new)
            .await
            .map_err(classify_store_error)
    }

    async fn list_enrolled_user_ids(&self, course_id: DbId) -> Result<Vec<DbId>, StoreError> {
        EnrollmentRepo::list_user_ids_by_course(&self.pool, course_id)
            .await
            .map_err(classify_store_error)
    }
}
