//! Repository for the `enrollments` table.

use coursehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::Enrollment;

const COLUMNS: &str = "id, user_id, course_id, enrolled_at";

/// Provides operations for course enrollments.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll `user_id` in `course_id`.
    ///
    /// Idempotent: enrolling twice returns the existing row.
    pub async fn enroll(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let insert = format!(
            "INSERT INTO enrollments (user_id, course_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_enrollments_user_course DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Enrollment>(&insert)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await?;
        if let Some(enrollment) = inserted {
            return Ok(enrollment);
        }

        let select =
            format!("SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2");
        sqlx::query_as::<_, Enrollment>(&select)
            .bind(user_id)
            .bind(course_id)
            .fetch_one(pool)
            .await
    }

    /// Ids of every user enrolled in a course, oldest enrollment first.
    pub async fn list_user_ids_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT user_id FROM enrollments WHERE course_id = $1 ORDER BY enrolled_at, id",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn is_enrolled(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = $1 AND course_id = $2)",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }
}
