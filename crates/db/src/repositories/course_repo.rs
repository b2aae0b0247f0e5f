//! Repository for the `courses` table.

use coursehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, instructor_id, title, description, certificate_available, \
    certificate_validity_years, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses
                (instructor_id, title, description, certificate_available, certificate_validity_years)
             VALUES ($1, $2, $3, COALESCE($4, FALSE), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(input.instructor_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.certificate_available)
            .bind(input.certificate_validity_years)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all courses ordered by most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// Update a course. Only non-`None` fields in `input` are applied.
    ///
    /// `certificate_validity_years` uses `Option<Option<i32>>`: `Some(None)`
    /// writes NULL so the course falls back to the deployment default.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let validity_provided = input.certificate_validity_years.is_some();
        let validity_value = input.certificate_validity_years.flatten();

        let query = format!(
            "UPDATE courses SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                certificate_available = COALESCE($4, certificate_available),
                certificate_validity_years =
                    CASE WHEN $5 THEN $6 ELSE certificate_validity_years END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.certificate_available)
            .bind(validity_provided)
            .bind(validity_value)
            .fetch_optional(pool)
            .await
    }
}
