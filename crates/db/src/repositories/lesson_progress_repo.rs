//! Repository for the `lesson_progress` table.

use coursehub_core::types::DbId;
use sqlx::PgPool;

use crate::models::lesson_progress::LessonProgress;

const COLUMNS: &str = "id, user_id, lesson_id, completed, completed_at, created_at, updated_at";

const JOINED_COLUMNS: &str = "lp.id, lp.user_id, lp.lesson_id, lp.completed, lp.completed_at, \
    lp.created_at, lp.updated_at";

/// Provides progress reads and the single progress write.
pub struct LessonProgressRepo;

impl LessonProgressRepo {
    /// Record whether `user_id` has completed `lesson_id`.
    ///
    /// One row per (user, lesson). `completed_at` is stamped on the first
    /// transition to completed, kept on repeats, and cleared on un-completion.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
        completed: bool,
    ) -> Result<LessonProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO lesson_progress (user_id, lesson_id, completed, completed_at)
             VALUES ($1, $2, $3, CASE WHEN $3 THEN NOW() END)
             ON CONFLICT ON CONSTRAINT uq_lesson_progress_user_lesson DO UPDATE SET
                completed = EXCLUDED.completed,
                completed_at = CASE
                    WHEN NOT EXCLUDED.completed THEN NULL
                    ELSE COALESCE(lesson_progress.completed_at, NOW())
                END,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .bind(completed)
            .fetch_one(pool)
            .await
    }

    /// Completed lessons of `user_id` that belong to `course_id`.
    pub async fn count_completed_for_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM lesson_progress lp
             JOIN lessons l ON l.id = lp.lesson_id
             WHERE lp.user_id = $1 AND l.course_id = $2 AND lp.completed",
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Every progress row of `user_id` in `course_id`, in lesson order.
    pub async fn list_for_user_course(
        pool: &PgPool,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Vec<LessonProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM lesson_progress lp
             JOIN lessons l ON l.id = lp.lesson_id
             WHERE lp.user_id = $1 AND l.course_id = $2
             ORDER BY l.position"
        );
        sqlx::query_as::<_, LessonProgress>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }
}
