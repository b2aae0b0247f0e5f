//! Lesson progress model and DTOs.

use coursehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `lesson_progress` table.
///
/// `completed_at` is set the first time the lesson is completed and cleared
/// when it is marked incomplete again.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LessonProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub lesson_id: DbId,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a user's progress on the lesson named by the route.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertLessonProgress {
    pub user_id: DbId,
    pub completed: bool,
}
