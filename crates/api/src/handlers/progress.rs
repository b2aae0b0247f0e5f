//! Handlers for lesson progress and course completion.

use axum::extract::{Path, State};
use axum::Json;
use coursehub_core::error::CoreError;
use coursehub_core::progress::ProgressSummary;
use coursehub_core::types::{DbId, Metadata};
use coursehub_db::models::lesson_progress::{LessonProgress, UpsertLessonProgress};
use coursehub_db::repositories::{LessonProgressRepo, LessonRepo};
use serde::Serialize;

use super::courses::find_course;
use super::users::find_user;
use crate::error::{AppError, AppResult};
use crate::response::{CertificateResponse, DataResponse};
use crate::state::AppState;

/// A user's progress through one course.
#[derive(Debug, Serialize)]
pub struct CourseProgressResponse {
    pub user_id: DbId,
    pub course_id: DbId,
    #[serde(flatten)]
    pub summary: ProgressSummary,
    pub lessons: Vec<LessonProgress>,
}

/// Result of recording progress on one lesson.
#[derive(Debug, Serialize)]
pub struct LessonProgressResponse {
    pub progress: LessonProgress,
    /// Set when this update completed the course and a certificate was issued.
    pub certificate: Option<CertificateResponse>,
}

/// GET /api/v1/courses/{id}/progress/{user_id}
pub async fn course_summary(
    State(state): State<AppState>,
    Path((course_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<CourseProgressResponse>>> {
    find_course(&state.pool, course_id).await?;

    let summary = state.issuer.progress().summary(user_id, course_id).await?;
    let lessons = LessonProgressRepo::list_for_user_course(&state.pool, user_id, course_id).await?;

    Ok(Json(DataResponse {
        data: CourseProgressResponse {
            user_id,
            course_id,
            summary,
            lessons,
        },
    }))
}

/// PUT /api/v1/lessons/{id}/progress
///
/// With auto-issue enabled, completing the last lesson of a course issues
/// the certificate in the same request. An issuance failure is logged and
/// does not undo the progress write.
pub async fn record(
    State(state): State<AppState>,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<UpsertLessonProgress>,
) -> AppResult<Json<DataResponse<LessonProgressResponse>>> {
    let lesson = LessonRepo::find_by_id(&state.pool, lesson_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id: lesson_id,
        }))?;
    find_user(&state.pool, input.user_id).await?;

    let progress =
        LessonProgressRepo::upsert(&state.pool, input.user_id, lesson_id, input.completed).await?;
    tracing::debug!(
        user_id = input.user_id,
        lesson_id,
        completed = input.completed,
        "Lesson progress recorded",
    );

    let mut certificate = None;
    if input.completed && state.config.certificates.auto_issue {
        match state
            .issuer
            .issue(input.user_id, lesson.course_id, Metadata::new())
            .await
        {
            Ok(issued) => {
                certificate =
                    issued.map(|c| CertificateResponse::new(c, state.public_base_url()));
            }
            Err(err) => {
                tracing::warn!(
                    user_id = input.user_id,
                    course_id = lesson.course_id,
                    error = %err,
                    "Automatic certificate issuance failed",
                );
            }
        }
    }

    Ok(Json(DataResponse {
        data: LessonProgressResponse {
            progress,
            certificate,
        },
    }))
}
