//! Handlers for courses and the lesson/enrollment resources nested under them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use coursehub_core::certificates::expiry::validate_validity_years;
use coursehub_core::error::CoreError;
use coursehub_core::types::DbId;
use coursehub_db::models::course::{Course, CreateCourse, UpdateCourse};
use coursehub_db::models::enrollment::{CreateEnrollment, Enrollment};
use coursehub_db::models::lesson::{CreateLesson, Lesson};
use coursehub_db::repositories::{CourseRepo, EnrollmentRepo, LessonRepo};
use coursehub_db::DbPool;
use validator::Validate;

use super::users::find_user;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a course or fail with 404.
pub(crate) async fn find_course(pool: &DbPool, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// POST /api/v1/courses
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<Course>>)> {
    input.validate()?;
    validate_validity_years(input.certificate_validity_years)?;
    find_user(&state.pool, input.instructor_id).await?;

    let course = CourseRepo::create(&state.pool, &input).await?;
    tracing::info!(course_id = course.id, instructor_id = course.instructor_id, "Course created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: course })))
}

/// GET /api/v1/courses
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: courses }))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Course>>> {
    let course = find_course(&state.pool, id).await?;
    Ok(Json(DataResponse { data: course }))
}

/// PUT /api/v1/courses/{id}
///
/// `"certificate_validity_years": null` clears the course override.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<Course>>> {
    input.validate()?;
    validate_validity_years(input.certificate_validity_years.flatten())?;
    let course = CourseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    Ok(Json(DataResponse { data: course }))
}

// ---------------------------------------------------------------------------
// Lessons
// ---------------------------------------------------------------------------

/// GET /api/v1/courses/{id}/lessons
pub async fn list_lessons(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    find_course(&state.pool, id).await?;
    let lessons = LessonRepo::list_by_course(&state.pool, id).await?;
    Ok(Json(DataResponse { data: lessons }))
}

/// POST /api/v1/courses/{id}/lessons
pub async fn create_lesson(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    input.validate()?;
    find_course(&state.pool, id).await?;

    let lesson = LessonRepo::create(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

/// POST /api/v1/courses/{id}/enrollments
///
/// Enrolling an already enrolled user returns the existing enrollment.
pub async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateEnrollment>,
) -> AppResult<(StatusCode, Json<DataResponse<Enrollment>>)> {
    find_course(&state.pool, id).await?;
    find_user(&state.pool, input.user_id).await?;

    let enrollment = EnrollmentRepo::enroll(&state.pool, input.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}
