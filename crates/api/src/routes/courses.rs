//! Route definitions for the `/courses` resource.
//!
//! Also nests lesson, enrollment, progress and certificate routes under
//! `/courses/{id}/...`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{certificates, courses, progress};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /                                    -> list
/// POST   /                                    -> create
/// GET    /{id}                                -> get_by_id
/// PUT    /{id}                                -> update
/// GET    /{id}/lessons                        -> list_lessons
/// POST   /{id}/lessons                        -> create_lesson
/// POST   /{id}/enrollments                    -> enroll
/// GET    /{id}/progress/{user_id}             -> progress::course_summary
/// GET    /{id}/certificates                   -> certificates::list_by_course
/// POST   /{id}/certificates/issue-eligible    -> certificates::issue_eligible
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(courses::list).post(courses::create))
        .route("/{id}", get(courses::get_by_id).put(courses::update))
        .route(
            "/{id}/lessons",
            get(courses::list_lessons).post(courses::create_lesson),
        )
        .route("/{id}/enrollments", post(courses::enroll))
        .route("/{id}/progress/{user_id}", get(progress::course_summary))
        .route("/{id}/certificates", get(certificates::list_by_course))
        .route(
            "/{id}/certificates/issue-eligible",
            post(certificates::issue_eligible),
        )
}
