pub mod certificates;
pub mod courses;
pub mod health;
pub mod lessons;
pub mod users;
pub mod verification;

use axum::Router;

use crate::state::AppState;

/// Routes served at the root rather than under `/api/v1`.
///
/// ```text
/// /health                                          liveness + DB check
/// /certificates/verify/{code}                      public status lookup
/// /certificates/verify/{code}/{token}              token-checked lookup
/// ```
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(verification::router())
}

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                                           list, create
/// /users/{id}                                      get
/// /users/{id}/certificates                         certificates held
///
/// /courses                                         list, create
/// /courses/{id}                                    get, update
/// /courses/{id}/lessons                            list, create
/// /courses/{id}/enrollments                        enroll (POST)
/// /courses/{id}/progress/{user_id}                 progress summary
/// /courses/{id}/certificates                       list issued
/// /courses/{id}/certificates/issue-eligible        bulk issuance (POST)
///
/// /lessons/{id}/progress                           record progress (PUT)
///
/// /certificates                                    issue (POST)
/// /certificates/{id}                               get, delete
/// /certificates/{id}/download                      count a download (POST)
/// /certificates/{id}/metadata                      merge metadata (PATCH)
/// ```
///
/// Public verification lives at the root under `/certificates/verify`, see
/// [`verification::router`].
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/courses", courses::router())
        .nest("/lessons", lessons::router())
        .nest("/certificates", certificates::router())
}
