//! Public certificate verification routes.

use axum::routing::get;
use axum::Router;
use coursehub_core::certificates::VERIFY_PATH_PREFIX;

use crate::handlers::verification;
use crate::state::AppState;

/// Mount verification routes at the root (NOT under `/api/v1`).
///
/// ```text
/// GET    /certificates/verify/{code}            -> by_code
/// GET    /certificates/verify/{code}/{token}    -> by_code_and_token
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            &format!("{VERIFY_PATH_PREFIX}/{{code}}"),
            get(verification::by_code),
        )
        .route(
            &format!("{VERIFY_PATH_PREFIX}/{{code}}/{{token}}"),
            get(verification::by_code_and_token),
        )
}
