//! Route definitions for the `/lessons` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::progress;
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// PUT    /{id}/progress    -> record
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/progress", put(progress::record))
}
