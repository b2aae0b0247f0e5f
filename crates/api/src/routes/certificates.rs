//! Route definitions for the `/certificates` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::certificates;
use crate::state::AppState;

/// Routes mounted at `/certificates`.
///
/// ```text
/// POST   /                  -> issue
/// GET    /{id}              -> get_by_id
/// DELETE /{id}              -> delete
/// POST   /{id}/download     -> record_download
/// PATCH  /{id}/metadata     -> update_metadata
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(certificates::issue))
        .route(
            "/{id}",
            get(certificates::get_by_id).delete(certificates::delete),
        )
        .route("/{id}/download", post(certificates::record_download))
        .route("/{id}/metadata", patch(certificates::update_metadata))
}
