//! Enrollment entity model and DTOs.

use coursehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub course_id: DbId,
    pub enrolled_at: Timestamp,
}

/// DTO for enrolling a user in the course named by the route.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEnrollment {
    pub user_id: DbId,
}
