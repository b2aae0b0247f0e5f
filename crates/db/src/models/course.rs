//! Course entity model and DTOs.

use coursehub_core::certificates::CoursePolicy;
use coursehub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A course row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub instructor_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub certificate_available: bool,
    /// `None` defers to the deployment default, `Some(0)` never expires.
    pub certificate_validity_years: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    /// The fields certificate issuance reads.
    pub fn policy(&self) -> CoursePolicy {
        CoursePolicy {
            course_id: self.id,
            certificate_available: self.certificate_available,
            certificate_validity_years: self.certificate_validity_years,
        }
    }
}

/// DTO for creating a new course.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourse {
    pub instructor_id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to `false` if omitted.
    pub certificate_available: Option<bool>,
    pub certificate_validity_years: Option<i32>,
}

/// DTO for updating an existing course. All fields are optional.
///
/// `certificate_validity_years` distinguishes an absent key (keep) from an
/// explicit `null` (clear the override and fall back to the deployment
/// default).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourse {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub certificate_available: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub certificate_validity_years: Option<Option<i32>>,
}

/// Wrap any present value, `null` included, in `Some`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
