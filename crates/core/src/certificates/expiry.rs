//! Certificate validity resolution and expiry arithmetic.
//!
//! Resolution order is fixed: course override, then the deployment-wide
//! default, then "never expires".

use chrono::Months;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Deployment default when neither the course nor configuration says otherwise.
pub const DEFAULT_CERTIFICATE_VALIDITY_YEARS: u32 = 2;

/// Largest validity a course may configure.
pub const MAX_CERTIFICATE_VALIDITY_YEARS: i32 = 100;

/// Validate a course-level validity override.
///
/// `None` defers to the global default, `Some(0)` marks the course as
/// non-expiring, and positive values are a number of years.
pub fn validate_validity_years(years: Option<i32>) -> Result<(), CoreError> {
    match years {
        Some(y) if !(0..=MAX_CERTIFICATE_VALIDITY_YEARS).contains(&y) => {
            Err(CoreError::Validation(format!(
                "certificate_validity_years must be between 0 and \
                 {MAX_CERTIFICATE_VALIDITY_YEARS}, got {y}"
            )))
        }
        _ => Ok(()),
    }
}

/// Resolve the number of years a newly issued certificate stays valid.
///
/// Returns `None` for a non-expiring certificate.
pub fn resolve_validity_years(
    course_override: Option<i32>,
    global_default: Option<u32>,
) -> Option<u32> {
    match course_override {
        Some(years) if years > 0 => u32::try_from(years).ok(),
        Some(_) => None,
        None => global_default.filter(|years| *years > 0),
    }
}

/// `issued_at + years` in calendar years; `None` when `years` is `None`.
///
/// February 29 clamps to February 28 in non-leap target years.
pub fn compute_expires_at(issued_at: Timestamp, years: Option<u32>) -> Option<Timestamp> {
    let years = years?;
    issued_at.checked_add_months(Months::new(years.saturating_mul(12)))
}
