//! Lesson-progress completion tracking.
//!
//! A course is complete for a user only when every one of its lessons has an
//! explicit `completed = true` progress record. A course without lessons is
//! never complete.

use serde::Serialize;

use crate::store::{ProgressStore, StoreError};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Pure arithmetic
// ---------------------------------------------------------------------------

/// `true` when `total > 0` and every lesson is completed.
pub fn is_complete(completed: i64, total: i64) -> bool {
    total > 0 && completed == total
}

/// Completed share of a course as a percentage in `0.0..=100.0`.
///
/// Returns `0.0` for a course without lessons.
pub fn percentage(completed: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// Snapshot of a user's progress through one course.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_lessons: i64,
    pub completed_lessons: i64,
    pub percentage: f64,
    pub is_complete: bool,
}

impl ProgressSummary {
    pub fn from_counts(completed_lessons: i64, total_lessons: i64) -> Self {
        Self {
            total_lessons,
            completed_lessons,
            percentage: percentage(completed_lessons, total_lessons),
            is_complete: is_complete(completed_lessons, total_lessons),
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Answers "has user U completed course C?" against a [`ProgressStore`].
///
/// All operations are reads. An unenrolled user or an unknown course simply
/// has zero counts.
#[derive(Debug, Clone)]
pub struct ProgressTracker<S> {
    store: S,
}

impl<S: ProgressStore> ProgressTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn count_total_lessons(&self, course_id: DbId) -> Result<i64, StoreError> {
        self.store.count_lessons(course_id).await
    }

    pub async fn count_completed_lessons(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, StoreError> {
        self.store.count_completed_lessons(user_id, course_id).await
    }

    pub async fn is_course_complete(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<bool, StoreError> {
        Ok(self.summary(user_id, course_id).await?.is_complete)
    }

    pub async fn completion_percentage(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<f64, StoreError> {
        Ok(self.summary(user_id, course_id).await?.percentage)
    }

    /// Counts, percentage and completion flag from a single pair of reads.
    pub async fn summary(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<ProgressSummary, StoreError> {
        let total = self.count_total_lessons(course_id).await?;
        if total == 0 {
            return Ok(ProgressSummary::from_counts(0, 0));
        }
        let completed = self.count_completed_lessons(user_id, course_id).await?;
        Ok(ProgressSummary::from_counts(completed, total))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
