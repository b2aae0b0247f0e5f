//! In-memory store used by the unit tests of the progress and certificate
//! services.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::certificates::{Certificate, CoursePolicy, NewCertificate};
use crate::store::{CertificateStore, ProgressStore, StoreError};
use crate::types::DbId;

#[derive(Default)]
struct State {
    next_id: DbId,
    courses: HashMap<DbId, CoursePolicy>,
    /// lesson id -> course id
    lessons: HashMap<DbId, DbId>,
    /// (user id, lesson id) pairs marked completed
    completed: HashSet<(DbId, DbId)>,
    enrollments: Vec<(DbId, DbId)>,
    certificates: Vec<Certificate>,
    fail_next_insert: Option<StoreError>,
    codes_reported_taken: usize,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared, cloneable in-memory implementation of both store traits.
///
/// Enforces the same uniqueness rules as the database: one certificate per
/// (user, course) and unique certificate codes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_course(&self, certificate_available: bool, validity_years: Option<i32>) -> DbId {
        let mut state = self.lock();
        let course_id = state.next_id();
        state.courses.insert(
            course_id,
            CoursePolicy {
                course_id,
                certificate_available,
                certificate_validity_years: validity_years,
            },
        );
        course_id
    }

    pub fn set_certificate_available(&self, course_id: DbId, available: bool) {
        if let Some(policy) = self.lock().courses.get_mut(&course_id) {
            policy.certificate_available = available;
        }
    }

    pub fn add_lessons(&self, course_id: DbId, count: usize) -> Vec<DbId> {
        let mut state = self.lock();
        (0..count)
            .map(|_| {
                let lesson_id = state.next_id();
                state.lessons.insert(lesson_id, course_id);
                lesson_id
            })
            .collect()
    }

    pub fn complete_lesson(&self, user_id: DbId, lesson_id: DbId) {
        self.lock().completed.insert((user_id, lesson_id));
    }

    pub fn enroll(&self, user_id: DbId, course_id: DbId) {
        let mut state = self.lock();
        if !state.enrollments.contains(&(user_id, course_id)) {
            state.enrollments.push((user_id, course_id));
        }
    }

    pub fn certificate_count(&self) -> usize {
        self.lock().certificates.len()
    }

    /// Make the next `insert_certificate` call fail with `err`.
    pub fn fail_next_insert(&self, err: StoreError) {
        self.lock().fail_next_insert = Some(err);
    }

    /// Report the next `n` code lookups as already taken.
    pub fn report_code_taken(&self, n: usize) {
        self.lock().codes_reported_taken = n;
    }
}

impl ProgressStore for MemoryStore {
    async fn count_lessons(&self, course_id: DbId) -> Result<i64, StoreError> {
        let state = self.lock();
        Ok(state.lessons.values().filter(|c| **c == course_id).count() as i64)
    }

    async fn count_completed_lessons(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<i64, StoreError> {
        let state = self.lock();
        let count = state
            .completed
            .iter()
            .filter(|(u, lesson)| *u == user_id && state.lessons.get(lesson) == Some(&course_id))
            .count();
        Ok(count as i64)
    }
}

impl CertificateStore for MemoryStore {
    async fn find_course_policy(&self, course_id: DbId) -> Result<Option<CoursePolicy>, StoreError> {
        Ok(self.lock().courses.get(&course_id).copied())
    }

    async fn find_certificate_for(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Certificate>, StoreError> {
        Ok(self
            .lock()
            .certificates
            .iter()
            .find(|c| c.user_id == user_id && c.course_id == course_id)
            .cloned())
    }

    async fn find_certificate_by_code(&self, code: &str) -> Result<Option<Certificate>, StoreError> {
        Ok(self
            .lock()
            .certificates
            .iter()
            .find(|c| c.certificate_code == code)
            .cloned())
    }

    async fn certificate_code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if state.codes_reported_taken > 0 {
            state.codes_reported_taken -= 1;
            return Ok(true);
        }
        Ok(state.certificates.iter().any(|c| c.certificate_code == code))
    }

    async fn insert_certificate(&self, new: NewCertificate) -> Result<Certificate, StoreError> {
        let mut state = self.lock();
        if let Some(err) = state.fail_next_insert.take() {
            return Err(err);
        }
        if state
            .certificates
            .iter()
            .any(|c| c.user_id == new.user_id && c.course_id == new.course_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_certificates_user_course".into(),
            });
        }
        if state
            .certificates
            .iter()
            .any(|c| c.certificate_code == new.certificate_code)
        {
            return Err(StoreError::UniqueViolation {
                constraint: "uq_certificates_code".into(),
            });
        }

        let certificate = Certificate {
            id: state.next_id(),
            user_id: new.user_id,
            course_id: new.course_id,
            certificate_code: new.certificate_code,
            verification_token: new.verification_token,
            issued_at: new.issued_at,
            expires_at: new.expires_at,
            download_count: 0,
            metadata: new.metadata,
        };
        state.certificates.push(certificate.clone());
        Ok(certificate)
    }

    async fn list_enrolled_user_ids(&self, course_id: DbId) -> Result<Vec<DbId>, StoreError> {
        Ok(self
            .lock()
            .enrollments
            .iter()
            .filter(|(_, c)| *c == course_id)
            .map(|(u, _)| *u)
            .collect())
    }
}
