//! Idempotent certificate issuance.
//!
//! Preconditions are checked in a fixed order and the first failing one ends
//! the attempt without an error:
//!
//! 1. no certificate exists yet for the (user, course) pair;
//! 2. the course exists and offers certificates;
//! 3. the user has completed every lesson of the course.
//!
//! The database constraint on (user, course) backs the first check. A unique
//! violation on insert is reported like any other non-issuance.

use std::fmt;

use chrono::Utc;

use super::code::{generate_certificate_code, MAX_CODE_ATTEMPTS};
use super::expiry::{compute_expires_at, resolve_validity_years};
use super::token::VerificationSigner;
use super::{Certificate, CoursePolicy, NewCertificate};
use crate::progress::ProgressTracker;
use crate::store::{CertificateStore, ProgressStore, StoreError};
use crate::types::{DbId, Metadata, Timestamp};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of the eligibility checks for one (user, course) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(CoursePolicy),
    AlreadyIssued,
    CourseNotFound,
    CertificatesDisabled,
    Incomplete { completed: i64, total: i64 },
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible(_) => write!(f, "Eligible for a certificate"),
            Self::AlreadyIssued => write!(
                f,
                "A certificate has already been issued for this user and course"
            ),
            Self::CourseNotFound => write!(f, "Course not found"),
            Self::CertificatesDisabled => write!(f, "Course does not offer certificates"),
            Self::Incomplete { completed, total } => write!(
                f,
                "Course not completed: {completed} of {total} lessons completed"
            ),
        }
    }
}

/// Why an eligible issuance still did not produce a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueFailure {
    /// Every generated code collided with an existing one.
    CodeCollision,
    /// The insert was rejected (unique-constraint race or backend failure).
    Store(StoreError),
}

impl fmt::Display for IssueFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeCollision => write!(
                f,
                "Could not generate a unique certificate code after {MAX_CODE_ATTEMPTS} attempts"
            ),
            Self::Store(err) => write!(f, "Certificate could not be stored: {err}"),
        }
    }
}

/// Detailed result of an issuance attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    Issued(Certificate),
    NotEligible(Eligibility),
    Failed(IssueFailure),
}

impl IssueOutcome {
    pub fn into_certificate(self) -> Option<Certificate> {
        match self {
            Self::Issued(certificate) => Some(certificate),
            Self::NotEligible(_) | Self::Failed(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Issuer
// ---------------------------------------------------------------------------

/// Issues certificates at most once per (user, course).
///
/// `Err` is only returned when a read against the store fails; every
/// expected non-issuance is `Ok(None)` / a non-`Issued` outcome.
#[derive(Debug, Clone)]
pub struct CertificateIssuer<S> {
    store: S,
    progress: ProgressTracker<S>,
    signer: VerificationSigner,
    default_validity_years: Option<u32>,
}

impl<S> CertificateIssuer<S>
where
    S: CertificateStore + ProgressStore + Clone,
{
    /// `default_validity_years` applies to courses without their own
    /// override; `None` makes such certificates non-expiring.
    pub fn new(store: S, signer: VerificationSigner, default_validity_years: Option<u32>) -> Self {
        Self {
            progress: ProgressTracker::new(store.clone()),
            store,
            signer,
            default_validity_years,
        }
    }

    pub fn progress(&self) -> &ProgressTracker<S> {
        &self.progress
    }

    pub fn signer(&self) -> &VerificationSigner {
        &self.signer
    }

    /// Run the ordered precondition checks without writing anything.
    pub async fn check_eligibility(
        &self,
        user_id: DbId,
        course_id: DbId,
    ) -> Result<Eligibility, StoreError> {
        if self
            .store
            .find_certificate_for(user_id, course_id)
            .await?
            .is_some()
        {
            return Ok(Eligibility::AlreadyIssued);
        }

        let Some(policy) = self.store.find_course_policy(course_id).await? else {
            return Ok(Eligibility::CourseNotFound);
        };
        if !policy.certificate_available {
            return Ok(Eligibility::CertificatesDisabled);
        }

        let summary = self.progress.summary(user_id, course_id).await?;
        if !summary.is_complete {
            return Ok(Eligibility::Incomplete {
                completed: summary.completed_lessons,
                total: summary.total_lessons,
            });
        }

        Ok(Eligibility::Eligible(policy))
    }

    /// Issue a certificate if every precondition holds.
    pub async fn issue(
        &self,
        user_id: DbId,
        course_id: DbId,
        metadata: Metadata,
    ) -> Result<Option<Certificate>, StoreError> {
        self.issue_at(user_id, course_id, metadata, Utc::now()).await
    }

    /// [`issue`](Self::issue) with an explicit issuance instant.
    pub async fn issue_at(
        &self,
        user_id: DbId,
        course_id: DbId,
        metadata: Metadata,
        now: Timestamp,
    ) -> Result<Option<Certificate>, StoreError> {
        Ok(self
            .issue_with_outcome(user_id, course_id, metadata, now)
            .await?
            .into_certificate())
    }

    /// Issue a certificate and report why not when nothing was issued.
    pub async fn issue_with_outcome(
        &self,
        user_id: DbId,
        course_id: DbId,
        metadata: Metadata,
        now: Timestamp,
    ) -> Result<IssueOutcome, StoreError> {
        let policy = match self.check_eligibility(user_id, course_id).await? {
            Eligibility::Eligible(policy) => policy,
            other => {
                tracing::debug!(user_id, course_id, reason = %other, "Certificate not issued");
                return Ok(IssueOutcome::NotEligible(other));
            }
        };

        let Some(certificate_code) = self.generate_unique_code(now).await? else {
            tracing::warn!(
                user_id,
                course_id,
                attempts = MAX_CODE_ATTEMPTS,
                "Certificate code generation exhausted its attempts",
            );
            return Ok(IssueOutcome::Failed(IssueFailure::CodeCollision));
        };

        let validity_years =
            resolve_validity_years(policy.certificate_validity_years, self.default_validity_years);
        let new = NewCertificate {
            user_id,
            course_id,
            verification_token: self.signer.compute_token(&certificate_code),
            certificate_code,
            issued_at: now,
            expires_at: compute_expires_at(now, validity_years),
            metadata,
        };

        match self.store.insert_certificate(new).await {
            Ok(certificate) => {
                tracing::info!(
                    certificate_id = certificate.id,
                    user_id,
                    course_id,
                    code = %certificate.certificate_code,
                    "Certificate issued",
                );
                Ok(IssueOutcome::Issued(certificate))
            }
            Err(err @ StoreError::UniqueViolation { .. }) => {
                tracing::warn!(user_id, course_id, error = %err, "Concurrent certificate issuance");
                Ok(IssueOutcome::Failed(IssueFailure::Store(err)))
            }
            Err(err) => {
                tracing::error!(user_id, course_id, error = %err, "Certificate insert failed");
                Ok(IssueOutcome::Failed(IssueFailure::Store(err)))
            }
        }
    }

    /// Issue certificates to every enrolled user who has become eligible.
    ///
    /// Returns the number of certificates issued by this call. A failure for
    /// one user is logged and the loop moves on.
    pub async fn issue_certificates_to_eligible_students(
        &self,
        course_id: DbId,
    ) -> Result<usize, StoreError> {
        self.issue_certificates_to_eligible_students_at(course_id, Utc::now())
            .await
    }

    pub async fn issue_certificates_to_eligible_students_at(
        &self,
        course_id: DbId,
        now: Timestamp,
    ) -> Result<usize, StoreError> {
        match self.store.find_course_policy(course_id).await? {
            Some(policy) if policy.certificate_available => {}
            _ => {
                tracing::debug!(course_id, "Course does not offer certificates, nothing to issue");
                return Ok(0);
            }
        }

        let user_ids = self.store.list_enrolled_user_ids(course_id).await?;
        let mut issued = 0;
        for user_id in user_ids {
            match self
                .issue_with_outcome(user_id, course_id, Metadata::new(), now)
                .await
            {
                Ok(IssueOutcome::Issued(_)) => issued += 1,
                Ok(IssueOutcome::NotEligible(_)) => {}
                Ok(IssueOutcome::Failed(failure)) => {
                    tracing::warn!(user_id, course_id, %failure, "Skipping user in bulk issuance");
                }
                Err(err) => {
                    tracing::warn!(user_id, course_id, error = %err, "Skipping user in bulk issuance");
                }
            }
        }

        tracing::info!(course_id, issued, "Bulk certificate issuance finished");
        Ok(issued)
    }

    /// Draw codes until one is not yet stored, up to [`MAX_CODE_ATTEMPTS`].
    async fn generate_unique_code(&self, now: Timestamp) -> Result<Option<String>, StoreError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_certificate_code(now.date_naive());
            if !self.store.certificate_code_exists(&code).await? {
                return Ok(Some(code));
            }
            tracing::debug!(code = %code, "Certificate code collision, regenerating");
        }
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::certificates::code::is_well_formed;
    use crate::certificates::expiry::DEFAULT_CERTIFICATE_VALIDITY_YEARS;
    use crate::testing::MemoryStore;

    const SECRET: &str = "issuer-test-secret";

    fn issuer(store: &MemoryStore) -> CertificateIssuer<MemoryStore> {
        CertificateIssuer::new(
            store.clone(),
            VerificationSigner::new(SECRET),
            Some(DEFAULT_CERTIFICATE_VALIDITY_YEARS),
        )
    }

    fn jan_10_2024() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    /// Course with `lessons` lessons, all completed by `user_id`.
    fn completed_course(
        store: &MemoryStore,
        user_id: DbId,
        lessons: usize,
        validity_years: Option<i32>,
    ) -> DbId {
        let course = store.add_course(true, validity_years);
        for lesson in store.add_lessons(course, lessons) {
            store.complete_lesson(user_id, lesson);
        }
        store.enroll(user_id, course);
        course
    }

    // -- Concrete scenario -------------------------------------------------

    #[tokio::test]
    async fn three_lesson_course_scenario() {
        let store = MemoryStore::new();
        let course = store.add_course(true, Some(1));
        let lessons = store.add_lessons(course, 3);
        let user = 1;
        store.enroll(user, course);
        let issuer = issuer(&store);

        store.complete_lesson(user, lessons[0]);
        store.complete_lesson(user, lessons[1]);
        let none = issuer
            .issue_at(user, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap();
        assert!(none.is_none());

        store.complete_lesson(user, lessons[2]);
        let cert = issuer
            .issue_at(user, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap()
            .expect("certificate after final lesson");
        assert!(is_well_formed(&cert.certificate_code));
        assert!(cert.certificate_code.starts_with("CERT-20240110-"));
        assert_eq!(cert.issued_at, jan_10_2024());
        assert_eq!(
            cert.expires_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap())
        );

        let again = issuer
            .issue_at(user, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(store.certificate_count(), 1);
    }

    // -- Preconditions -----------------------------------------------------

    #[tokio::test]
    async fn issuing_twice_is_idempotent() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 2, None);
        let issuer = issuer(&store);

        assert!(issuer.issue(1, course, Metadata::new()).await.unwrap().is_some());
        assert!(issuer.issue(1, course, Metadata::new()).await.unwrap().is_none());
        assert_eq!(store.certificate_count(), 1);
    }

    #[tokio::test]
    async fn disabled_course_is_not_eligible() {
        let store = MemoryStore::new();
        let course = store.add_course(false, None);
        for lesson in store.add_lessons(course, 2) {
            store.complete_lesson(1, lesson);
        }

        let outcome = issuer(&store)
            .issue_with_outcome(1, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap();
        assert_matches!(
            outcome,
            IssueOutcome::NotEligible(Eligibility::CertificatesDisabled)
        );
    }

    #[tokio::test]
    async fn unknown_course_is_not_eligible() {
        let store = MemoryStore::new();
        let eligibility = issuer(&store).check_eligibility(1, 404).await.unwrap();
        assert_eq!(eligibility, Eligibility::CourseNotFound);
    }

    #[tokio::test]
    async fn zero_lesson_course_never_issues() {
        let store = MemoryStore::new();
        let course = store.add_course(true, None);

        let eligibility = issuer(&store).check_eligibility(1, course).await.unwrap();
        assert_eq!(
            eligibility,
            Eligibility::Incomplete {
                completed: 0,
                total: 0
            }
        );
    }

    #[tokio::test]
    async fn existing_certificate_is_checked_first() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        let issuer = issuer(&store);
        issuer.issue(1, course, Metadata::new()).await.unwrap();

        // Even after the course stops offering certificates, the first
        // failing check is the existing certificate.
        store.set_certificate_available(course, false);
        let eligibility = issuer.check_eligibility(1, course).await.unwrap();
        assert_eq!(eligibility, Eligibility::AlreadyIssued);
    }

    // -- Expiry resolution -------------------------------------------------

    #[tokio::test]
    async fn missing_course_validity_uses_default() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);

        let cert = issuer(&store)
            .issue_at(1, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            cert.expires_at,
            Some(Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap())
        );
    }

    #[tokio::test]
    async fn zero_course_validity_never_expires() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, Some(0));

        let cert = issuer(&store)
            .issue(1, course, Metadata::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cert.expires_at, None);
    }

    #[tokio::test]
    async fn no_global_default_never_expires() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        let issuer = CertificateIssuer::new(store.clone(), VerificationSigner::new(SECRET), None);

        let cert = issuer.issue(1, course, Metadata::new()).await.unwrap().unwrap();
        assert_eq!(cert.expires_at, None);
    }

    // -- Token and metadata ------------------------------------------------

    #[tokio::test]
    async fn issued_token_is_derived_from_code() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        let issuer = issuer(&store);

        let cert = issuer.issue(1, course, Metadata::new()).await.unwrap().unwrap();
        let signer = VerificationSigner::new(SECRET);
        assert_eq!(
            cert.verification_token,
            signer.compute_token(&cert.certificate_code)
        );
        assert!(!cert.verification_path().contains(SECRET));
    }

    #[tokio::test]
    async fn metadata_is_stored_with_certificate() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        let mut metadata = Metadata::new();
        metadata.insert("grade".into(), serde_json::json!("A"));

        let cert = issuer(&store)
            .issue(1, course, metadata.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cert.metadata, metadata);
    }

    // -- Failure handling --------------------------------------------------

    #[tokio::test]
    async fn unique_violation_on_insert_returns_none() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        store.fail_next_insert(StoreError::UniqueViolation {
            constraint: "uq_certificates_user_course".into(),
        });

        let outcome = issuer(&store)
            .issue_with_outcome(1, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap();
        assert_matches!(
            outcome,
            IssueOutcome::Failed(IssueFailure::Store(StoreError::UniqueViolation { .. }))
        );
        assert_eq!(store.certificate_count(), 0);
    }

    #[tokio::test]
    async fn backend_failure_on_insert_returns_none() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        store.fail_next_insert(StoreError::Backend("connection reset".into()));

        let cert = issuer(&store).issue(1, course, Metadata::new()).await.unwrap();
        assert!(cert.is_none());
    }

    #[tokio::test]
    async fn code_collisions_are_retried() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        store.report_code_taken(MAX_CODE_ATTEMPTS - 1);

        let cert = issuer(&store).issue(1, course, Metadata::new()).await.unwrap();
        assert!(cert.is_some());
    }

    #[tokio::test]
    async fn exhausted_code_attempts_fail_issuance() {
        let store = MemoryStore::new();
        let course = completed_course(&store, 1, 1, None);
        store.report_code_taken(MAX_CODE_ATTEMPTS);

        let outcome = issuer(&store)
            .issue_with_outcome(1, course, Metadata::new(), jan_10_2024())
            .await
            .unwrap();
        assert_matches!(outcome, IssueOutcome::Failed(IssueFailure::CodeCollision));
        assert_eq!(store.certificate_count(), 0);
    }

    // -- Bulk issuance -----------------------------------------------------

    #[tokio::test]
    async fn bulk_issues_only_to_completed_students() {
        let store = MemoryStore::new();
        let course = store.add_course(true, Some(1));
        let lessons = store.add_lessons(course, 2);
        for user in [1, 2, 3] {
            store.enroll(user, course);
        }
        for lesson in &lessons {
            store.complete_lesson(1, *lesson);
            store.complete_lesson(3, *lesson);
        }
        store.complete_lesson(2, lessons[0]);

        let issuer = issuer(&store);
        assert_eq!(
            issuer
                .issue_certificates_to_eligible_students(course)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            issuer
                .issue_certificates_to_eligible_students(course)
                .await
                .unwrap(),
            0
        );
        assert_eq!(store.certificate_count(), 2);
    }

    #[tokio::test]
    async fn bulk_continues_past_individual_failures() {
        let store = MemoryStore::new();
        let course = store.add_course(true, None);
        let lessons = store.add_lessons(course, 1);
        for user in [1, 2] {
            store.enroll(user, course);
            store.complete_lesson(user, lessons[0]);
        }
        store.fail_next_insert(StoreError::UniqueViolation {
            constraint: "uq_certificates_user_course".into(),
        });

        let issued = issuer(&store)
            .issue_certificates_to_eligible_students(course)
            .await
            .unwrap();
        assert_eq!(issued, 1);
    }

    #[tokio::test]
    async fn bulk_on_disabled_course_issues_nothing() {
        let store = MemoryStore::new();
        let course = store.add_course(false, None);
        let lessons = store.add_lessons(course, 1);
        store.enroll(1, course);
        store.complete_lesson(1, lessons[0]);

        let issued = issuer(&store)
            .issue_certificates_to_eligible_students(course)
            .await
            .unwrap();
        assert_eq!(issued, 0);
    }
}
