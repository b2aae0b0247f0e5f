//! Handlers for the `/certificates` resource and the certificate listings
//! nested under courses and users.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use coursehub_core::certificates::issuer::IssueFailure;
use coursehub_core::certificates::{Certificate, Eligibility, IssueOutcome};
use coursehub_core::error::CoreError;
use coursehub_core::types::DbId;
use coursehub_db::models::certificate::{IssueCertificate, UpdateCertificateMetadata};
use coursehub_db::repositories::CertificateRepo;
use coursehub_db::DbPool;
use serde::Serialize;

use super::courses::find_course;
use super::users::find_user;
use crate::error::{AppError, AppResult};
use crate::response::{CertificateResponse, DataResponse};
use crate::state::AppState;

/// Result of a bulk issuance run.
#[derive(Debug, Serialize)]
pub struct BulkIssueResponse {
    pub course_id: DbId,
    pub issued: usize,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Certificate",
        id,
    })
}

async fn find_certificate(pool: &DbPool, id: DbId) -> AppResult<Certificate> {
    CertificateRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

fn respond(state: &AppState, certificate: Certificate) -> CertificateResponse {
    CertificateResponse::new(certificate, state.public_base_url())
}

fn respond_all(state: &AppState, certificates: Vec<Certificate>) -> Vec<CertificateResponse> {
    certificates
        .into_iter()
        .map(|c| respond(state, c))
        .collect()
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

/// POST /api/v1/certificates
///
/// 201 with the certificate, 404 for an unknown course, 409 with the reason
/// when the user is not eligible or lost an issuance race.
pub async fn issue(
    State(state): State<AppState>,
    Json(input): Json<IssueCertificate>,
) -> AppResult<(StatusCode, Json<DataResponse<CertificateResponse>>)> {
    let outcome = state
        .issuer
        .issue_with_outcome(input.user_id, input.course_id, input.metadata, Utc::now())
        .await?;

    match outcome {
        IssueOutcome::Issued(certificate) => Ok((
            StatusCode::CREATED,
            Json(DataResponse {
                data: respond(&state, certificate),
            }),
        )),
        IssueOutcome::NotEligible(Eligibility::CourseNotFound) => {
            Err(AppError::Core(CoreError::NotFound {
                entity: "Course",
                id: input.course_id,
            }))
        }
        IssueOutcome::NotEligible(reason) => {
            Err(AppError::Core(CoreError::Conflict(reason.to_string())))
        }
        IssueOutcome::Failed(IssueFailure::Store(err)) => Err(AppError::Store(err)),
        IssueOutcome::Failed(failure @ IssueFailure::CodeCollision) => {
            Err(AppError::InternalError(failure.to_string()))
        }
    }
}

/// POST /api/v1/courses/{id}/certificates/issue-eligible
pub async fn issue_eligible(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<BulkIssueResponse>>> {
    find_course(&state.pool, course_id).await?;

    let issued = state
        .issuer
        .issue_certificates_to_eligible_students(course_id)
        .await?;
    Ok(Json(DataResponse {
        data: BulkIssueResponse { course_id, issued },
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/certificates/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CertificateResponse>>> {
    let certificate = find_certificate(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: respond(&state, certificate),
    }))
}

/// GET /api/v1/courses/{id}/certificates
pub async fn list_by_course(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CertificateResponse>>>> {
    find_course(&state.pool, course_id).await?;
    let certificates = CertificateRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse {
        data: respond_all(&state, certificates),
    }))
}

/// GET /api/v1/users/{id}/certificates
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CertificateResponse>>>> {
    find_user(&state.pool, user_id).await?;
    let certificates = CertificateRepo::list_by_user(&state.pool, user_id).await?;
    Ok(Json(DataResponse {
        data: respond_all(&state, certificates),
    }))
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

/// POST /api/v1/certificates/{id}/download
///
/// Counts one download. Rejected with 409 once the configured cap is reached.
pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CertificateResponse>>> {
    find_certificate(&state.pool, id).await?;

    let max_downloads = state.config.certificates.max_downloads;
    match CertificateRepo::record_download(&state.pool, id, max_downloads).await? {
        Some(certificate) => {
            tracing::debug!(
                certificate_id = id,
                download_count = certificate.download_count,
                "Certificate download recorded",
            );
            Ok(Json(DataResponse {
                data: respond(&state, certificate),
            }))
        }
        None => match max_downloads {
            Some(max) => Err(AppError::Core(CoreError::Conflict(format!(
                "Download limit of {max} reached for certificate {id}"
            )))),
            // Deleted between the lookup and the update.
            None => Err(not_found(id)),
        },
    }
}

/// PATCH /api/v1/certificates/{id}/metadata
///
/// Shallow merge: keys in the body replace existing keys, others are kept.
pub async fn update_metadata(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCertificateMetadata>,
) -> AppResult<Json<DataResponse<CertificateResponse>>> {
    let certificate = CertificateRepo::merge_metadata(&state.pool, id, &input.metadata)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: respond(&state, certificate),
    }))
}

/// DELETE /api/v1/certificates/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if CertificateRepo::delete(&state.pool, id).await? {
        tracing::info!(certificate_id = id, "Certificate deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
