//! Public certificate verification.
//!
//! Responses never include the verification token, so a code alone cannot
//! be turned into a verification link. The holder (user and course ids) is
//! only disclosed to callers presenting a valid token.

use axum::extract::{Path, State};
use axum::Json;
use coursehub_core::certificates::{Certificate, PresentationResult};
use coursehub_core::types::{DbId, Timestamp};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// The parts of a certificate shown to third parties.
#[derive(Debug, Serialize)]
pub struct PublicCertificate {
    pub certificate_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_id: Option<DbId>,
    pub issued_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

impl PublicCertificate {
    fn new(c: Certificate, with_holder: bool) -> Self {
        Self {
            certificate_code: c.certificate_code,
            user_id: with_holder.then_some(c.user_id),
            course_id: with_holder.then_some(c.course_id),
            issued_at: c.issued_at,
            expires_at: c.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResponse {
    pub valid: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<PublicCertificate>,
}

impl VerificationResponse {
    fn new(result: PresentationResult, with_holder: bool) -> Self {
        Self {
            valid: result.valid,
            message: result.message,
            certificate: result
                .certificate
                .map(|c| PublicCertificate::new(c, with_holder)),
        }
    }
}

/// GET /certificates/verify/{code}
///
/// Status and dates only; the holder is omitted without a token.
pub async fn by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<DataResponse<VerificationResponse>>> {
    let result = state.verifier.validate_for_presentation(&code).await?;
    Ok(Json(DataResponse {
        data: VerificationResponse::new(result, false),
    }))
}

/// GET /certificates/verify/{code}/{token}
pub async fn by_code_and_token(
    State(state): State<AppState>,
    Path((code, token)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<VerificationResponse>>> {
    let result = state.verifier.verify_and_validate(&code, &token).await?;
    tracing::debug!(code = %code, valid = result.valid, "Certificate verification");
    Ok(Json(DataResponse {
        data: VerificationResponse::new(result, true),
    }))
}
