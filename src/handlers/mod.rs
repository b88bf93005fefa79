// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no session) → Protected (valid session, company-scoped) → Elevated (admin session)
pub mod public;    // Tier 1: No session required (/, /health, /auth/*)
pub mod protected; // Tier 2: Session required (/api/*)
pub mod elevated;  // Tier 3: Admin session required (/api/admin/*)

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};

use crate::error::ApiError;

/// Unwrap a JSON body, turning extractor rejections into the API error envelope
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// Unwrap query parameters, turning extractor rejections into the API error envelope
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}
