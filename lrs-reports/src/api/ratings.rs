//! Rating and feedback endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use lrs_common::Role;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath};
use super::principal::AuthPrincipal;
use crate::coerce;
use crate::ratings::{self, RatingOutcome, RatingSummary};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub rating: Value,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub message: String,
    pub outcome: RatingOutcome,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /api/reports/:id/rate
///
/// 201 when the student rates the report for the first time, 200 on update.
pub async fn rate_report(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(report_id): ApiPath<i64>,
    ApiJson(request): ApiJson<RateRequest>,
) -> ApiResult<(StatusCode, Json<RateResponse>)> {
    principal.require_role(Role::Student)?;

    let rating = coerce::number(&request.rating);
    let outcome = ratings::rate_report(&state.db, principal.id, report_id, rating).await?;

    let (status, message) = match outcome {
        RatingOutcome::Created => (StatusCode::CREATED, "Rating submitted"),
        RatingOutcome::Updated => (StatusCode::OK, "Rating updated"),
    };

    Ok((
        status,
        Json(RateResponse {
            message: message.to_string(),
            outcome,
        }),
    ))
}

/// GET /api/reports/:id/ratings
pub async fn report_ratings(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
    ApiPath(report_id): ApiPath<i64>,
) -> ApiResult<Json<RatingSummary>> {
    Ok(Json(ratings::rating_summary(&state.db, report_id).await?))
}

/// GET /api/reports/student/:id/ratings
pub async fn student_ratings(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(student_id): ApiPath<i64>,
) -> ApiResult<Json<BTreeMap<i64, f64>>> {
    principal.require_self(Role::Student, student_id)?;
    Ok(Json(ratings::ratings_by_student(&state.db, student_id).await?))
}

/// POST /api/reports/:id/feedback
///
/// Lecturers annotate their own reports; PRLs annotate reports in their stream.
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(report_id): ApiPath<i64>,
    ApiJson(request): ApiJson<FeedbackRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let feedback = request.feedback.unwrap_or_default();

    match principal.role {
        Role::Lecturer => {
            ratings::submit_feedback(&state.db, report_id, principal.id, &feedback).await?
        }
        Role::Prl => {
            ratings::submit_supervisor_feedback(&state.db, report_id, principal.id, &feedback)
                .await?
        }
        other => {
            return Err(ApiError::Forbidden(format!(
                "role '{}' may not submit feedback",
                other
            )))
        }
    }

    Ok(Json(MessageResponse {
        message: "Feedback submitted".to_string(),
    }))
}
