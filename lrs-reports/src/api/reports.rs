//! Report listing and submission endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use lrs_common::db::Report;
use lrs_common::Role;

use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath};
use super::principal::AuthPrincipal;
use crate::hierarchy;
use crate::listings::{self, ReportWithLecturer, StudentReportView};
use crate::submission::{self, ReportPayload, SubmissionReceipt};
use crate::AppState;

/// GET /api/reports
pub async fn list_reports(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
) -> ApiResult<Json<Vec<Report>>> {
    Ok(Json(listings::all_reports(&state.db).await?))
}

/// POST /api/reports
///
/// The submitting lecturer defaults to the caller; a payload naming another
/// lecturer is rejected.
pub async fn submit_report(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(mut payload): ApiJson<ReportPayload>,
) -> ApiResult<(StatusCode, Json<SubmissionReceipt>)> {
    principal.require_role(Role::Lecturer)?;

    match payload.lecturer_id {
        None => payload.lecturer_id = Some(principal.id),
        Some(id) if id != principal.id => {
            return Err(ApiError::Forbidden(format!(
                "lecturer {} may not submit for {}",
                principal.id, id
            )));
        }
        Some(_) => {}
    }

    let receipt = submission::submit_report(&state.db, &state.resolver, &payload).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/reports/lecturer/:id
pub async fn lecturer_reports(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(lecturer_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ReportWithLecturer>>> {
    principal.require_self(Role::Lecturer, lecturer_id)?;
    Ok(Json(listings::reports_by_lecturer(&state.db, lecturer_id).await?))
}

/// GET /api/reports/student/:id
pub async fn student_reports(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(student_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<StudentReportView>>> {
    principal.require_self(Role::Student, student_id)?;
    Ok(Json(listings::reports_for_student(&state.db, student_id).await?))
}

/// GET /api/reports/pl/:id
pub async fn pl_reports(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    ApiPath(pl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Report>>> {
    let supervisor = principal.supervisor(Role::Pl, pl_id)?;
    Ok(Json(hierarchy::scope_reports(&state.db, supervisor).await?))
}

/// GET /api/reports/prl/:id
pub async fn prl_reports(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Report>>> {
    let supervisor = principal.supervisor(Role::Prl, prl_id)?;
    Ok(Json(hierarchy::scope_reports(&state.db, supervisor).await?))
}
