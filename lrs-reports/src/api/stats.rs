//! Statistics and monitoring endpoints

use axum::{extract::State, Json};
use lrs_common::db::Course;
use lrs_common::Role;

use super::error::ApiResult;
use super::extract::ApiPath;
use super::principal::AuthPrincipal;
use crate::aggregation::{self, ProgramStat, WeeklyCount};
use crate::listings::{self, StreamClass};
use crate::monitoring::{self, LecturerActivity, ReportActivity};
use crate::AppState;

/// GET /api/reports/pl/:id/stats
pub async fn pl_weekly_stats(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    ApiPath(pl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<WeeklyCount>>> {
    let supervisor = principal.supervisor(Role::Pl, pl_id)?;
    Ok(Json(aggregation::scope_weekly_counts(&state.db, supervisor).await?))
}

/// GET /api/reports/pl/:id/program-stats
pub async fn pl_program_stats(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(pl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ProgramStat>>> {
    principal.require_self(Role::Pl, pl_id)?;
    Ok(Json(aggregation::program_stats(&state.db, pl_id).await?))
}

/// GET /api/reports/prl/:id/stats
pub async fn prl_weekly_stats(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<WeeklyCount>>> {
    let supervisor = principal.supervisor(Role::Prl, prl_id)?;
    Ok(Json(aggregation::scope_weekly_counts(&state.db, supervisor).await?))
}

/// GET /api/students/:id/stats
pub async fn student_weekly_stats(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(student_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<WeeklyCount>>> {
    principal.require_self(Role::Student, student_id)?;
    Ok(Json(aggregation::student_weekly_counts(&state.db, student_id).await?))
}

/// GET /api/lecturer/:id/stats
pub async fn lecturer_weekly_stats(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(lecturer_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<WeeklyCount>>> {
    principal.require_self(Role::Lecturer, lecturer_id)?;
    Ok(Json(aggregation::lecturer_weekly_counts(&state.db, lecturer_id).await?))
}

/// GET /api/lecturer/:id/monitoring
pub async fn lecturer_monitoring(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(lecturer_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<ReportActivity>>> {
    principal.require_self(Role::Lecturer, lecturer_id)?;
    Ok(Json(monitoring::lecturer_report_activity(&state.db, lecturer_id).await?))
}

/// GET /api/monitoring/prl/:id
pub async fn prl_monitoring(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<LecturerActivity>>> {
    principal.require_self(Role::Prl, prl_id)?;
    Ok(Json(monitoring::prl_overview(&state.db, prl_id).await?))
}

/// GET /api/classes/prl/:id
pub async fn prl_classes(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<StreamClass>>> {
    principal.require_self(Role::Prl, prl_id)?;
    Ok(Json(listings::prl_classes(&state.db, prl_id).await?))
}

/// GET /api/courses/prl/:id
pub async fn prl_courses(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<Course>>> {
    principal.require_self(Role::Prl, prl_id)?;
    Ok(Json(listings::prl_courses(&state.db, prl_id).await?))
}
