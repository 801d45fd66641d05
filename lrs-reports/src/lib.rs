//! lrs-reports library - lecture report service
//!
//! Resolves supervisory scopes over the program → course → class hierarchy,
//! accepts lecture reports with their class context, reconciles student
//! ratings and lecturer feedback, and serves aggregated views over HTTP.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod aggregation;
pub mod api;
pub mod catalog;
pub mod coerce;
pub mod context;
pub mod db;
pub mod hierarchy;
pub mod listings;
pub mod monitoring;
pub mod ratings;
pub mod submission;

#[cfg(test)]
mod test_support;

use context::ClassContextResolver;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Class context strategies used on report submission
    pub resolver: Arc<ClassContextResolver>,
}

impl AppState {
    /// State with the default context strategy chain
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            resolver: Arc::new(ClassContextResolver::default()),
        }
    }
}

/// Build application router
///
/// `/health` is public; every `/api` route extracts the forwarded principal
/// and answers 401 without it.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    let reports = Router::new()
        .route(
            "/api/reports",
            get(api::reports::list_reports).post(api::reports::submit_report),
        )
        .route("/api/reports/lecturer/:id", get(api::reports::lecturer_reports))
        .route("/api/reports/student/:id", get(api::reports::student_reports))
        .route("/api/reports/student/:id/ratings", get(api::ratings::student_ratings))
        .route("/api/reports/pl/:id", get(api::reports::pl_reports))
        .route("/api/reports/pl/:id/stats", get(api::stats::pl_weekly_stats))
        .route("/api/reports/pl/:id/program-stats", get(api::stats::pl_program_stats))
        .route("/api/reports/prl/:id", get(api::reports::prl_reports))
        .route("/api/reports/prl/:id/stats", get(api::stats::prl_weekly_stats))
        .route("/api/reports/:id/rate", post(api::ratings::rate_report))
        .route("/api/reports/:id/ratings", get(api::ratings::report_ratings))
        .route("/api/reports/:id/feedback", post(api::ratings::submit_feedback));

    let monitoring = Router::new()
        .route("/api/students/:id/stats", get(api::stats::student_weekly_stats))
        .route("/api/lecturer/:id/stats", get(api::stats::lecturer_weekly_stats))
        .route("/api/lecturer/:id/monitoring", get(api::stats::lecturer_monitoring))
        .route("/api/monitoring/prl/:id", get(api::stats::prl_monitoring))
        .route("/api/classes/prl/:id", get(api::stats::prl_classes))
        .route("/api/courses/prl/:id", get(api::stats::prl_courses));

    let catalog = Router::new()
        .route("/api/users", post(api::catalog::create_user))
        .route("/api/programs", post(api::catalog::create_program))
        .route(
            "/api/streams",
            get(api::catalog::list_streams).post(api::catalog::create_stream),
        )
        .route(
            "/api/courses",
            get(api::catalog::list_courses).post(api::catalog::create_course),
        )
        .route(
            "/api/courses/:id",
            put(api::catalog::update_course).delete(api::catalog::delete_course),
        )
        .route("/api/courses/lecturers", get(api::catalog::list_lecturers))
        .route(
            "/api/classes",
            get(api::catalog::list_classes).post(api::catalog::create_class),
        )
        .route("/api/classes/:id", put(api::catalog::update_class))
        .route("/api/classes/lecturers", get(api::catalog::list_lecturers))
        .route("/api/prl/:id/stream", put(api::catalog::assign_prl_stream))
        .route("/api/classes/:id/lecturer", put(api::catalog::assign_class_lecturer))
        .route("/api/classes/:id/course", put(api::catalog::assign_class_course))
        .route("/api/courses/:id/lecturer", put(api::catalog::assign_course_lecturer));

    Router::new()
        .merge(reports)
        .merge(monitoring)
        .merge(catalog)
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
