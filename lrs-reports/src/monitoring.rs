//! Supervisor and lecturer monitoring views

use chrono::{DateTime, Utc};
use lrs_common::Result;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::db::push_id_list;
use crate::hierarchy::{self, Supervisor};

/// Activity of one lecturer inside a PRL's scope
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LecturerActivity {
    pub lecturer_id: i64,
    pub lecturer_name: String,
    pub total_reports: i64,
    /// Mean of all ratings on the counted reports, one decimal
    pub avg_rating: Option<f64>,
    pub last_submission: Option<DateTime<Utc>>,
}

/// One of a lecturer's reports with its audience and reception
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReportActivity {
    pub report_id: i64,
    pub week_of_reporting: String,
    pub date_of_lecture: String,
    pub topic_taught: String,
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub students_count: i64,
    pub avg_rating: f64,
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Lecturers teaching in the PRL's stream, busiest first
///
/// Only reports filed against classes in the stream are counted.
pub async fn prl_overview(pool: &SqlitePool, prl_id: i64) -> Result<Vec<LecturerActivity>> {
    let scope = hierarchy::resolve_scope(pool, Supervisor::PrincipalLecturer(prl_id)).await?;
    let lecturer_ids = hierarchy::lecturers_for_classes(pool, &scope.class_ids).await?;
    if lecturer_ids.is_empty() {
        debug!("PRL {} has no lecturers in scope", prl_id);
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT
            u.id AS lecturer_id,
            u.name AS lecturer_name,
            COUNT(DISTINCT r.id) AS total_reports,
            AVG(rt.rating) AS avg_rating,
            MAX(r.created_at) AS last_submission
        FROM users u
        LEFT JOIN reports r ON r.lecturer_id = u.id AND r.class_id IN "#,
    );
    push_id_list(&mut builder, &scope.class_ids);
    builder.push(" LEFT JOIN ratings rt ON rt.report_id = r.id WHERE u.id IN ");
    push_id_list(&mut builder, &lecturer_ids);
    builder.push(" GROUP BY u.id, u.name ORDER BY total_reports DESC, u.name ASC, u.id ASC");

    let mut rows = builder
        .build_query_as::<LecturerActivity>()
        .fetch_all(pool)
        .await?;

    for row in &mut rows {
        row.avg_rating = row.avg_rating.map(one_decimal);
    }

    Ok(rows)
}

/// Every report of a lecturer with roster size and mean rating (0 when unrated)
pub async fn lecturer_report_activity(
    pool: &SqlitePool,
    lecturer_id: i64,
) -> Result<Vec<ReportActivity>> {
    let rows = sqlx::query_as::<_, ReportActivity>(
        r#"
        SELECT
            r.id AS report_id,
            r.week_of_reporting,
            r.date_of_lecture,
            r.topic_taught,
            r.faculty_name,
            r.class_name,
            r.course_name,
            (SELECT COUNT(*) FROM student_reports sr WHERE sr.report_id = r.id) AS students_count,
            COALESCE((SELECT AVG(rt.rating) FROM ratings rt WHERE rt.report_id = r.id), 0.0) AS avg_rating
        FROM reports r
        WHERE r.lecturer_id = ?
        ORDER BY r.week_of_reporting ASC, r.id ASC
        "#,
    )
    .bind(lecturer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
