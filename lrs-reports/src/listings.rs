//! Read-only listings outside the supervisor scopes
//!
//! Reports are listed from their stored snapshot; only the lecturer name and
//! the caller's own rating are joined live.

use lrs_common::db::{Course, Report};
use lrs_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::REPORT_COLUMNS;
use crate::hierarchy;

/// Report with the name of the lecturer who filed it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ReportWithLecturer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub lecturer_name: String,
}

/// Report as seen by a student on its roster
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StudentReportView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub lecturer_name: Option<String>,
    /// The student's own rating, 0 when unrated
    pub rating: f64,
}

/// Class in a PRL's stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StreamClass {
    pub class_id: i64,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub lecturer_name: Option<String>,
    pub student_count: i64,
}

/// Every report, newest first
pub async fn all_reports(pool: &SqlitePool) -> Result<Vec<Report>> {
    let reports = sqlx::query_as::<_, Report>(&format!(
        "SELECT {} FROM reports r ORDER BY r.created_at DESC, r.id DESC",
        REPORT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// A lecturer's own reports by week
pub async fn reports_by_lecturer(
    pool: &SqlitePool,
    lecturer_id: i64,
) -> Result<Vec<ReportWithLecturer>> {
    let reports = sqlx::query_as::<_, ReportWithLecturer>(&format!(
        r#"
        SELECT {}, u.name AS lecturer_name
        FROM reports r
        JOIN users u ON u.id = r.lecturer_id
        WHERE r.lecturer_id = ?
        ORDER BY r.week_of_reporting ASC, r.id ASC
        "#,
        REPORT_COLUMNS
    ))
    .bind(lecturer_id)
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// Reports on a student's roster by week, with the student's rating
pub async fn reports_for_student(
    pool: &SqlitePool,
    student_id: i64,
) -> Result<Vec<StudentReportView>> {
    let reports = sqlx::query_as::<_, StudentReportView>(&format!(
        r#"
        SELECT {}, u.name AS lecturer_name, COALESCE(rt.rating, 0.0) AS rating
        FROM student_reports sr
        JOIN reports r ON r.id = sr.report_id
        LEFT JOIN users u ON u.id = r.lecturer_id
        LEFT JOIN ratings rt ON rt.report_id = r.id AND rt.student_id = sr.student_id
        WHERE sr.student_id = ?
        ORDER BY r.week_of_reporting ASC, r.id ASC
        "#,
        REPORT_COLUMNS
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// Classes in the PRL's stream by name, with live student counts
pub async fn prl_classes(pool: &SqlitePool, prl_id: i64) -> Result<Vec<StreamClass>> {
    let Some(stream_id) = hierarchy::stream_for_prl(pool, prl_id).await? else {
        return Ok(Vec::new());
    };

    let classes = sqlx::query_as::<_, StreamClass>(
        r#"
        SELECT
            c.id AS class_id,
            c.class_name,
            co.course_name,
            co.course_code,
            u.name AS lecturer_name,
            (SELECT COUNT(*) FROM users s WHERE s.class_id = c.id AND s.role = 'student') AS student_count
        FROM classes c
        JOIN courses co ON co.id = c.course_id
        LEFT JOIN users u ON u.id = c.lecturer_id
        WHERE c.stream_id = ?
        ORDER BY c.class_name ASC, c.id ASC
        "#,
    )
    .bind(stream_id)
    .fetch_all(pool)
    .await?;

    Ok(classes)
}

/// Courses tagged with the PRL's stream
pub async fn prl_courses(pool: &SqlitePool, prl_id: i64) -> Result<Vec<Course>> {
    match hierarchy::stream_for_prl(pool, prl_id).await? {
        Some(stream_id) => hierarchy::courses_for_stream(pool, stream_id).await,
        None => Ok(Vec::new()),
    }
}
