//! Report counts over resolved scopes
//!
//! Program statistics are driven by ownership: every program the PL owns is
//! listed, with 0 when nothing is reachable. Weekly statistics are driven by
//! the data: only weeks with at least one report appear.

use lrs_common::Result;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::push_id_list;
use crate::hierarchy::{self, Supervisor};

/// Reports filed for one week of reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct WeeklyCount {
    pub week: String,
    pub count: i64,
}

/// Report total for one owned program
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramStat {
    pub program_id: i64,
    pub program_name: String,
    pub total_reports: i64,
}

/// Number of reports filed against the classes
pub async fn count_reports_for_classes(pool: &SqlitePool, class_ids: &[i64]) -> Result<i64> {
    if class_ids.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM reports WHERE class_id IN ");
    push_id_list(&mut builder, class_ids);

    let count = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// Weekly counts for reports filed against the classes
pub async fn weekly_counts_for_classes(
    pool: &SqlitePool,
    class_ids: &[i64],
) -> Result<Vec<WeeklyCount>> {
    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT week_of_reporting AS week, COUNT(*) AS count FROM reports WHERE class_id IN ",
    );
    push_id_list(&mut builder, class_ids);
    builder.push(" GROUP BY week_of_reporting ORDER BY week_of_reporting ASC");

    let counts = builder.build_query_as::<WeeklyCount>().fetch_all(pool).await?;
    Ok(counts)
}

/// Weekly counts across a supervisor's scope
pub async fn scope_weekly_counts(
    pool: &SqlitePool,
    supervisor: Supervisor,
) -> Result<Vec<WeeklyCount>> {
    let scope = hierarchy::resolve_scope(pool, supervisor).await?;
    weekly_counts_for_classes(pool, &scope.class_ids).await
}

/// Weekly counts of a lecturer's own reports
pub async fn lecturer_weekly_counts(pool: &SqlitePool, lecturer_id: i64) -> Result<Vec<WeeklyCount>> {
    let counts = sqlx::query_as::<_, WeeklyCount>(
        r#"
        SELECT week_of_reporting AS week, COUNT(*) AS count
        FROM reports
        WHERE lecturer_id = ?
        GROUP BY week_of_reporting
        ORDER BY week_of_reporting ASC
        "#,
    )
    .bind(lecturer_id)
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// Weekly counts of reports on a student's roster
pub async fn student_weekly_counts(pool: &SqlitePool, student_id: i64) -> Result<Vec<WeeklyCount>> {
    let counts = sqlx::query_as::<_, WeeklyCount>(
        r#"
        SELECT r.week_of_reporting AS week, COUNT(*) AS count
        FROM reports r
        JOIN student_reports sr ON sr.report_id = r.id
        WHERE sr.student_id = ?
        GROUP BY r.week_of_reporting
        ORDER BY r.week_of_reporting ASC
        "#,
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(counts)
}

/// One entry per program owned by the PL, zero-filled
pub async fn program_stats(pool: &SqlitePool, pl_id: i64) -> Result<Vec<ProgramStat>> {
    let breakdown = hierarchy::program_breakdown(pool, pl_id).await?;

    let mut stats = Vec::with_capacity(breakdown.len());
    for entry in breakdown {
        let total_reports = count_reports_for_classes(pool, &entry.scope.class_ids).await?;
        stats.push(ProgramStat {
            program_id: entry.program.id,
            program_name: entry.program.name,
            total_reports,
        });
    }

    Ok(stats)
}
