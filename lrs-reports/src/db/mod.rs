//! Shared SQL fragments for the report service

use sqlx::{QueryBuilder, Sqlite};

/// Column list selecting a full [`lrs_common::db::Report`] from alias `r`
pub const REPORT_COLUMNS: &str = "r.id, r.lecturer_id, r.class_id, r.week_of_reporting, \
    r.date_of_lecture, r.topic_taught, r.learning_outcomes, r.recommendations, \
    r.students_present, r.total_registered, r.feedback, r.faculty_name, r.class_name, \
    r.course_name, r.course_code, r.venue, r.scheduled_time, r.created_at";

/// Append `(?, ?, ...)` binding every id
///
/// Callers short-circuit on empty lists before building the query.
pub fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
