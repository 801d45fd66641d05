//! Database models
//!
//! Row types for the organizational hierarchy (program → course → class) and
//! for stored reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::Role;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub class_id: Option<i64>,
}

/// Program owned by a Program Leader
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub pl_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Stream {
    pub id: i64,
    pub name: String,
}

/// Course row
///
/// `program_id` is the primary hierarchy edge. `assigned_to` and `stream_id`
/// are legacy edges consulted only when no course hangs off a program id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub course_name: String,
    pub course_code: String,
    pub faculty_name: String,
    pub program_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub stream_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: i64,
    pub class_name: String,
    pub venue: String,
    pub schedule_time: String,
    pub course_id: i64,
    pub lecturer_id: Option<i64>,
    pub stream_id: Option<i64>,
}

/// Stored lecture report
///
/// Class, course and faculty names are copied at submission time and are
/// never re-joined from the live catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: i64,
    pub lecturer_id: i64,
    pub class_id: Option<i64>,
    pub week_of_reporting: String,
    pub date_of_lecture: String,
    pub topic_taught: String,
    pub learning_outcomes: String,
    pub recommendations: String,
    pub students_present: i64,
    pub total_registered: i64,
    pub feedback: Option<String>,
    pub faculty_name: String,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub venue: String,
    pub scheduled_time: String,
    pub created_at: DateTime<Utc>,
}
