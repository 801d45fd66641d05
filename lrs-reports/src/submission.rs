//! Report submission
//!
//! Validates a lecturer's report, resolves its class context, stores an
//! immutable snapshot and links the class roster to it.
//!
//! Submissions are append-only events: the same payload submitted twice
//! creates two reports. The roster link is best-effort; once the report row
//! is committed a roster failure is logged and the submission still
//! succeeds.

use chrono::{DateTime, Utc};
use lrs_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::coerce;
use crate::context::{ClassContext, ClassContextResolver, ContextHints};

/// Report form as submitted by a lecturer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportPayload {
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub lecturer_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub week_of_reporting: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub date_of_lecture: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub topic_taught: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub learning_outcomes: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub recommendations: Option<String>,
    #[serde(default)]
    pub students_present: Value,
    #[serde(default)]
    pub total_registered: Value,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub scheduled_time: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub feedback: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub faculty_name: Option<String>,
}

impl ReportPayload {
    pub fn hints(&self) -> ContextHints {
        ContextHints {
            class_name: self.class_name.clone(),
            course_code: self.course_code.clone(),
            course_name: self.course_name.clone(),
            faculty_name: self.faculty_name.clone(),
        }
    }

    /// Check the required fields without touching the store
    pub fn validate(&self) -> Result<RequiredFields> {
        match (
            self.lecturer_id,
            &self.week_of_reporting,
            &self.date_of_lecture,
            &self.topic_taught,
        ) {
            (Some(lecturer_id), Some(week), Some(date), Some(topic)) => Ok(RequiredFields {
                lecturer_id,
                week_of_reporting: week.clone(),
                date_of_lecture: date.clone(),
                topic_taught: topic.clone(),
            }),
            _ => {
                let missing: Vec<&str> = [
                    ("lecturer_id", self.lecturer_id.is_none()),
                    ("week_of_reporting", self.week_of_reporting.is_none()),
                    ("date_of_lecture", self.date_of_lecture.is_none()),
                    ("topic_taught", self.topic_taught.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(Error::InvalidInput(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Fields a report cannot be stored without
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    pub lecturer_id: i64,
    pub week_of_reporting: String,
    pub date_of_lecture: String,
    pub topic_taught: String,
}

/// Report contents frozen at submission time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
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

/// First non-blank of the resolved value and the payload value
fn prefer(resolved: &str, fallback: &Option<String>) -> String {
    if resolved.trim().is_empty() {
        fallback.clone().unwrap_or_default()
    } else {
        resolved.to_string()
    }
}

impl ReportSnapshot {
    /// Combine the validated payload with its resolved context
    ///
    /// Context names win; a blank context field falls back to the payload.
    /// Venue and time come from the form first, then from the class.
    pub fn capture(
        required: RequiredFields,
        payload: &ReportPayload,
        context: &ClassContext,
        created_at: DateTime<Utc>,
    ) -> Self {
        let from_form = |form: &Option<String>, class: &str| {
            form.clone().unwrap_or_else(|| class.to_string())
        };

        Self {
            lecturer_id: required.lecturer_id,
            class_id: context.class_id,
            week_of_reporting: required.week_of_reporting,
            date_of_lecture: required.date_of_lecture,
            topic_taught: required.topic_taught,
            learning_outcomes: payload.learning_outcomes.clone().unwrap_or_default(),
            recommendations: payload.recommendations.clone().unwrap_or_default(),
            students_present: coerce::count(&payload.students_present),
            total_registered: coerce::count(&payload.total_registered),
            feedback: payload.feedback.clone(),
            faculty_name: prefer(&context.faculty_name, &payload.faculty_name),
            class_name: prefer(&context.class_name, &payload.class_name),
            course_name: prefer(&context.course_name, &payload.course_name),
            course_code: prefer(&context.course_code, &payload.course_code),
            venue: from_form(&payload.venue, &context.venue),
            scheduled_time: from_form(&payload.scheduled_time, &context.scheduled_time),
            created_at,
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub id: i64,
    pub class_id: Option<i64>,
    /// Students linked to the report; 0 when the roster link failed
    pub roster_size: u64,
}

/// Store a snapshot, returning the new report id
pub async fn insert_report(pool: &SqlitePool, snapshot: &ReportSnapshot) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO reports (
            lecturer_id, class_id, week_of_reporting, date_of_lecture, topic_taught,
            learning_outcomes, recommendations, students_present, total_registered, feedback,
            faculty_name, class_name, course_name, course_code, venue, scheduled_time, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(snapshot.lecturer_id)
    .bind(snapshot.class_id)
    .bind(&snapshot.week_of_reporting)
    .bind(&snapshot.date_of_lecture)
    .bind(&snapshot.topic_taught)
    .bind(&snapshot.learning_outcomes)
    .bind(&snapshot.recommendations)
    .bind(snapshot.students_present)
    .bind(snapshot.total_registered)
    .bind(&snapshot.feedback)
    .bind(&snapshot.faculty_name)
    .bind(&snapshot.class_name)
    .bind(&snapshot.course_name)
    .bind(&snapshot.course_code)
    .bind(&snapshot.venue)
    .bind(&snapshot.scheduled_time)
    .bind(snapshot.created_at)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Link every current student of `class_id` to the report
///
/// The roster is read and written in one statement, so it reflects class
/// membership at this instant. Existing pairs are left untouched.
pub async fn link_roster(pool: &SqlitePool, report_id: i64, class_id: i64) -> Result<u64> {
    let linked = sqlx::query(
        r#"
        INSERT OR IGNORE INTO student_reports (student_id, report_id)
        SELECT id, ? FROM users WHERE role = 'student' AND class_id = ?
        "#,
    )
    .bind(report_id)
    .bind(class_id)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(linked)
}

/// Validate, resolve, store and fan out a report
pub async fn submit_report(
    pool: &SqlitePool,
    resolver: &ClassContextResolver,
    payload: &ReportPayload,
) -> Result<SubmissionReceipt> {
    let required = payload.validate()?;
    let lecturer_id = required.lecturer_id;

    let resolved = resolver.resolve(pool, lecturer_id, &payload.hints()).await?;
    let snapshot = ReportSnapshot::capture(required, payload, &resolved.context, Utc::now());

    let id = insert_report(pool, &snapshot).await?;

    let roster_size = match snapshot.class_id {
        Some(class_id) => match link_roster(pool, id, class_id).await {
            Ok(linked) => linked,
            Err(e) => {
                warn!(
                    "Report {} stored but roster link for class {} failed: {}",
                    id, class_id, e
                );
                0
            }
        },
        None => 0,
    };

    info!(
        "Lecturer {} submitted report {} (class {:?}, {} student(s) linked, via {})",
        lecturer_id, id, snapshot.class_id, roster_size, resolved.strategy
    );

    Ok(SubmissionReceipt {
        id,
        class_id: snapshot.class_id,
        roster_size,
    })
}
