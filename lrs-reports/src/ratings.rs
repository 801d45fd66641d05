//! Rating and feedback reconciliation
//!
//! A student holds at most one rating per report. Rating again overwrites
//! the value and timestamp in a single upsert, so concurrent writers for the
//! same pair are serialized by the store's uniqueness constraint and the last
//! write wins.
//!
//! Feedback writes are scoped in the UPDATE itself: a lecturer can only touch
//! their own reports, a Principal Lecturer only reports inside their stream.

use chrono::Utc;
use lrs_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Whether a rating was inserted or overwrote an earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingOutcome {
    Created,
    Updated,
}

/// Aggregate over all ratings of a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct RatingSummary {
    pub avg_rating: f64,
    pub total_ratings: i64,
}

const NOT_OWNED: &str = "Report not found or you are not authorized";

/// Insert or overwrite the student's rating of a report
pub async fn rate_report(
    pool: &SqlitePool,
    student_id: i64,
    report_id: i64,
    rating: f64,
) -> Result<RatingOutcome> {
    let revision: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO ratings (student_id, report_id, rating, revision, created_at)
        VALUES (?, ?, ?, 0, ?)
        ON CONFLICT(student_id, report_id) DO UPDATE SET
            rating = excluded.rating,
            created_at = excluded.created_at,
            revision = ratings.revision + 1
        RETURNING revision
        "#,
    )
    .bind(student_id)
    .bind(report_id)
    .bind(rating)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound(format!("report {} or student {}", report_id, student_id))
        }
        _ => Error::Database(e),
    })?;

    let outcome = if revision == 0 {
        RatingOutcome::Created
    } else {
        RatingOutcome::Updated
    };

    debug!(
        "Student {} rating of report {} {:?} ({})",
        student_id, report_id, outcome, rating
    );
    Ok(outcome)
}

/// Average and count of a report's ratings; `{0, 0}` when unrated
pub async fn rating_summary(pool: &SqlitePool, report_id: i64) -> Result<RatingSummary> {
    let summary = sqlx::query_as::<_, RatingSummary>(
        r#"
        SELECT COALESCE(AVG(rating), 0.0) AS avg_rating, COUNT(*) AS total_ratings
        FROM ratings
        WHERE report_id = ?
        "#,
    )
    .bind(report_id)
    .fetch_one(pool)
    .await?;

    Ok(summary)
}

/// The student's rating of each report they rated
pub async fn ratings_by_student(pool: &SqlitePool, student_id: i64) -> Result<BTreeMap<i64, f64>> {
    let rows = sqlx::query_as::<_, (i64, f64)>(
        "SELECT report_id, rating FROM ratings WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().collect())
}

fn feedback_text(feedback: &str) -> Result<&str> {
    let trimmed = feedback.trim();
    if trimmed.is_empty() {
        Err(Error::InvalidInput("Missing required fields: feedback".to_string()))
    } else {
        Ok(trimmed)
    }
}

/// Set feedback on a report owned by `lecturer_id`
///
/// Returns [`Error::NotFound`] when the report does not exist or belongs to
/// another lecturer; the report is left unchanged.
pub async fn submit_feedback(
    pool: &SqlitePool,
    report_id: i64,
    lecturer_id: i64,
    feedback: &str,
) -> Result<()> {
    let feedback = feedback_text(feedback)?;

    let rows = sqlx::query("UPDATE reports SET feedback = ? WHERE id = ? AND lecturer_id = ?")
        .bind(feedback)
        .bind(report_id)
        .bind(lecturer_id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows == 0 {
        return Err(Error::NotFound(NOT_OWNED.to_string()));
    }

    info!("Lecturer {} set feedback on report {}", lecturer_id, report_id);
    Ok(())
}

/// Set feedback on a report inside the Principal Lecturer's stream
pub async fn submit_supervisor_feedback(
    pool: &SqlitePool,
    report_id: i64,
    prl_id: i64,
    feedback: &str,
) -> Result<()> {
    let feedback = feedback_text(feedback)?;

    let rows = sqlx::query(
        r#"
        UPDATE reports SET feedback = ?
        WHERE id = ?
          AND class_id IN (
              SELECT c.id FROM classes c
              JOIN principal_lecturers p ON p.stream_id = c.stream_id
              WHERE p.id = ?
          )
        "#,
    )
    .bind(feedback)
    .bind(report_id)
    .bind(prl_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(Error::NotFound(NOT_OWNED.to_string()));
    }

    info!("PRL {} set feedback on report {}", prl_id, report_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use lrs_common::Role;

    #[tokio::test]
    async fn test_second_rating_overwrites_first() {
        let fx = Fixture::new().await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let student = fx.user("Stu Dent", Role::Student, None).await;
        let report = fx.report(lecturer, None, "Week 1").await;

        assert_eq!(
            rate_report(&fx.pool, student, report, 3.0).await.unwrap(),
            RatingOutcome::Created
        );
        assert_eq!(
            rate_report(&fx.pool, student, report, 5.0).await.unwrap(),
            RatingOutcome::Updated
        );

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ratings")
            .fetch_one(&fx.pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);

        let summary = rating_summary(&fx.pool, report).await.unwrap();
        assert_eq!(summary.avg_rating, 5.0);
        assert_eq!(summary.total_ratings, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ratings_collapse_to_one_row() {
        let dir = tempfile::TempDir::new().unwrap();
        let fx = Fixture::on_disk(&dir.path().join("lrs.db")).await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let student = fx.user("Stu Dent", Role::Student, None).await;
        let report = fx.report(lecturer, None, "Week 1").await;

        let writers: Vec<_> = (1..=40)
            .map(|n| {
                let pool = fx.pool.clone();
                tokio::spawn(async move { rate_report(&pool, student, report, n as f64).await })
            })
            .collect();

        let mut created = 0;
        for writer in writers {
            if writer.await.unwrap().unwrap() == RatingOutcome::Created {
                created += 1;
            }
        }
        assert_eq!(created, 1);

        let summary = rating_summary(&fx.pool, report).await.unwrap();
        assert_eq!(summary.total_ratings, 1);
        assert!((1.0..=40.0).contains(&summary.avg_rating));

        let revision: i64 = sqlx::query_scalar(
            "SELECT revision FROM ratings WHERE student_id = ? AND report_id = ?",
        )
        .bind(student)
        .bind(report)
        .fetch_one(&fx.pool)
        .await
        .unwrap();
        assert_eq!(revision, 39);
    }

    #[tokio::test]
    async fn test_unrated_report_summary_is_zero() {
        let fx = Fixture::new().await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let report = fx.report(lecturer, None, "Week 1").await;

        let summary = rating_summary(&fx.pool, report).await.unwrap();
        assert_eq!(summary.avg_rating, 0.0);
        assert_eq!(summary.total_ratings, 0);
    }

    #[tokio::test]
    async fn test_summary_averages_students() {
        let fx = Fixture::new().await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let a = fx.user("Stu A", Role::Student, None).await;
        let b = fx.user("Stu B", Role::Student, None).await;
        let report = fx.report(lecturer, None, "Week 1").await;

        rate_report(&fx.pool, a, report, 4.0).await.unwrap();
        rate_report(&fx.pool, b, report, 2.0).await.unwrap();

        let summary = rating_summary(&fx.pool, report).await.unwrap();
        assert_eq!(summary.avg_rating, 3.0);
        assert_eq!(summary.total_ratings, 2);
    }

    #[tokio::test]
    async fn test_rating_missing_report_is_not_found() {
        let fx = Fixture::new().await;
        let student = fx.user("Stu Dent", Role::Student, None).await;

        let err = rate_report(&fx.pool, student, 404, 4.0).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ratings_by_student_only_rated_reports() {
        let fx = Fixture::new().await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let student = fx.user("Stu Dent", Role::Student, None).await;
        let rated = fx.report(lecturer, None, "Week 1").await;
        fx.report(lecturer, None, "Week 2").await;

        rate_report(&fx.pool, student, rated, 4.0).await.unwrap();

        let map = ratings_by_student(&fx.pool, student).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&rated), Some(&4.0));
    }

    #[tokio::test]
    async fn test_foreign_lecturer_feedback_is_rejected() {
        let fx = Fixture::new().await;
        let owner = fx.user("Lee Turer", Role::Lecturer, None).await;
        let intruder = fx.user("Ima Other", Role::Lecturer, None).await;
        let report = fx.report(owner, None, "Week 1").await;

        let err = submit_feedback(&fx.pool, report, intruder, "Looks wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(fx.load_report(report).await.feedback, None);

        submit_feedback(&fx.pool, report, owner, "Covered chapter 3")
            .await
            .unwrap();
        assert_eq!(
            fx.load_report(report).await.feedback.as_deref(),
            Some("Covered chapter 3")
        );
    }

    #[tokio::test]
    async fn test_blank_feedback_is_invalid() {
        let fx = Fixture::new().await;
        let owner = fx.user("Lee Turer", Role::Lecturer, None).await;
        let report = fx.report(owner, None, "Week 1").await;

        let err = submit_feedback(&fx.pool, report, owner, "   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_prl_feedback_limited_to_stream() {
        let fx = Fixture::new().await;
        let prl = fx.user("Pru Principal", Role::Prl, None).await;
        let lecturer = fx.user("Lee Turer", Role::Lecturer, None).await;
        let stream = fx.stream("Engineering").await;
        let other = fx.stream("Design").await;
        fx.assign_prl(prl, stream).await;
        let course = fx.course("Circuits", "EE101", None, None, None).await;
        let inside = fx.class("EE-1A", course, None, Some(stream)).await;
        let outside = fx.class("DS-1A", course, None, Some(other)).await;
        let in_report = fx.report(lecturer, Some(inside), "Week 1").await;
        let out_report = fx.report(lecturer, Some(outside), "Week 1").await;

        submit_supervisor_feedback(&fx.pool, in_report, prl, "Good pacing")
            .await
            .unwrap();
        let err = submit_supervisor_feedback(&fx.pool, out_report, prl, "Nope")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(fx.load_report(out_report).await.feedback, None);
    }
}
