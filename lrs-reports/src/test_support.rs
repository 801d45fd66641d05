//! Catalog fixtures for unit tests

use chrono::Utc;
use lrs_common::db::{init_database, init_memory_database, Report};
use lrs_common::Role;
use sqlx::SqlitePool;
use std::path::Path;

use crate::db::REPORT_COLUMNS;
use crate::submission::{insert_report, ReportSnapshot};

pub struct Fixture {
    pub pool: SqlitePool,
}

impl Fixture {
    pub async fn new() -> Self {
        let pool = init_memory_database().await.unwrap();
        Self { pool }
    }

    /// File-backed pool with several connections, for concurrent writers
    pub async fn on_disk(path: &Path) -> Self {
        let pool = init_database(path).await.unwrap();
        Self { pool }
    }

    /// Insert a user; the email is derived from the name, so names must be unique
    pub async fn user(&self, name: &str, role: Role, class_id: Option<i64>) -> i64 {
        let email = format!("{}@lrs.test", name.to_lowercase().replace(' ', "."));
        sqlx::query("INSERT INTO users (name, email, role, class_id) VALUES (?, ?, ?, ?)")
            .bind(name)
            .bind(email)
            .bind(role)
            .bind(class_id)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn program(&self, name: &str, pl_id: i64) -> i64 {
        sqlx::query("INSERT INTO programs (name, pl_id) VALUES (?, ?)")
            .bind(name)
            .bind(pl_id)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn stream(&self, name: &str) -> i64 {
        sqlx::query("INSERT INTO streams (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    pub async fn assign_prl(&self, prl_id: i64, stream_id: i64) {
        sqlx::query("INSERT INTO principal_lecturers (id, stream_id) VALUES (?, ?)")
            .bind(prl_id)
            .bind(stream_id)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn course(
        &self,
        name: &str,
        code: &str,
        program_id: Option<i64>,
        assigned_to: Option<i64>,
        stream_id: Option<i64>,
    ) -> i64 {
        sqlx::query(
            r#"
            INSERT INTO courses (course_name, course_code, faculty_name, program_id, assigned_to, stream_id)
            VALUES (?, ?, 'FICT', ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(code)
        .bind(program_id)
        .bind(assigned_to)
        .bind(stream_id)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    pub async fn class(
        &self,
        name: &str,
        course_id: i64,
        lecturer_id: Option<i64>,
        stream_id: Option<i64>,
    ) -> i64 {
        sqlx::query(
            r#"
            INSERT INTO classes (class_name, venue, schedule_time, course_id, lecturer_id, stream_id)
            VALUES (?, 'Hall 6', 'Mon 08:30', ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(course_id)
        .bind(lecturer_id)
        .bind(stream_id)
        .execute(&self.pool)
        .await
        .unwrap()
        .last_insert_rowid()
    }

    /// Store a report directly, without context resolution or roster link
    pub async fn report(&self, lecturer_id: i64, class_id: Option<i64>, week: &str) -> i64 {
        let snapshot = ReportSnapshot {
            lecturer_id,
            class_id,
            week_of_reporting: week.to_string(),
            date_of_lecture: "2026-03-02".to_string(),
            topic_taught: "Normalisation".to_string(),
            learning_outcomes: String::new(),
            recommendations: String::new(),
            students_present: 20,
            total_registered: 25,
            feedback: None,
            faculty_name: "FICT".to_string(),
            class_name: String::new(),
            course_name: String::new(),
            course_code: String::new(),
            venue: String::new(),
            scheduled_time: String::new(),
            created_at: Utc::now(),
        };

        insert_report(&self.pool, &snapshot).await.unwrap()
    }

    pub async fn load_report(&self, id: i64) -> Report {
        sqlx::query_as::<_, Report>(&format!("SELECT {} FROM reports r WHERE r.id = ?", REPORT_COLUMNS))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}
