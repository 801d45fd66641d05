//! Database initialization
//!
//! Opens (creating when missing) the SQLite database and makes sure every
//! table exists. Table creation is idempotent and runs on every start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// Every connection to `sqlite::memory:` is a separate database, so the pool
/// is capped at one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_streams_table(pool).await?;
    create_programs_table(pool).await?;
    create_courses_table(pool).await?;
    create_classes_table(pool).await?;
    create_users_table(pool).await?;
    create_principal_lecturers_table(pool).await?;
    create_reports_table(pool).await?;
    create_student_reports_table(pool).await?;
    create_ratings_table(pool).await?;

    debug!("Database schema verified");
    Ok(())
}

async fn create_streams_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS streams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Programs reference their Program Leader by user id. The reference is not
/// a foreign key because users are created after the catalog on first load.
async fn create_programs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            pl_id INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_programs_pl ON programs(pl_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// `assigned_to` and `stream_id` are unconstrained legacy columns.
///
/// `assigned_to` is written with lecturer (user) ids by course assignment,
/// while the legacy hierarchy fallback reads it as a program id. The two id
/// spaces overlap: a course assigned to lecturer N is pulled into program N's
/// scope whenever program N has no courses on `program_id`.
async fn create_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course_name TEXT NOT NULL,
            course_code TEXT NOT NULL,
            faculty_name TEXT NOT NULL,
            program_id INTEGER REFERENCES programs(id) ON DELETE SET NULL,
            assigned_to INTEGER,
            stream_id INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_program ON courses(program_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_stream ON courses(stream_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_classes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_name TEXT NOT NULL,
            venue TEXT NOT NULL DEFAULT '',
            schedule_time TEXT NOT NULL DEFAULT '',
            course_id INTEGER NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
            lecturer_id INTEGER,
            stream_id INTEGER REFERENCES streams(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_classes_course ON classes(course_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_classes_lecturer ON classes(lecturer_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_classes_stream ON classes(stream_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL,
            class_id INTEGER REFERENCES classes(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_class ON users(class_id, role)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per PRL; `id` is the PRL's user id
async fn create_principal_lecturers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS principal_lecturers (
            id INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
            stream_id INTEGER NOT NULL REFERENCES streams(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            lecturer_id INTEGER NOT NULL REFERENCES users(id),
            class_id INTEGER REFERENCES classes(id) ON DELETE SET NULL,
            week_of_reporting TEXT NOT NULL,
            date_of_lecture TEXT NOT NULL,
            topic_taught TEXT NOT NULL,
            learning_outcomes TEXT NOT NULL DEFAULT '',
            recommendations TEXT NOT NULL DEFAULT '',
            students_present INTEGER NOT NULL DEFAULT 0,
            total_registered INTEGER NOT NULL DEFAULT 0,
            feedback TEXT,
            faculty_name TEXT NOT NULL DEFAULT '',
            class_name TEXT NOT NULL DEFAULT '',
            course_name TEXT NOT NULL DEFAULT '',
            course_code TEXT NOT NULL DEFAULT '',
            venue TEXT NOT NULL DEFAULT '',
            scheduled_time TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_class ON reports(class_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reports_lecturer ON reports(lecturer_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_student_reports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS student_reports (
            student_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            report_id INTEGER NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
            PRIMARY KEY (student_id, report_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// `revision` counts overwrites; 0 means the row was freshly inserted
async fn create_ratings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ratings (
            student_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            report_id INTEGER NOT NULL REFERENCES reports(id) ON DELETE CASCADE,
            rating REAL NOT NULL,
            revision INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            UNIQUE (student_id, report_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
