//! Catalog write-path: users, programs, streams, courses and classes
//!
//! Only what the hierarchy needs to be populated, edited and re-wired.
//! Credentials are handled by the authentication layer and never stored here.
//!
//! Renaming or deleting catalog rows never touches stored reports: their
//! class, course and faculty names are snapshots.

use lrs_common::db::{Class, Course, Stream, User};
use lrs_common::{Error, Result, Role};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

use crate::coerce;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub class_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProgram {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub pl_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCourse {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub course_code: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub faculty_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub program_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub assigned_to: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub stream_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewClass {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub schedule_time: Option<String>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub lecturer_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub stream_id: Option<i64>,
}

fn required<'a, T>(missing: &mut Vec<&'a str>, name: &'a str, value: &Option<T>) {
    if value.is_none() {
        missing.push(name);
    }
}

fn check_required(missing: Vec<&str>) -> Result<()> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )))
    }
}

/// Map constraint violations to caller errors
fn constraint_error(e: sqlx::Error, what: &str) -> Error {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return Error::InvalidInput(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return Error::NotFound(format!("{} references a missing record", what));
        }
    }
    Error::Database(e)
}

fn expect_affected(rows: u64, what: String) -> Result<()> {
    if rows == 0 {
        Err(Error::NotFound(what))
    } else {
        Ok(())
    }
}

pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<i64> {
    let mut missing = Vec::new();
    required(&mut missing, "name", &user.name);
    required(&mut missing, "email", &user.email);
    check_required(missing)?;

    let id = sqlx::query("INSERT INTO users (name, email, role, class_id) VALUES (?, ?, ?, ?)")
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.class_id)
        .execute(pool)
        .await
        .map_err(|e| constraint_error(e, "user"))?
        .last_insert_rowid();

    info!("Created {} user {}", user.role, id);
    Ok(id)
}

pub async fn create_program(pool: &SqlitePool, program: &NewProgram) -> Result<i64> {
    let mut missing = Vec::new();
    required(&mut missing, "name", &program.name);
    required(&mut missing, "pl_id", &program.pl_id);
    check_required(missing)?;

    let id = sqlx::query("INSERT INTO programs (name, pl_id) VALUES (?, ?)")
        .bind(&program.name)
        .bind(program.pl_id)
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(id)
}

pub async fn create_stream(pool: &SqlitePool, name: &str) -> Result<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Missing required fields: name".to_string()));
    }

    let id = sqlx::query("INSERT INTO streams (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| constraint_error(e, "stream"))?
        .last_insert_rowid();

    Ok(id)
}

/// Make `prl_id` the Principal Lecturer of `stream_id`, replacing any
/// previous stream assignment
pub async fn assign_prl_stream(pool: &SqlitePool, prl_id: i64, stream_id: i64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO principal_lecturers (id, stream_id) VALUES (?, ?)
        ON CONFLICT(id) DO UPDATE SET stream_id = excluded.stream_id
        "#,
    )
    .bind(prl_id)
    .bind(stream_id)
    .execute(pool)
    .await
    .map_err(|e| constraint_error(e, "principal lecturer"))?;

    Ok(())
}

pub async fn create_course(pool: &SqlitePool, course: &NewCourse) -> Result<i64> {
    let mut missing = Vec::new();
    required(&mut missing, "course_name", &course.course_name);
    required(&mut missing, "course_code", &course.course_code);
    required(&mut missing, "faculty_name", &course.faculty_name);
    check_required(missing)?;

    let id = sqlx::query(
        r#"
        INSERT INTO courses (course_name, course_code, faculty_name, program_id, assigned_to, stream_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&course.course_name)
    .bind(&course.course_code)
    .bind(&course.faculty_name)
    .bind(course.program_id)
    .bind(course.assigned_to)
    .bind(course.stream_id)
    .execute(pool)
    .await
    .map_err(|e| constraint_error(e, "course"))?
    .last_insert_rowid();

    Ok(id)
}

pub async fn create_class(pool: &SqlitePool, class: &NewClass) -> Result<i64> {
    let mut missing = Vec::new();
    required(&mut missing, "class_name", &class.class_name);
    required(&mut missing, "schedule_time", &class.schedule_time);
    required(&mut missing, "course_id", &class.course_id);
    check_required(missing)?;

    let id = sqlx::query(
        r#"
        INSERT INTO classes (class_name, venue, schedule_time, course_id, lecturer_id, stream_id)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&class.class_name)
    .bind(class.venue.as_deref().unwrap_or(""))
    .bind(&class.schedule_time)
    .bind(class.course_id)
    .bind(class.lecturer_id)
    .bind(class.stream_id)
    .execute(pool)
    .await
    .map_err(|e| constraint_error(e, "class"))?
    .last_insert_rowid();

    Ok(id)
}

pub async fn assign_class_lecturer(pool: &SqlitePool, class_id: i64, lecturer_id: i64) -> Result<()> {
    let rows = sqlx::query("UPDATE classes SET lecturer_id = ? WHERE id = ?")
        .bind(lecturer_id)
        .bind(class_id)
        .execute(pool)
        .await?
        .rows_affected();

    expect_affected(rows, format!("class {}", class_id))
}

pub async fn assign_class_course(pool: &SqlitePool, class_id: i64, course_id: i64) -> Result<()> {
    let rows = sqlx::query("UPDATE classes SET course_id = ? WHERE id = ?")
        .bind(course_id)
        .bind(class_id)
        .execute(pool)
        .await
        .map_err(|e| constraint_error(e, "class"))?
        .rows_affected();

    expect_affected(rows, format!("class {}", class_id))
}

pub async fn assign_course_lecturer(pool: &SqlitePool, course_id: i64, lecturer_id: i64) -> Result<()> {
    let rows = sqlx::query("UPDATE courses SET assigned_to = ? WHERE id = ?")
        .bind(lecturer_id)
        .bind(course_id)
        .execute(pool)
        .await?
        .rows_affected();

    expect_affected(rows, format!("course {}", course_id))
}

/// Replace a class's name, venue, schedule, course and lecturer
///
/// Required fields are the same as on creation. The stream edge is kept.
pub async fn update_class(pool: &SqlitePool, class_id: i64, class: &NewClass) -> Result<()> {
    let mut missing = Vec::new();
    required(&mut missing, "class_name", &class.class_name);
    required(&mut missing, "schedule_time", &class.schedule_time);
    required(&mut missing, "course_id", &class.course_id);
    check_required(missing)?;

    let rows = sqlx::query(
        r#"
        UPDATE classes
        SET class_name = ?, venue = ?, schedule_time = ?, course_id = ?, lecturer_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&class.class_name)
    .bind(class.venue.as_deref().unwrap_or(""))
    .bind(&class.schedule_time)
    .bind(class.course_id)
    .bind(class.lecturer_id)
    .bind(class_id)
    .execute(pool)
    .await
    .map_err(|e| constraint_error(e, "class"))?
    .rows_affected();

    expect_affected(rows, format!("class {}", class_id))?;
    info!("Updated class {}", class_id);
    Ok(())
}

/// Replace a course's name, code, faculty and assigned lecturer
///
/// `program_id` and `stream_id` are only overwritten when given.
pub async fn update_course(pool: &SqlitePool, course_id: i64, course: &NewCourse) -> Result<()> {
    let mut missing = Vec::new();
    required(&mut missing, "course_name", &course.course_name);
    required(&mut missing, "course_code", &course.course_code);
    required(&mut missing, "faculty_name", &course.faculty_name);
    check_required(missing)?;

    let rows = sqlx::query(
        r#"
        UPDATE courses
        SET course_name = ?, course_code = ?, faculty_name = ?, assigned_to = ?,
            program_id = COALESCE(?, program_id),
            stream_id = COALESCE(?, stream_id)
        WHERE id = ?
        "#,
    )
    .bind(&course.course_name)
    .bind(&course.course_code)
    .bind(&course.faculty_name)
    .bind(course.assigned_to)
    .bind(course.program_id)
    .bind(course.stream_id)
    .bind(course_id)
    .execute(pool)
    .await
    .map_err(|e| constraint_error(e, "course"))?
    .rows_affected();

    expect_affected(rows, format!("course {}", course_id))?;
    info!("Updated course {}", course_id);
    Ok(())
}

/// Delete a course together with its classes
///
/// Reports filed against those classes keep their snapshot and lose only
/// the `class_id` link.
pub async fn delete_course(pool: &SqlitePool, course_id: i64) -> Result<()> {
    let rows = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(course_id)
        .execute(pool)
        .await?
        .rows_affected();

    expect_affected(rows, format!("course {}", course_id))?;
    info!("Deleted course {}", course_id);
    Ok(())
}

/// Class row with the names shown next to it in listings
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ClassListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub class: Class,
    pub course_name: String,
    pub lecturer_name: Option<String>,
}

/// Course row with the name of its assigned lecturer
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CourseListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub lecturer_name: Option<String>,
}

pub async fn list_classes(pool: &SqlitePool) -> Result<Vec<ClassListing>> {
    let classes = sqlx::query_as::<_, ClassListing>(
        r#"
        SELECT c.id, c.class_name, c.venue, c.schedule_time, c.course_id, c.lecturer_id,
               c.stream_id, co.course_name, u.name AS lecturer_name
        FROM classes c
        JOIN courses co ON co.id = c.course_id
        LEFT JOIN users u ON u.id = c.lecturer_id
        ORDER BY c.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(classes)
}

/// Courses by name; `lecturer_name` follows the `assigned_to` column
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<CourseListing>> {
    let courses = sqlx::query_as::<_, CourseListing>(
        r#"
        SELECT co.id, co.course_name, co.course_code, co.faculty_name, co.program_id,
               co.assigned_to, co.stream_id, u.name AS lecturer_name
        FROM courses co
        LEFT JOIN users u ON u.id = co.assigned_to AND u.role = 'lecturer'
        ORDER BY co.course_name, co.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

pub async fn list_lecturers(pool: &SqlitePool) -> Result<Vec<User>> {
    let lecturers = sqlx::query_as::<_, User>(
        "SELECT id, name, email, role, class_id FROM users WHERE role = ? ORDER BY name, id",
    )
    .bind(Role::Lecturer)
    .fetch_all(pool)
    .await?;

    Ok(lecturers)
}

pub async fn list_streams(pool: &SqlitePool) -> Result<Vec<Stream>> {
    let streams = sqlx::query_as::<_, Stream>("SELECT id, name FROM streams ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(streams)
}
