//! Supervisory scope resolution
//!
//! Walks the organizational hierarchy to find the classes (and through them
//! the reports) a supervisor is responsible for:
//!
//! - Program Leader: program → course → class → report
//! - Principal Lecturer: stream → class → report
//!
//! Every hop is a standalone lookup `(parent ids) → child ids` so each can be
//! exercised on its own. A hop that yields nothing ends the walk with an empty
//! scope without querying deeper levels. A failing hop aborts the whole walk
//! with [`Error::ScopeResolution`]; partial scopes are never returned.

use lrs_common::db::{Course, Program, Report};
use lrs_common::{Error, Principal, Result, Role};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::db::{push_id_list, REPORT_COLUMNS};

/// Supervisory identity whose scope is being resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Supervisor {
    ProgramLeader(i64),
    PrincipalLecturer(i64),
}

impl Supervisor {
    /// Supervisor for a PL or PRL principal; `None` for other roles
    pub fn from_principal(principal: &Principal) -> Option<Self> {
        match principal.role {
            Role::Pl => Some(Supervisor::ProgramLeader(principal.id)),
            Role::Prl => Some(Supervisor::PrincipalLecturer(principal.id)),
            _ => None,
        }
    }
}

/// Classes reachable from a supervisor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeSet {
    pub class_ids: Vec<i64>,
}

impl ScopeSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.class_ids.is_empty()
    }
}

/// Courses found for a set of programs, and which edge found them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseResolution {
    pub course_ids: Vec<i64>,
    /// True when the `program_id` edge was empty and the legacy
    /// `assigned_to`/`stream_id` edge produced the result
    pub via_fallback: bool,
}

/// Scope of a single program, used for per-program breakdowns
#[derive(Debug, Clone)]
pub struct ProgramScope {
    pub program: Program,
    pub scope: ScopeSet,
}

async fn ids_in(pool: &SqlitePool, prefix: &str, ids: &[i64], suffix: &str) -> Result<Vec<i64>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(prefix);
    push_id_list(&mut builder, ids);
    builder.push(suffix);

    builder
        .build_query_scalar::<i64>()
        .fetch_all(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Programs owned by a Program Leader, in id order
pub async fn programs_for_leader(pool: &SqlitePool, pl_id: i64) -> Result<Vec<Program>> {
    sqlx::query_as::<_, Program>("SELECT id, name, pl_id FROM programs WHERE pl_id = ? ORDER BY id")
        .bind(pl_id)
        .fetch_all(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Courses attached to programs by `program_id`
pub async fn courses_for_programs(pool: &SqlitePool, program_ids: &[i64]) -> Result<Vec<i64>> {
    ids_in(
        pool,
        "SELECT id FROM courses WHERE program_id IN ",
        program_ids,
        " ORDER BY id",
    )
    .await
}

/// Courses whose legacy `assigned_to` or `stream_id` column holds a program id
pub async fn legacy_courses_for_programs(
    pool: &SqlitePool,
    program_ids: &[i64],
) -> Result<Vec<i64>> {
    if program_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM courses WHERE assigned_to IN ");
    push_id_list(&mut builder, program_ids);
    builder.push(" OR stream_id IN ");
    push_id_list(&mut builder, program_ids);
    builder.push(" ORDER BY id");

    builder
        .build_query_scalar::<i64>()
        .fetch_all(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Resolve courses for programs, consulting the legacy edge only when the
/// `program_id` edge yields no rows
pub async fn resolve_courses(pool: &SqlitePool, program_ids: &[i64]) -> Result<CourseResolution> {
    let course_ids = courses_for_programs(pool, program_ids).await?;
    if !course_ids.is_empty() || program_ids.is_empty() {
        return Ok(CourseResolution {
            course_ids,
            via_fallback: false,
        });
    }

    let course_ids = legacy_courses_for_programs(pool, program_ids).await?;
    if !course_ids.is_empty() {
        info!(
            "Resolved {} course(s) for programs {:?} through legacy course columns",
            course_ids.len(),
            program_ids
        );
    }

    Ok(CourseResolution {
        course_ids,
        via_fallback: true,
    })
}

/// Classes belonging to courses
pub async fn classes_for_courses(pool: &SqlitePool, course_ids: &[i64]) -> Result<Vec<i64>> {
    ids_in(
        pool,
        "SELECT id FROM classes WHERE course_id IN ",
        course_ids,
        " ORDER BY id",
    )
    .await
}

/// Stream a Principal Lecturer is responsible for
pub async fn stream_for_prl(pool: &SqlitePool, prl_id: i64) -> Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT stream_id FROM principal_lecturers WHERE id = ?")
        .bind(prl_id)
        .fetch_optional(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Classes tagged with a stream
pub async fn classes_for_stream(pool: &SqlitePool, stream_id: i64) -> Result<Vec<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM classes WHERE stream_id = ? ORDER BY id")
        .bind(stream_id)
        .fetch_all(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Courses tagged with a stream
pub async fn courses_for_stream(pool: &SqlitePool, stream_id: i64) -> Result<Vec<Course>> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, course_name, course_code, faculty_name, program_id, assigned_to, stream_id
        FROM courses
        WHERE stream_id = ?
        ORDER BY course_name ASC, id ASC
        "#,
    )
    .bind(stream_id)
    .fetch_all(pool)
    .await
    .map_err(Error::ScopeResolution)
}

/// Lecturers assigned to any of the classes
pub async fn lecturers_for_classes(pool: &SqlitePool, class_ids: &[i64]) -> Result<Vec<i64>> {
    ids_in(
        pool,
        "SELECT DISTINCT lecturer_id FROM classes WHERE lecturer_id IS NOT NULL AND id IN ",
        class_ids,
        " ORDER BY lecturer_id",
    )
    .await
}

/// Reports filed against any of the classes, newest first
pub async fn reports_for_classes(pool: &SqlitePool, class_ids: &[i64]) -> Result<Vec<Report>> {
    if class_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM reports r WHERE r.class_id IN ",
        REPORT_COLUMNS
    ));
    push_id_list(&mut builder, class_ids);
    builder.push(" ORDER BY r.created_at DESC, r.id DESC");

    builder
        .build_query_as::<Report>()
        .fetch_all(pool)
        .await
        .map_err(Error::ScopeResolution)
}

/// Classes reachable from a set of programs
async fn scope_for_programs(pool: &SqlitePool, program_ids: &[i64]) -> Result<ScopeSet> {
    let courses = resolve_courses(pool, program_ids).await?;
    if courses.course_ids.is_empty() {
        debug!("No courses for programs {:?}", program_ids);
        return Ok(ScopeSet::empty());
    }

    let class_ids = classes_for_courses(pool, &courses.course_ids).await?;
    debug!(
        "Programs {:?}: {} course(s), {} class(es)",
        program_ids,
        courses.course_ids.len(),
        class_ids.len()
    );

    Ok(ScopeSet { class_ids })
}

/// Resolve the classes in a supervisor's scope
pub async fn resolve_scope(pool: &SqlitePool, supervisor: Supervisor) -> Result<ScopeSet> {
    match supervisor {
        Supervisor::ProgramLeader(pl_id) => {
            let programs = programs_for_leader(pool, pl_id).await?;
            if programs.is_empty() {
                debug!("PL {} owns no programs", pl_id);
                return Ok(ScopeSet::empty());
            }

            let program_ids: Vec<i64> = programs.iter().map(|p| p.id).collect();
            scope_for_programs(pool, &program_ids).await
        }
        Supervisor::PrincipalLecturer(prl_id) => {
            let Some(stream_id) = stream_for_prl(pool, prl_id).await? else {
                debug!("PRL {} has no stream", prl_id);
                return Ok(ScopeSet::empty());
            };

            let class_ids = classes_for_stream(pool, stream_id).await?;
            Ok(ScopeSet { class_ids })
        }
    }
}

/// Reports in a supervisor's scope, newest first
pub async fn scope_reports(pool: &SqlitePool, supervisor: Supervisor) -> Result<Vec<Report>> {
    let scope = resolve_scope(pool, supervisor).await?;
    if scope.is_empty() {
        return Ok(Vec::new());
    }

    reports_for_classes(pool, &scope.class_ids).await
}

/// Resolve each owned program's scope independently
///
/// Every program owned by the PL appears exactly once, in id order, even when
/// its course/class chain is empty.
pub async fn program_breakdown(pool: &SqlitePool, pl_id: i64) -> Result<Vec<ProgramScope>> {
    let programs = programs_for_leader(pool, pl_id).await?;

    let mut breakdown = Vec::with_capacity(programs.len());
    for program in programs {
        let scope = scope_for_programs(pool, &[program.id]).await?;
        breakdown.push(ProgramScope { program, scope });
    }

    Ok(breakdown)
}
