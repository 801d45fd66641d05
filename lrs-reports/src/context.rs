//! Class context resolution for new reports
//!
//! A report records which class, course and faculty it was delivered for.
//! The context is found by trying an ordered list of strategies; the first
//! one that produces a match wins:
//!
//! 1. [`AssignedClass`]: a class currently assigned to the lecturer
//! 2. [`HintedClass`]: a class whose name or course code equals a caller hint
//! 3. [`HintEcho`]: the caller's free-text values, with no class link
//!
//! The last strategy always matches, so resolution never blocks a
//! submission. A report without a class link is a valid outcome.

use async_trait::async_trait;
use lrs_common::Result;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Class/course/faculty context captured on a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ClassContext {
    pub class_id: Option<i64>,
    pub class_name: String,
    pub course_name: String,
    pub course_code: String,
    pub faculty_name: String,
    pub venue: String,
    pub scheduled_time: String,
}

impl ClassContext {
    /// Context made only of caller-supplied text
    pub fn from_hints(hints: &ContextHints) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            class_id: None,
            class_name: text(&hints.class_name),
            course_name: text(&hints.course_name),
            course_code: text(&hints.course_code),
            faculty_name: text(&hints.faculty_name),
            venue: String::new(),
            scheduled_time: String::new(),
        }
    }
}

/// Optional caller-supplied context values
///
/// `class_name` and `course_code` are used to look a class up;
/// all four are echoed when nothing matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextHints {
    pub class_name: Option<String>,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub faculty_name: Option<String>,
}

impl ContextHints {
    pub fn has_lookup_keys(&self) -> bool {
        self.class_name.is_some() || self.course_code.is_some()
    }
}

/// One step of the context fallback chain
#[async_trait]
pub trait ContextStrategy: Send + Sync {
    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Try to produce a context; `Ok(None)` passes to the next strategy
    async fn resolve(
        &self,
        pool: &SqlitePool,
        lecturer_id: i64,
        hints: &ContextHints,
    ) -> Result<Option<ClassContext>>;
}

const CONTEXT_SELECT: &str = r#"
    SELECT c.id AS class_id, c.class_name, co.course_name, co.course_code, co.faculty_name,
           c.venue, c.schedule_time AS scheduled_time
    FROM classes c
    JOIN courses co ON co.id = c.course_id
"#;

/// Class assigned to the lecturer; the lowest class id when there are several
pub struct AssignedClass;

#[async_trait]
impl ContextStrategy for AssignedClass {
    fn name(&self) -> &'static str {
        "assigned-class"
    }

    async fn resolve(
        &self,
        pool: &SqlitePool,
        lecturer_id: i64,
        _hints: &ContextHints,
    ) -> Result<Option<ClassContext>> {
        let sql = format!("{} WHERE c.lecturer_id = ? ORDER BY c.id ASC LIMIT 1", CONTEXT_SELECT);
        let context = sqlx::query_as::<_, ClassContext>(&sql)
            .bind(lecturer_id)
            .fetch_optional(pool)
            .await?;

        Ok(context)
    }
}

/// Class matching either hint (class name OR course code)
pub struct HintedClass;

#[async_trait]
impl ContextStrategy for HintedClass {
    fn name(&self) -> &'static str {
        "hinted-class"
    }

    async fn resolve(
        &self,
        pool: &SqlitePool,
        _lecturer_id: i64,
        hints: &ContextHints,
    ) -> Result<Option<ClassContext>> {
        if !hints.has_lookup_keys() {
            return Ok(None);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(CONTEXT_SELECT);
        builder.push(" WHERE ");
        let mut conditions = builder.separated(" OR ");
        if let Some(class_name) = &hints.class_name {
            conditions.push("c.class_name = ");
            conditions.push_bind_unseparated(class_name.clone());
        }
        if let Some(course_code) = &hints.course_code {
            conditions.push("co.course_code = ");
            conditions.push_bind_unseparated(course_code.clone());
        }
        builder.push(" ORDER BY c.id ASC LIMIT 1");

        let context = builder
            .build_query_as::<ClassContext>()
            .fetch_optional(pool)
            .await?;

        Ok(context)
    }
}

/// Echo the caller's values with no class link; always matches
pub struct HintEcho;

#[async_trait]
impl ContextStrategy for HintEcho {
    fn name(&self) -> &'static str {
        "hint-echo"
    }

    async fn resolve(
        &self,
        _pool: &SqlitePool,
        _lecturer_id: i64,
        hints: &ContextHints,
    ) -> Result<Option<ClassContext>> {
        Ok(Some(ClassContext::from_hints(hints)))
    }
}

/// Context together with the strategy that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub context: ClassContext,
    pub strategy: &'static str,
}

/// Ordered chain of context strategies
pub struct ClassContextResolver {
    strategies: Vec<Box<dyn ContextStrategy>>,
}

impl Default for ClassContextResolver {
    fn default() -> Self {
        Self::new(vec![
            Box::new(AssignedClass),
            Box::new(HintedClass),
            Box::new(HintEcho),
        ])
    }
}

impl ClassContextResolver {
    pub fn new(strategies: Vec<Box<dyn ContextStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the strategies in order and accept the first match
    ///
    /// A chain without a match (one missing [`HintEcho`]) still yields the
    /// echoed hints.
    pub async fn resolve(
        &self,
        pool: &SqlitePool,
        lecturer_id: i64,
        hints: &ContextHints,
    ) -> Result<ResolvedContext> {
        for strategy in &self.strategies {
            if let Some(context) = strategy.resolve(pool, lecturer_id, hints).await? {
                debug!(
                    "Lecturer {} context resolved by {} (class {:?})",
                    lecturer_id,
                    strategy.name(),
                    context.class_id
                );
                return Ok(ResolvedContext {
                    context,
                    strategy: strategy.name(),
                });
            }
        }

        Ok(ResolvedContext {
            context: ClassContext::from_hints(hints),
            strategy: HintEcho.name(),
        })
    }
}
