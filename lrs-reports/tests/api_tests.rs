//! Integration tests for lrs-reports API endpoints
//!
//! Each test builds the router over a fresh in-memory database, seeds the
//! catalog through the library and drives the HTTP surface with `oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lrs_common::db::init_memory_database;
use lrs_common::Role;
use lrs_reports::catalog::{self, NewClass, NewCourse, NewProgram, NewUser};
use lrs_reports::{build_router, AppState};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: fresh router and the pool behind it
async fn setup_app() -> (Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");
    (build_router(AppState::new(pool.clone())), pool)
}

/// Test helper: send a request as `who` (`None` sends no principal headers)
async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    who: Option<(i64, Role)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = who {
        builder = builder
            .header("x-lrs-user-id", id.to_string())
            .header("x-lrs-user-role", role.as_str());
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

async fn user(pool: &SqlitePool, name: &str, role: Role, class_id: Option<i64>) -> i64 {
    catalog::create_user(
        pool,
        &NewUser {
            name: Some(name.to_string()),
            email: Some(format!("{}@campus.test", name.to_lowercase().replace(' ', "."))),
            role,
            class_id,
        },
    )
    .await
    .unwrap()
}

async fn program(pool: &SqlitePool, name: &str, pl_id: i64) -> i64 {
    catalog::create_program(
        pool,
        &NewProgram {
            name: Some(name.to_string()),
            pl_id: Some(pl_id),
        },
    )
    .await
    .unwrap()
}

async fn course(pool: &SqlitePool, name: &str, code: &str, program_id: Option<i64>) -> i64 {
    catalog::create_course(
        pool,
        &NewCourse {
            course_name: Some(name.to_string()),
            course_code: Some(code.to_string()),
            faculty_name: Some("FICT".to_string()),
            program_id,
            ..Default::default()
        },
    )
    .await
    .unwrap()
}

async fn class(
    pool: &SqlitePool,
    name: &str,
    course_id: i64,
    lecturer_id: Option<i64>,
    stream_id: Option<i64>,
) -> i64 {
    catalog::create_class(
        pool,
        &NewClass {
            class_name: Some(name.to_string()),
            venue: Some("Hall 6".to_string()),
            schedule_time: Some("Mon 08:30".to_string()),
            course_id: Some(course_id),
            lecturer_id,
            stream_id,
        },
    )
    .await
    .unwrap()
}

fn report_body(week: &str) -> Value {
    json!({
        "week_of_reporting": week,
        "date_of_lecture": "2026-03-02",
        "topic_taught": "Normalisation",
        "learning_outcomes": "3NF",
        "students_present": "18",
        "total_registered": 25,
    })
}

/// One PL program with a class of four students taught by `lecturer`
struct Campus {
    pl: i64,
    program: i64,
    lecturer: i64,
    class: i64,
    students: Vec<i64>,
}

async fn campus(pool: &SqlitePool) -> Campus {
    let pl = user(pool, "Pat Leader", Role::Pl, None).await;
    let lecturer = user(pool, "Lee Turer", Role::Lecturer, None).await;
    let program_id = program(pool, "BSc IT", pl).await;
    let course_id = course(pool, "Databases", "DB101", Some(program_id)).await;
    let class_id = class(pool, "IT-1A", course_id, Some(lecturer), None).await;

    let mut students = Vec::new();
    for name in ["Ada One", "Ben Two", "Cy Three", "Di Four"] {
        students.push(user(pool, name, Role::Student, Some(class_id)).await);
    }

    Campus {
        pl,
        program: program_id,
        lecturer,
        class: class_id,
        students,
    }
}

// =============================================================================
// Health and principal extraction
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_principal_required() {
    let (app, _pool) = setup_app().await;

    let (status, body) = call(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "lrs-reports");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_missing_principal_is_unauthorized() {
    let (app, _pool) = setup_app().await;

    let (status, body) = call(&app, "GET", "/api/reports", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let (app, _pool) = setup_app().await;

    let request = Request::builder()
        .uri("/api/reports")
        .header("x-lrs-user-id", "7")
        .header("x-lrs-user-role", "admin")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Supervisory scopes
// =============================================================================

#[tokio::test]
async fn test_pl_without_programs_gets_empty_results() {
    let (app, pool) = setup_app().await;
    let pl = user(&pool, "Pat Leader", Role::Pl, None).await;
    let who = Some((pl, Role::Pl));

    for uri in [
        format!("/api/reports/pl/{}", pl),
        format!("/api/reports/pl/{}/stats", pl),
        format!("/api/reports/pl/{}/program-stats", pl),
    ] {
        let (status, body) = call(&app, "GET", &uri, who, None).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn test_program_without_classes_listed_with_zero() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let empty_program = program(&pool, "BA Design", campus.pl).await;
    course(&pool, "Colour Theory", "CT101", Some(empty_program)).await;

    let lecturer = Some((campus.lecturer, Role::Lecturer));
    call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 1"))).await;

    let (status, body) = call(
        &app,
        "GET",
        &format!("/api/reports/pl/{}/program-stats", campus.pl),
        Some((campus.pl, Role::Pl)),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"program_id": campus.program, "program_name": "BSc IT", "total_reports": 1},
            {"program_id": empty_program, "program_name": "BA Design", "total_reports": 0},
        ])
    );
}

#[tokio::test]
async fn test_pl_scope_uses_legacy_course_edge_only_as_fallback() {
    let (app, pool) = setup_app().await;
    let pl = user(&pool, "Pat Leader", Role::Pl, None).await;
    let lecturer = user(&pool, "Lee Turer", Role::Lecturer, None).await;
    let program_id = program(&pool, "BSc IT", pl).await;

    let legacy = catalog::create_course(
        &pool,
        &NewCourse {
            course_name: Some("Legacy".to_string()),
            course_code: Some("LG100".to_string()),
            faculty_name: Some("FICT".to_string()),
            assigned_to: Some(program_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    class(&pool, "LG-1A", legacy, Some(lecturer), None).await;

    let lecturer_who = Some((lecturer, Role::Lecturer));
    call(&app, "POST", "/api/reports", lecturer_who, Some(report_body("Week 1"))).await;

    let pl_uri = format!("/api/reports/pl/{}", pl);
    let (_, body) = call(&app, "GET", &pl_uri, Some((pl, Role::Pl)), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Once a course hangs off the program id, the legacy edge is ignored
    course(&pool, "Databases", "DB101", Some(program_id)).await;
    let (_, body) = call(&app, "GET", &pl_uri, Some((pl, Role::Pl)), None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_supervisor_may_only_query_own_scope() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let other_pl = user(&pool, "Ola Leader", Role::Pl, None).await;

    let uri = format!("/api/reports/pl/{}", campus.pl);
    let (status, body) = call(&app, "GET", &uri, Some((other_pl, Role::Pl)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = call(&app, "GET", &uri, Some((campus.pl, Role::Prl)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_prl_scope_stats_and_feedback() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let prl = user(&pool, "Pru Principal", Role::Prl, None).await;
    let stream = catalog::create_stream(&pool, "Engineering").await.unwrap();
    catalog::assign_prl_stream(&pool, prl, stream).await.unwrap();

    let circuits = course(&pool, "Circuits", "EE101", None).await;
    let ee_class = class(&pool, "EE-1A", circuits, None, Some(stream)).await;
    catalog::assign_class_lecturer(&pool, ee_class, campus.lecturer)
        .await
        .unwrap();

    // Lecturer teaches two classes; the lowest id wins even against a hint
    let lecturer = Some((campus.lecturer, Role::Lecturer));
    let mut hinted = report_body("Week 2");
    hinted["class_name"] = json!("EE-1A");
    let (_, outside) = call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 1"))).await;
    let (_, also_outside) = call(&app, "POST", "/api/reports", lecturer, Some(hinted)).await;
    assert_eq!(outside["class_id"], json!(campus.class));
    assert_eq!(also_outside["class_id"], json!(campus.class));

    // With IT-1A handed over, EE-1A is the lecturer's only class
    let other = user(&pool, "Ann Other", Role::Lecturer, None).await;
    catalog::assign_class_lecturer(&pool, campus.class, other).await.unwrap();
    let (_, in_stream) = call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 3"))).await;
    assert_eq!(in_stream["class_id"], json!(ee_class));

    let prl_who = Some((prl, Role::Prl));
    let (status, reports) = call(&app, "GET", &format!("/api/reports/prl/{}", prl), prl_who, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["id"], in_stream["id"]);

    let (_, stats) = call(&app, "GET", &format!("/api/reports/prl/{}/stats", prl), prl_who, None).await;
    assert_eq!(stats, json!([{"week": "Week 3", "count": 1}]));

    let feedback = Some(json!({"feedback": "Good pacing"}));
    let uri = format!("/api/reports/{}/feedback", in_stream["id"]);
    let (status, _) = call(&app, "POST", &uri, prl_who, feedback.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/reports/{}/feedback", outside["id"]);
    let (status, _) = call(&app, "POST", &uri, prl_who, feedback).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, monitoring) = call(&app, "GET", &format!("/api/monitoring/prl/{}", prl), prl_who, None).await;
    assert_eq!(monitoring.as_array().unwrap().len(), 1);
    assert_eq!(monitoring[0]["lecturer_id"], json!(campus.lecturer));
    assert_eq!(monitoring[0]["total_reports"], 1);

    let (_, classes) = call(&app, "GET", &format!("/api/classes/prl/{}", prl), prl_who, None).await;
    assert_eq!(classes[0]["class_name"], "EE-1A");
    assert_eq!(classes[0]["student_count"], 0);
}

// =============================================================================
// Report submission
// =============================================================================

#[tokio::test]
async fn test_submission_resolves_assigned_class_and_links_roster() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let lecturer = Some((campus.lecturer, Role::Lecturer));

    let (status, first) = call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["class_id"], json!(campus.class));
    assert_eq!(first["roster_size"], 4);

    let (_, second) = call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 1"))).await;
    assert_ne!(first["id"], second["id"]);
    assert_eq!(second["roster_size"], 4);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM student_reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 8);

    let student = campus.students[0];
    let (_, seen) = call(
        &app,
        "GET",
        &format!("/api/reports/student/{}", student),
        Some((student, Role::Student)),
        None,
    )
    .await;
    let seen = seen.as_array().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0]["class_name"], "IT-1A");
    assert_eq!(seen[0]["course_code"], "DB101");
    assert_eq!(seen[0]["students_present"], 18);
    assert_eq!(seen[0]["lecturer_name"], "Lee Turer");
    assert_eq!(seen[0]["rating"], 0.0);
}

#[tokio::test]
async fn test_unassigned_lecturer_submits_ghost_report() {
    let (app, pool) = setup_app().await;
    let lecturer = user(&pool, "Lee Turer", Role::Lecturer, None).await;

    let (status, receipt) = call(
        &app,
        "POST",
        "/api/reports",
        Some((lecturer, Role::Lecturer)),
        Some(report_body("Week 1")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["class_id"], Value::Null);
    assert_eq!(receipt["roster_size"], 0);

    let (_, reports) = call(
        &app,
        "GET",
        &format!("/api/reports/lecturer/{}", lecturer),
        Some((lecturer, Role::Lecturer)),
        None,
    )
    .await;
    assert_eq!(reports[0]["class_id"], Value::Null);
    assert_eq!(reports[0]["class_name"], "");
    assert_eq!(reports[0]["course_name"], "");
    assert_eq!(reports[0]["lecturer_name"], "Lee Turer");
}

#[tokio::test]
async fn test_submission_validation_and_gates() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let lecturer = Some((campus.lecturer, Role::Lecturer));

    let mut incomplete = report_body("Week 1");
    incomplete["topic_taught"] = json!("   ");
    let (status, body) = call(&app, "POST", "/api/reports", lecturer, Some(incomplete)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("topic_taught"));

    let mut foreign = report_body("Week 1");
    foreign["lecturer_id"] = json!(campus.lecturer + 100);
    let (status, _) = call(&app, "POST", "/api/reports", lecturer, Some(foreign)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let student = Some((campus.students[0], Role::Student));
    let (status, _) = call(&app, "POST", "/api/reports", student, Some(report_body("Week 1"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// =============================================================================
// Ratings and feedback
// =============================================================================

#[tokio::test]
async fn test_rerating_overwrites() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let (_, receipt) = call(
        &app,
        "POST",
        "/api/reports",
        Some((campus.lecturer, Role::Lecturer)),
        Some(report_body("Week 1")),
    )
    .await;
    let rate_uri = format!("/api/reports/{}/rate", receipt["id"]);
    let student = Some((campus.students[0], Role::Student));

    let (status, body) = call(&app, "POST", &rate_uri, student, Some(json!({"rating": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["outcome"], "created");

    let (status, body) = call(&app, "POST", &rate_uri, student, Some(json!({"rating": "5"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "updated");

    let (_, summary) = call(
        &app,
        "GET",
        &format!("/api/reports/{}/ratings", receipt["id"]),
        student,
        None,
    )
    .await;
    assert_eq!(summary, json!({"avg_rating": 5.0, "total_ratings": 1}));

    let (_, mine) = call(
        &app,
        "GET",
        &format!("/api/reports/student/{}/ratings", campus.students[0]),
        student,
        None,
    )
    .await;
    assert_eq!(mine[receipt["id"].to_string()], 5.0);
}

#[tokio::test]
async fn test_rating_unknown_report_is_not_found() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;

    let (status, _) = call(
        &app,
        "POST",
        "/api/reports/999/rate",
        Some((campus.students[0], Role::Student)),
        Some(json!({"rating": 4})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, summary) = call(
        &app,
        "GET",
        "/api/reports/999/ratings",
        Some((campus.students[0], Role::Student)),
        None,
    )
    .await;
    assert_eq!(summary, json!({"avg_rating": 0.0, "total_ratings": 0}));
}

#[tokio::test]
async fn test_foreign_lecturer_feedback_rejected() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let intruder = user(&pool, "Ian Truder", Role::Lecturer, None).await;

    let (_, receipt) = call(
        &app,
        "POST",
        "/api/reports",
        Some((campus.lecturer, Role::Lecturer)),
        Some(report_body("Week 1")),
    )
    .await;
    let uri = format!("/api/reports/{}/feedback", receipt["id"]);

    let (status, body) = call(
        &app,
        "POST",
        &uri,
        Some((intruder, Role::Lecturer)),
        Some(json!({"feedback": "Mine now"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Report not found or you are not authorized");

    let stored: Option<String> = sqlx::query_scalar("SELECT feedback FROM reports WHERE id = ?")
        .bind(receipt["id"].as_i64().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, None);

    let (status, _) = call(
        &app,
        "POST",
        &uri,
        Some((campus.lecturer, Role::Lecturer)),
        Some(json!({"feedback": "Revisit joins"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        "POST",
        &uri,
        Some((campus.students[0], Role::Student)),
        Some(json!({"feedback": "Fun"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Lecturer and student views
// =============================================================================

#[tokio::test]
async fn test_lecturer_and_student_weekly_stats() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let lecturer = Some((campus.lecturer, Role::Lecturer));

    for week in ["Week 2", "Week 1", "Week 2"] {
        call(&app, "POST", "/api/reports", lecturer, Some(report_body(week))).await;
    }

    let expected = json!([
        {"week": "Week 1", "count": 1},
        {"week": "Week 2", "count": 2},
    ]);

    let (_, stats) = call(
        &app,
        "GET",
        &format!("/api/lecturer/{}/stats", campus.lecturer),
        lecturer,
        None,
    )
    .await;
    assert_eq!(stats, expected);

    let student = campus.students[1];
    let (_, stats) = call(
        &app,
        "GET",
        &format!("/api/students/{}/stats", student),
        Some((student, Role::Student)),
        None,
    )
    .await;
    assert_eq!(stats, expected);

    let (_, activity) = call(
        &app,
        "GET",
        &format!("/api/lecturer/{}/monitoring", campus.lecturer),
        lecturer,
        None,
    )
    .await;
    let activity = activity.as_array().unwrap();
    assert_eq!(activity.len(), 3);
    assert_eq!(activity[0]["week_of_reporting"], "Week 1");
    assert_eq!(activity[0]["students_count"], 4);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_writes_are_pl_only() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let pl = Some((campus.pl, Role::Pl));

    let (status, body) = call(&app, "POST", "/api/streams", pl, Some(json!({"name": "Engineering"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());

    let (status, _) = call(
        &app,
        "POST",
        "/api/streams",
        Some((campus.lecturer, Role::Lecturer)),
        Some(json!({"name": "Design"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let duplicate = json!({"name": "Lee Again", "email": "lee.turer@campus.test", "role": "lecturer"});
    let (status, _) = call(&app, "POST", "/api/users", pl, Some(duplicate)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "PUT",
        "/api/classes/999/lecturer",
        pl,
        Some(json!({"lecturer_id": campus.lecturer})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "PUT", &format!("/api/classes/{}/lecturer", campus.class), pl, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_edits_leave_report_snapshots_intact() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let pl = Some((campus.pl, Role::Pl));
    let lecturer = Some((campus.lecturer, Role::Lecturer));

    let (_, receipt) = call(&app, "POST", "/api/reports", lecturer, Some(report_body("Week 1"))).await;
    let report_id = receipt["id"].as_i64().unwrap();

    let (status, classes) = call(&app, "GET", "/api/classes", lecturer, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classes[0]["class_name"], "IT-1A");
    assert_eq!(classes[0]["course_name"], "Databases");
    assert_eq!(classes[0]["lecturer_name"], "Lee Turer");
    let course_id = classes[0]["course_id"].as_i64().unwrap();

    let rename_class = json!({
        "class_name": "IT-9Z",
        "schedule_time": "Fri 14:00",
        "course_id": course_id,
        "lecturer_id": campus.lecturer,
    });
    let uri = format!("/api/classes/{}", campus.class);
    let (status, _) = call(&app, "PUT", &uri, lecturer, Some(rename_class.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, "PUT", &uri, pl, Some(rename_class)).await;
    assert_eq!(status, StatusCode::OK);

    let rename_course = json!({
        "course_name": "Data Systems",
        "course_code": "DS300",
        "faculty_name": "Engineering",
    });
    let uri = format!("/api/courses/{}", course_id);
    let (status, _) = call(&app, "PUT", &uri, pl, Some(rename_course)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, courses) = call(&app, "GET", "/api/courses", lecturer, None).await;
    assert_eq!(courses[0]["course_name"], "Data Systems");
    assert_eq!(courses[0]["program_id"], json!(campus.program));

    let (status, _) = call(&app, "DELETE", &uri, pl, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, "DELETE", &uri, pl, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, classes) = call(&app, "GET", "/api/classes", lecturer, None).await;
    assert_eq!(classes, json!([]));

    let (_, reports) = call(&app, "GET", "/api/reports", lecturer, None).await;
    let stored = reports
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == json!(report_id))
        .unwrap();
    assert_eq!(stored["class_id"], Value::Null);
    assert_eq!(stored["class_name"], "IT-1A");
    assert_eq!(stored["course_name"], "Databases");
    assert_eq!(stored["course_code"], "DB101");
    assert_eq!(stored["faculty_name"], "FICT");
}

#[tokio::test]
async fn test_lecturer_directory_is_for_supervisors() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;

    for uri in ["/api/classes/lecturers", "/api/courses/lecturers"] {
        let (status, body) = call(&app, "GET", uri, Some((campus.pl, Role::Pl)), None).await;
        assert_eq!(status, StatusCode::OK);
        let lecturers = body.as_array().unwrap();
        assert_eq!(lecturers.len(), 1);
        assert_eq!(lecturers[0]["id"], json!(campus.lecturer));
        assert_eq!(lecturers[0]["role"], "lecturer");

        let (status, _) = call(&app, "GET", uri, Some((campus.students[0], Role::Student)), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_malformed_input_uses_error_envelope() {
    let (app, pool) = setup_app().await;
    let campus = campus(&pool).await;
    let lecturer = Some((campus.lecturer, Role::Lecturer));

    let request = Request::builder()
        .method("POST")
        .uri("/api/reports")
        .header("x-lrs-user-id", campus.lecturer.to_string())
        .header("x-lrs-user-role", "lecturer")
        .header("content-type", "application/json")
        .body(Body::from("{\"week_of_reporting\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    // No content-type
    let (status, body) = call(&app, "POST", "/api/reports", lecturer, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = call(&app, "GET", "/api/reports/lecturer/abc", lecturer, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].is_string());
}
