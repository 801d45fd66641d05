//! Catalog endpoints
//!
//! Writes are Program Leader only. Class and course listings are open to any
//! authenticated caller; the lecturer directory to supervisors.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use lrs_common::db::{Stream, User};
use lrs_common::Role;
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::extract::{ApiJson, ApiPath};
use super::principal::AuthPrincipal;
use crate::catalog::{
    self, ClassListing, CourseListing, NewClass, NewCourse, NewProgram, NewUser,
};
use crate::coerce;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct AssignedResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NewStream {
    #[serde(default, deserialize_with = "coerce::lenient_text")]
    pub name: Option<String>,
}

/// Body of the assignment endpoints; which id is read depends on the route
#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub lecturer_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "coerce::lenient_id")]
    pub stream_id: Option<i64>,
}

fn field(value: Option<i64>, name: &str) -> ApiResult<i64> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing required fields: {}", name)))
}

fn created(id: i64) -> (StatusCode, Json<CreatedResponse>) {
    (StatusCode::CREATED, Json(CreatedResponse { id }))
}

fn assigned(message: String) -> Json<AssignedResponse> {
    Json(AssignedResponse { message })
}

type Created = ApiResult<(StatusCode, Json<CreatedResponse>)>;

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(user): ApiJson<NewUser>,
) -> Created {
    principal.require_role(Role::Pl)?;
    Ok(created(catalog::create_user(&state.db, &user).await?))
}

/// POST /api/programs
pub async fn create_program(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(program): ApiJson<NewProgram>,
) -> Created {
    principal.require_role(Role::Pl)?;
    Ok(created(catalog::create_program(&state.db, &program).await?))
}

/// POST /api/streams
pub async fn create_stream(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(stream): ApiJson<NewStream>,
) -> Created {
    principal.require_role(Role::Pl)?;
    let name = stream.name.unwrap_or_default();
    Ok(created(catalog::create_stream(&state.db, &name).await?))
}

/// POST /api/courses
pub async fn create_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(course): ApiJson<NewCourse>,
) -> Created {
    principal.require_role(Role::Pl)?;
    Ok(created(catalog::create_course(&state.db, &course).await?))
}

/// POST /api/classes
pub async fn create_class(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiJson(class): ApiJson<NewClass>,
) -> Created {
    principal.require_role(Role::Pl)?;
    Ok(created(catalog::create_class(&state.db, &class).await?))
}

/// PUT /api/prl/:id/stream
pub async fn assign_prl_stream(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(prl_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    let stream_id = field(request.stream_id, "stream_id")?;

    catalog::assign_prl_stream(&state.db, prl_id, stream_id).await?;
    Ok(assigned(format!("PRL {} assigned to stream {}", prl_id, stream_id)))
}

/// PUT /api/classes/:id/lecturer
pub async fn assign_class_lecturer(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(class_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    let lecturer_id = field(request.lecturer_id, "lecturer_id")?;

    catalog::assign_class_lecturer(&state.db, class_id, lecturer_id).await?;
    Ok(assigned(format!("Lecturer {} assigned to class {}", lecturer_id, class_id)))
}

/// PUT /api/classes/:id/course
pub async fn assign_class_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(class_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    let course_id = field(request.course_id, "course_id")?;

    catalog::assign_class_course(&state.db, class_id, course_id).await?;
    Ok(assigned(format!("Course {} assigned to class {}", course_id, class_id)))
}

/// PUT /api/courses/:id/lecturer
pub async fn assign_course_lecturer(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignRequest>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    let lecturer_id = field(request.lecturer_id, "lecturer_id")?;

    catalog::assign_course_lecturer(&state.db, course_id, lecturer_id).await?;
    Ok(assigned(format!("Lecturer {} assigned to course {}", lecturer_id, course_id)))
}

/// PUT /api/classes/:id
pub async fn update_class(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(class_id): ApiPath<i64>,
    ApiJson(class): ApiJson<NewClass>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    catalog::update_class(&state.db, class_id, &class).await?;
    Ok(assigned(format!("Class {} updated", class_id)))
}

/// PUT /api/courses/:id
pub async fn update_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(course_id): ApiPath<i64>,
    ApiJson(course): ApiJson<NewCourse>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    catalog::update_course(&state.db, course_id, &course).await?;
    Ok(assigned(format!("Course {} updated", course_id)))
}

/// DELETE /api/courses/:id
///
/// Cascades to the course's classes; stored reports keep their snapshot.
pub async fn delete_course(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    ApiPath(course_id): ApiPath<i64>,
) -> ApiResult<Json<AssignedResponse>> {
    principal.require_role(Role::Pl)?;
    catalog::delete_course(&state.db, course_id).await?;
    Ok(assigned(format!("Course {} deleted", course_id)))
}

/// GET /api/classes
pub async fn list_classes(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
) -> ApiResult<Json<Vec<ClassListing>>> {
    Ok(Json(catalog::list_classes(&state.db).await?))
}

/// GET /api/courses
pub async fn list_courses(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
) -> ApiResult<Json<Vec<CourseListing>>> {
    Ok(Json(catalog::list_courses(&state.db).await?))
}

/// GET /api/streams
pub async fn list_streams(
    State(state): State<AppState>,
    AuthPrincipal(_principal): AuthPrincipal,
) -> ApiResult<Json<Vec<Stream>>> {
    Ok(Json(catalog::list_streams(&state.db).await?))
}

/// GET /api/classes/lecturers, GET /api/courses/lecturers
pub async fn list_lecturers(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> ApiResult<Json<Vec<User>>> {
    if !principal.role.is_supervisor() {
        return Err(ApiError::Forbidden(format!(
            "role '{}' may not list lecturers",
            principal.role
        )));
    }
    Ok(Json(catalog::list_lecturers(&state.db).await?))
}
