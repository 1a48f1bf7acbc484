use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateAssignmentPayload, CreateCoursePayload, UpdateAssignmentPayload};
use crate::middleware::auth::Claims;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/admin/courses",
    request_body = CreateCoursePayload,
    responses(
        (status = 201, description = "Course created successfully"),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_course(
    State(state): State<AppState>,
    Json(payload): Json<CreateCoursePayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let course = state.assignment_service.create_course(payload).await?;
    Ok((StatusCode::CREATED, Json(course)).into_response())
}

#[axum::debug_handler]
pub async fn list_courses(State(state): State<AppState>) -> crate::error::Result<Response> {
    let courses = state.assignment_service.list_courses().await?;
    Ok(Json(json!({ "items": courses })).into_response())
}

#[axum::debug_handler]
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let course = state.assignment_service.get_course(course_id).await?;
    Ok(Json(course).into_response())
}

#[axum::debug_handler]
pub async fn create_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAssignmentPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let assignment = state
        .assignment_service
        .create_assignment(payload, &claims.sub)
        .await?;
    tracing::info!(
        assignment_id = %assignment.id,
        kind = %assignment.kind,
        "assignment created"
    );
    Ok((StatusCode::CREATED, Json(assignment)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ListAssignmentsQuery {
    pub course_id: Option<Uuid>,
}

#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> crate::error::Result<Response> {
    let assignments = state
        .assignment_service
        .list_assignments(query.course_id)
        .await?;
    Ok(Json(json!({ "items": assignments })).into_response())
}

#[axum::debug_handler]
pub async fn get_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let assignment = state
        .assignment_service
        .get_assignment(assignment_id)
        .await?;
    Ok(Json(assignment).into_response())
}

#[axum::debug_handler]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(payload): Json<UpdateAssignmentPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let assignment = state
        .assignment_service
        .update_assignment(assignment_id, payload)
        .await?;
    Ok(Json(assignment).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/admin/assignments/{id}",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 204, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    state
        .assignment_service
        .delete_assignment(assignment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/admin/assignments/{id}/submissions",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Submissions for the assignment"),
        (status = 404, description = "Assignment not found")
    )
)]
#[axum::debug_handler]
pub async fn list_assignment_submissions(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    // 404 before listing so a bad id doesn't read as "no submissions yet".
    state
        .assignment_service
        .get_assignment(assignment_id)
        .await?;
    let submissions = state
        .submission_service
        .list_for_assignment(assignment_id)
        .await?;
    Ok(Json(json!({ "items": submissions })).into_response())
}
