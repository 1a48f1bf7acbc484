use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::student_dto::{
    AssignmentView, GetAssignmentResponse, RunCodeRequest, RunCodeResponse,
    SubmitAssignmentRequest, SubmitAssignmentResponse, SubmissionView,
};
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::models::question::AssignmentKind;
use crate::models::submission::ResultStatus;
use crate::routes::admin::ListAssignmentsQuery;
use crate::services::executor_service::ExecutionRequest;
use crate::services::grading_service::{GradeReport, SubmissionDraft};
use crate::utils::lang::Language;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> crate::error::Result<Response> {
    let assignments = state
        .assignment_service
        .list_assignments(query.course_id)
        .await?;
    let views: Vec<AssignmentView> = assignments.iter().map(AssignmentView::redact).collect();
    Ok(Json(serde_json::json!({ "items": views })).into_response())
}

#[axum::debug_handler]
pub async fn get_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(assignment_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let assignment = state
        .assignment_service
        .get_assignment(assignment_id)
        .await?;
    let submission = state
        .submission_service
        .find_for_student(assignment_id, &claims.sub)
        .await?;

    let response = GetAssignmentResponse {
        assignment: AssignmentView::redact(&assignment),
        submission: submission.map(SubmissionView::from),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn submit_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(assignment_id): Path<Uuid>,
    Json(req): Json<SubmitAssignmentRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let assignment = state
        .assignment_service
        .get_assignment(assignment_id)
        .await?;
    let kind = AssignmentKind::parse(&assignment.kind).ok_or_else(|| {
        Error::Internal(format!("Unknown assignment kind: {}", assignment.kind))
    })?;

    let draft = SubmissionDraft {
        student_id: claims.sub.clone(),
        student_name: claims.display_name(),
        mcq_answers: req.mcq_answers,
        coding_solution: req.coding_solution,
        language: req.language.unwrap_or(Language::Javascript),
    };

    let questions = assignment.parsed_questions();
    let report = state.grading_service.grade(kind, &questions, &draft).await?;

    let submission = state
        .submission_service
        .upsert(assignment_id, kind, &draft, &report)
        .await?;

    tracing::info!(
        assignment_id = %assignment_id,
        student_id = %draft.student_id,
        result_status = %report.result_status,
        pass_count = report.summary.pass_count,
        total_count = report.summary.total_count,
        "submission graded"
    );

    let response = SubmitAssignmentResponse {
        submission_id: submission.id,
        result_status: report.result_status.as_str().to_string(),
        pass_count: report.summary.pass_count,
        total_count: report.summary.total_count,
        auto_score: report.auto_score,
        message: submission_message(kind, &report),
    };
    Ok(Json(response).into_response())
}

fn submission_message(kind: AssignmentKind, report: &GradeReport) -> String {
    match kind {
        AssignmentKind::Coding => match report.result_status {
            ResultStatus::Success => "All tests passed".to_string(),
            ResultStatus::Partial => format!(
                "{}/{} tests passed",
                report.summary.pass_count, report.summary.total_count
            ),
            ResultStatus::Fail => "0 tests passed or a test raised an error".to_string(),
        },
        AssignmentKind::Mcq => match report.auto_score {
            Some(score) => format!("Assignment submitted. Score: {}%", score),
            None => "Assignment submitted. Score: N/A".to_string(),
        },
    }
}

/// Playground execution: one run of the student's code against their own
/// stdin, no grading involved.
#[axum::debug_handler]
pub async fn run_code(
    State(state): State<AppState>,
    Json(req): Json<RunCodeRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let outcome = state
        .executor
        .execute(&ExecutionRequest {
            language: req.language.as_str().to_string(),
            source: req.source,
            stdin: req.stdin,
        })
        .await?;

    Ok(Json(RunCodeResponse {
        stdout: outcome.stdout,
        stderr: outcome.stderr,
    })
    .into_response())
}
