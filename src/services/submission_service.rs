use crate::error::Result;
use crate::models::question::AssignmentKind;
use crate::models::submission::Submission;
use crate::services::grading_service::{GradeReport, SubmissionDraft};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
}

impl SubmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One row per (assignment, student). A resubmission overwrites the
    /// previous row in a single statement, so concurrent submits from the
    /// same student resolve to last-write-wins without torn state.
    pub async fn upsert(
        &self,
        assignment_id: Uuid,
        kind: AssignmentKind,
        draft: &SubmissionDraft,
        report: &GradeReport,
    ) -> Result<Submission> {
        let (mcq_answers, coding_solution, language): (
            Option<JsonValue>,
            Option<&str>,
            Option<&str>,
        ) = match kind {
            AssignmentKind::Mcq => (Some(serde_json::to_value(&draft.mcq_answers)?), None, None),
            AssignmentKind::Coding => (
                None,
                Some(draft.coding_solution.as_str()),
                Some(draft.language.as_str()),
            ),
        };

        let submission = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (
                assignment_id, student_id, student_name, submitted_at,
                mcq_answers, coding_solution, language,
                result_status, pass_count, total_count, auto_score, graded_cases
            ) VALUES ($1, $2, $3, NOW(), $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (assignment_id, student_id) DO UPDATE SET
                student_name = EXCLUDED.student_name,
                submitted_at = EXCLUDED.submitted_at,
                mcq_answers = EXCLUDED.mcq_answers,
                coding_solution = EXCLUDED.coding_solution,
                language = EXCLUDED.language,
                result_status = EXCLUDED.result_status,
                pass_count = EXCLUDED.pass_count,
                total_count = EXCLUDED.total_count,
                auto_score = EXCLUDED.auto_score,
                graded_cases = EXCLUDED.graded_cases,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(&draft.student_id)
        .bind(&draft.student_name)
        .bind(mcq_answers)
        .bind(coding_solution)
        .bind(language)
        .bind(report.result_status.as_str())
        .bind(report.summary.pass_count)
        .bind(report.summary.total_count)
        .bind(report.auto_score)
        .bind(&report.graded_cases)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    pub async fn find_for_student(
        &self,
        assignment_id: Uuid,
        student_id: &str,
    ) -> Result<Option<Submission>> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE assignment_id = $1 AND student_id = $2"#,
        )
        .bind(assignment_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    pub async fn list_for_assignment(&self, assignment_id: Uuid) -> Result<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE assignment_id = $1 ORDER BY submitted_at DESC"#,
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(submissions)
    }
}
