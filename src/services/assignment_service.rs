use crate::dto::admin_dto::{CreateAssignmentPayload, CreateCoursePayload, UpdateAssignmentPayload};
use crate::error::{Error, Result};
use crate::models::assignment::Assignment;
use crate::models::course::Course;
use crate::models::question::{AssignmentKind, Question, QuestionDetails};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct AssignmentService {
    pool: PgPool,
}

impl AssignmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_course(&self, payload: CreateCoursePayload) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"INSERT INTO courses (title, description) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(payload.title)
        .bind(payload.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses =
            sqlx::query_as::<_, Course>(r#"SELECT * FROM courses ORDER BY created_at DESC"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(courses)
    }

    pub async fn get_course(&self, course_id: Uuid) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(r#"SELECT * FROM courses WHERE id = $1"#)
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(course)
    }

    pub async fn create_assignment(
        &self,
        payload: CreateAssignmentPayload,
        created_by: &str,
    ) -> Result<Assignment> {
        validate_questions(payload.kind, &payload.questions)?;

        // Reject assignments under a course that does not exist with a 404
        // instead of a raw FK violation.
        self.get_course(payload.course_id).await?;

        let questions_json = serde_json::to_value(&payload.questions)?;
        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (course_id, title, kind, due_date, day, questions, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.course_id)
        .bind(payload.title)
        .bind(payload.kind.as_str())
        .bind(payload.due_date)
        .bind(payload.day)
        .bind(questions_json)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn list_assignments(&self, course_id: Option<Uuid>) -> Result<Vec<Assignment>> {
        let assignments = sqlx::query_as::<_, Assignment>(
            r#"
            SELECT * FROM assignments
            WHERE ($1::uuid IS NULL OR course_id = $1)
            ORDER BY day ASC, created_at ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    pub async fn get_assignment(&self, assignment_id: Uuid) -> Result<Assignment> {
        let assignment =
            sqlx::query_as::<_, Assignment>(r#"SELECT * FROM assignments WHERE id = $1"#)
                .bind(assignment_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(assignment)
    }

    pub async fn update_assignment(
        &self,
        assignment_id: Uuid,
        payload: UpdateAssignmentPayload,
    ) -> Result<Assignment> {
        let existing = self.get_assignment(assignment_id).await?;

        let kind = AssignmentKind::parse(&existing.kind)
            .ok_or_else(|| Error::Internal(format!("Unknown assignment kind: {}", existing.kind)))?;

        let questions_json = match payload.questions {
            Some(questions) => {
                validate_questions(kind, &questions)?;
                serde_json::to_value(&questions)?
            }
            None => existing.questions,
        };

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET title = $2, due_date = $3, day = $4, questions = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(assignment_id)
        .bind(payload.title.unwrap_or(existing.title))
        .bind(payload.due_date.or(existing.due_date))
        .bind(payload.day.unwrap_or(existing.day))
        .bind(questions_json)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    pub async fn delete_assignment(&self, assignment_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM assignments WHERE id = $1"#)
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Assignment not found".to_string()));
        }
        Ok(())
    }
}

/// Structural checks at authoring time so grading never has to guess:
/// every question must match the assignment kind, and MCQ answer keys must
/// point at a real option.
fn validate_questions(kind: AssignmentKind, questions: &[Question]) -> Result<()> {
    for (index, question) in questions.iter().enumerate() {
        match (kind, &question.details) {
            (AssignmentKind::Mcq, QuestionDetails::Mcq(mc)) => {
                if mc.options.is_empty() {
                    return Err(Error::BadRequest(format!(
                        "Question {} has no options",
                        index + 1
                    )));
                }
                if mc.correct_answer < 0 || mc.correct_answer as usize >= mc.options.len() {
                    return Err(Error::BadRequest(format!(
                        "Question {} has a correct answer outside its options",
                        index + 1
                    )));
                }
            }
            (AssignmentKind::Coding, QuestionDetails::Coding(_)) => {}
            _ => {
                return Err(Error::BadRequest(format!(
                    "Question {} does not match assignment kind '{}'",
                    index + 1,
                    kind.as_str()
                )));
            }
        }
    }
    Ok(())
}
