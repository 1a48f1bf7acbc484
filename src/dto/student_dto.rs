use crate::models::assignment::Assignment;
use crate::models::question::{AnswerOption, AssignmentKind, Question, QuestionDetails, TestCase};
use crate::models::submission::Submission;
use crate::utils::lang::Language;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Assignment as a student sees it: no correct answers, no explanations,
/// no hidden test cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentView {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub kind: String,
    pub due_date: Option<DateTime<Utc>>,
    pub day: i32,
    pub total_questions: usize,
    pub questions: Vec<StudentQuestion>,
    /// Per-language editor boilerplate, present for coding assignments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<AnswerOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl AssignmentView {
    pub fn redact(assignment: &Assignment) -> Self {
        let parsed = assignment.parsed_questions();
        let questions: Vec<StudentQuestion> = parsed.iter().map(redact_question).collect();
        let starter_code = match AssignmentKind::parse(&assignment.kind) {
            Some(AssignmentKind::Coding) => Some(json!({
                "javascript": Language::Javascript.starter_code(),
                "python": Language::Python.starter_code(),
                "java": Language::Java.starter_code(),
                "c": Language::C.starter_code(),
            })),
            _ => None,
        };

        Self {
            id: assignment.id,
            course_id: assignment.course_id,
            title: assignment.title.clone(),
            kind: assignment.kind.clone(),
            due_date: assignment.due_date,
            day: assignment.day,
            total_questions: parsed.len(),
            questions,
            starter_code,
        }
    }
}

fn redact_question(question: &Question) -> StudentQuestion {
    match &question.details {
        QuestionDetails::Mcq(mc) => StudentQuestion {
            question: question.question.clone(),
            options: Some(mc.options.clone()),
            description: None,
            test_cases: None,
        },
        QuestionDetails::Coding(c) => StudentQuestion {
            question: question.question.clone(),
            options: None,
            description: c.description.clone(),
            test_cases: Some(
                c.test_cases
                    .iter()
                    .filter(|tc| !tc.hidden)
                    .cloned()
                    .collect(),
            ),
        },
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitAssignmentRequest {
    /// Question index -> selected option index. Ignored for coding.
    #[serde(default)]
    pub mcq_answers: HashMap<usize, i32>,
    #[serde(default)]
    #[validate(length(max = 100_000, message = "Solution is too large"))]
    pub coding_solution: String,
    pub language: Option<Language>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitAssignmentResponse {
    pub submission_id: Uuid,
    pub result_status: String,
    pub pass_count: i32,
    pub total_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_score: Option<i32>,
    pub message: String,
}

/// The student's own stored submission, echoed back for prefill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionView {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub mcq_answers: Option<serde_json::Value>,
    pub coding_solution: Option<String>,
    pub language: Option<String>,
    pub result_status: String,
    pub pass_count: i32,
    pub total_count: i32,
    pub auto_score: Option<i32>,
    pub graded_cases: Option<serde_json::Value>,
}

impl From<Submission> for SubmissionView {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            submitted_at: s.submitted_at,
            mcq_answers: s.mcq_answers,
            coding_solution: s.coding_solution,
            language: s.language,
            result_status: s.result_status,
            pass_count: s.pass_count,
            total_count: s.total_count,
            auto_score: s.auto_score,
            graded_cases: s.graded_cases,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAssignmentResponse {
    pub assignment: AssignmentView,
    pub submission: Option<SubmissionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunCodeRequest {
    pub language: Language,
    #[validate(length(max = 100_000, message = "Source is too large"))]
    pub source: String,
    #[serde(default)]
    pub stdin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCodeResponse {
    pub stdout: String,
    pub stderr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assignment_with(kind: &str, questions: serde_json::Value) -> Assignment {
        Assignment {
            id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            title: "Week 3".to_string(),
            kind: kind.to_string(),
            due_date: None,
            day: 3,
            questions,
            created_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn redacted_mcq_view_has_no_answer_key() {
        let assignment = assignment_with(
            "mcq",
            json!([{
                "question": "2 + 2?",
                "options": ["3", "4"],
                "correct_answer": 1,
                "explanation": "basic arithmetic"
            }]),
        );
        let view = AssignmentView::redact(&assignment);
        let rendered = serde_json::to_string(&view).unwrap();
        assert!(!rendered.contains("correct_answer"));
        assert!(!rendered.contains("explanation"));
        assert_eq!(view.total_questions, 1);
        assert!(view.starter_code.is_none());
    }

    #[test]
    fn redacted_coding_view_drops_hidden_cases() {
        let assignment = assignment_with(
            "coding",
            json!([{
                "question": "Echo the input",
                "description": "Read a line, print it back",
                "test_cases": [
                    {"input": "a", "output": "a"},
                    {"input": "b", "output": "b", "hidden": true}
                ]
            }]),
        );
        let view = AssignmentView::redact(&assignment);
        let cases = view.questions[0].test_cases.as_ref().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].input, "a");
        assert!(view.starter_code.is_some());
    }
}
