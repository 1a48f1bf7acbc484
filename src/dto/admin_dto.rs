use crate::models::question::{AssignmentKind, Question};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, message = "Course title cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAssignmentPayload {
    pub course_id: Uuid,
    #[validate(length(min = 1, message = "Assignment title cannot be empty"))]
    pub title: String,
    pub kind: AssignmentKind,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1, message = "Day must be at least 1"))]
    pub day: i32,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssignmentPayload {
    // Empty strings are trimmed away to None rather than stored.
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub title: Option<String>,

    pub due_date: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "Day must be at least 1"))]
    pub day: Option<i32>,

    pub questions: Option<Vec<Question>>,
}

fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
