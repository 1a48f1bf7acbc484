use serde::{Deserialize, Serialize};

/// A single authored question. The containing assignment decides how the
/// untagged `details` payload is interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(flatten)]
    pub details: QuestionDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Mcq,
    Coding,
}

impl AssignmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcq => "mcq",
            Self::Coding => "coding",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mcq" => Some(Self::Mcq),
            "coding" => Some(Self::Coding),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionDetails {
    Mcq(McqDetails),
    Coding(CodingDetails),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqDetails {
    pub options: Vec<AnswerOption>,
    pub correct_answer: i32,
    pub explanation: Option<String>,
}

/// Options arrive either as plain strings or as `{text, image}` objects.
/// Resolved once here, never re-sniffed at comparison sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerOption {
    Text(String),
    WithImage { text: String, image: String },
}

impl AnswerOption {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) => t,
            Self::WithImage { text, .. } => text,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::WithImage { image, .. } => Some(image),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodingDetails {
    #[serde(default)]
    pub description: Option<String>,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub hidden: bool,
}
