use crate::error::Result;
use crate::models::question::{AssignmentKind, Question, QuestionDetails, TestCase};
use crate::models::submission::ResultStatus;
use crate::services::executor_service::{CodeExecutor, ExecutionRequest};
use crate::utils::lang::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Everything the student handed in, collected into one immutable value
/// before grading starts. Handlers build it once and never mutate it.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub student_id: String,
    pub student_name: String,
    pub mcq_answers: HashMap<usize, i32>,
    pub coding_solution: String,
    pub language: Language,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSummary {
    pub pass_count: i32,
    pub total_count: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    WrongOutput,
    HardError,
    TransportError,
}

/// Per-test-case record kept for auditing. Inputs and expected outputs are
/// deliberately not copied here so hidden cases stay hidden.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedCase {
    pub index: usize,
    pub hidden: bool,
    pub passed: bool,
    pub hard_error: bool,
    pub outcome: CaseOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedMcq {
    pub index: usize,
    pub selected: Option<i32>,
    pub correct: bool,
}

#[derive(Debug, Clone)]
pub struct GradeReport {
    pub result_status: ResultStatus,
    pub summary: TestSummary,
    pub auto_score: Option<i32>,
    pub graded_cases: JsonValue,
}

#[derive(Clone)]
pub struct GradingService {
    executor: Arc<dyn CodeExecutor>,
    concurrency: usize,
}

impl GradingService {
    pub fn new(executor: Arc<dyn CodeExecutor>, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn grade(
        &self,
        kind: AssignmentKind,
        questions: &[Question],
        draft: &SubmissionDraft,
    ) -> Result<GradeReport> {
        match kind {
            AssignmentKind::Mcq => {
                let (summary, graded) = grade_mcq(questions, &draft.mcq_answers);
                let result_status = classify(kind, &summary, false);
                Ok(GradeReport {
                    result_status,
                    auto_score: auto_score(&summary),
                    graded_cases: serde_json::to_value(graded)?,
                    summary,
                })
            }
            AssignmentKind::Coding => {
                let cases = flatten_test_cases(questions);
                let (summary, graded, had_hard_error) = self
                    .run_test_cases(draft.language, &draft.coding_solution, &cases)
                    .await;
                let result_status = classify(kind, &summary, had_hard_error);
                Ok(GradeReport {
                    result_status,
                    auto_score: auto_score(&summary),
                    graded_cases: serde_json::to_value(graded)?,
                    summary,
                })
            }
        }
    }

    /// Runs every test case against the executor. Cases are independent, so
    /// they are dispatched concurrently behind a semaphore and joined before
    /// classification; results are re-ordered by case index.
    async fn run_test_cases(
        &self,
        language: Language,
        source: &str,
        cases: &[TestCase],
    ) -> (TestSummary, Vec<GradedCase>, bool) {
        let total_count = cases.len();

        // Pre-fill with the worst case so a lost task reads as a transport
        // failure instead of poisoning the whole attempt.
        let mut graded: Vec<GradedCase> = cases
            .iter()
            .enumerate()
            .map(|(index, case)| GradedCase {
                index,
                hidden: case.hidden,
                passed: false,
                hard_error: false,
                outcome: CaseOutcome::TransportError,
            })
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        // Dropping the set aborts outstanding executor calls, so a dropped
        // request cancels its in-flight grading work.
        let mut join_set = JoinSet::new();

        for (index, case) in cases.iter().enumerate() {
            let semaphore = semaphore.clone();
            let executor = self.executor.clone();
            let request = ExecutionRequest {
                language: language.as_str().to_string(),
                source: source.to_string(),
                stdin: case.input.clone(),
            };
            let expected = case.output.clone();

            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("executor semaphore closed");
                let result = executor.execute(&request).await;
                (index, expected, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let Ok((index, expected, result)) = joined else {
                tracing::warn!("test case task aborted before completion");
                continue;
            };

            match result {
                Ok(outcome) => {
                    let actual = outcome.stdout.trim().to_lowercase();
                    let passed = actual == expected.trim().to_lowercase();
                    let hard_error = !outcome.stderr.trim().is_empty();
                    let label = if passed {
                        CaseOutcome::Passed
                    } else if hard_error {
                        CaseOutcome::HardError
                    } else {
                        CaseOutcome::WrongOutput
                    };
                    graded[index].passed = passed;
                    graded[index].hard_error = hard_error;
                    graded[index].outcome = label;
                }
                Err(err) => {
                    // Degrades to a failed case, never aborts the attempt.
                    tracing::warn!(case = index, error = %err, "test case execution failed");
                }
            }
        }

        let pass_count = graded.iter().filter(|c| c.passed).count() as i32;
        let had_hard_error = graded.iter().any(|c| c.hard_error);
        (
            TestSummary {
                pass_count,
                total_count: total_count as i32,
            },
            graded,
            had_hard_error,
        )
    }
}

/// All test cases across all questions of a coding assignment, in authored
/// order. Hidden and visible cases are indistinguishable at grading time.
pub fn flatten_test_cases(questions: &[Question]) -> Vec<TestCase> {
    questions
        .iter()
        .filter_map(|q| match &q.details {
            QuestionDetails::Coding(details) => Some(details.test_cases.clone()),
            QuestionDetails::Mcq(_) => None,
        })
        .flatten()
        .collect()
}

pub fn grade_mcq(
    questions: &[Question],
    answers: &HashMap<usize, i32>,
) -> (TestSummary, Vec<GradedMcq>) {
    let mut graded = Vec::with_capacity(questions.len());
    let mut pass_count = 0;

    for (index, question) in questions.iter().enumerate() {
        let selected = answers.get(&index).copied();
        // A question without a usable correct answer contributes nothing.
        let correct = match &question.details {
            QuestionDetails::Mcq(mc) => selected == Some(mc.correct_answer),
            QuestionDetails::Coding(_) => false,
        };
        if correct {
            pass_count += 1;
        }
        graded.push(GradedMcq {
            index,
            selected,
            correct,
        });
    }

    (
        TestSummary {
            pass_count,
            total_count: questions.len() as i32,
        },
        graded,
    )
}

pub fn classify(kind: AssignmentKind, summary: &TestSummary, had_hard_error: bool) -> ResultStatus {
    if summary.total_count > 0 && summary.pass_count == summary.total_count {
        // A full pass is never downgraded, stderr or not.
        ResultStatus::Success
    } else if summary.pass_count > 0 && (kind == AssignmentKind::Mcq || !had_hard_error) {
        ResultStatus::Partial
    } else {
        ResultStatus::Fail
    }
}

pub fn auto_score(summary: &TestSummary) -> Option<i32> {
    if summary.total_count > 0 {
        Some(((summary.pass_count as f64 / summary.total_count as f64) * 100.0).round() as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerOption, CodingDetails, McqDetails};
    use crate::services::executor_service::{ExecutionOutcome, MockCodeExecutor};

    fn mcq_question(correct: i32) -> Question {
        Question {
            question: "pick one".to_string(),
            details: QuestionDetails::Mcq(McqDetails {
                options: vec![
                    AnswerOption::Text("a".into()),
                    AnswerOption::Text("b".into()),
                    AnswerOption::Text("c".into()),
                    AnswerOption::Text("d".into()),
                ],
                correct_answer: correct,
                explanation: None,
            }),
        }
    }

    fn coding_question(cases: Vec<TestCase>) -> Question {
        Question {
            question: "solve it".to_string(),
            details: QuestionDetails::Coding(CodingDetails {
                description: None,
                test_cases: cases,
            }),
        }
    }

    fn case(input: &str, output: &str) -> TestCase {
        TestCase {
            input: input.to_string(),
            output: output.to_string(),
            hidden: false,
        }
    }

    fn draft(language: Language) -> SubmissionDraft {
        SubmissionDraft {
            student_id: "stu-1".to_string(),
            student_name: "Student One".to_string(),
            mcq_answers: HashMap::new(),
            coding_solution: "print(input())".to_string(),
            language,
        }
    }

    fn answers(pairs: &[(usize, i32)]) -> HashMap<usize, i32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn mcq_all_correct_is_success_with_full_score() {
        let questions: Vec<Question> = [1, 0, 2, 3].into_iter().map(mcq_question).collect();
        let submitted = answers(&[(0, 1), (1, 0), (2, 2), (3, 3)]);

        let (summary, graded) = grade_mcq(&questions, &submitted);
        assert_eq!(summary, TestSummary { pass_count: 4, total_count: 4 });
        assert!(graded.iter().all(|g| g.correct));
        assert_eq!(
            classify(AssignmentKind::Mcq, &summary, false),
            ResultStatus::Success
        );
        assert_eq!(auto_score(&summary), Some(100));
    }

    #[test]
    fn mcq_half_correct_is_partial() {
        let questions: Vec<Question> = [1, 0, 2, 3].into_iter().map(mcq_question).collect();
        let submitted = answers(&[(0, 1), (1, 1), (2, 2), (3, 0)]);

        let (summary, _) = grade_mcq(&questions, &submitted);
        assert_eq!(summary, TestSummary { pass_count: 2, total_count: 4 });
        assert_eq!(
            classify(AssignmentKind::Mcq, &summary, false),
            ResultStatus::Partial
        );
        assert_eq!(auto_score(&summary), Some(50));
    }

    #[test]
    fn mcq_unanswered_and_out_of_range_count_zero() {
        let questions: Vec<Question> = [1, 0].into_iter().map(mcq_question).collect();
        let submitted = answers(&[(1, 9)]);

        let (summary, graded) = grade_mcq(&questions, &submitted);
        assert_eq!(summary, TestSummary { pass_count: 0, total_count: 2 });
        assert_eq!(graded[0].selected, None);
        assert_eq!(graded[1].selected, Some(9));
        assert_eq!(
            classify(AssignmentKind::Mcq, &summary, false),
            ResultStatus::Fail
        );
    }

    #[test]
    fn malformed_question_contributes_zero_but_counts_toward_total() {
        let questions = vec![mcq_question(0), coding_question(vec![])];
        let submitted = answers(&[(0, 0), (1, 0)]);

        let (summary, _) = grade_mcq(&questions, &submitted);
        assert_eq!(summary, TestSummary { pass_count: 1, total_count: 2 });
    }

    #[test]
    fn regrading_same_answers_is_idempotent() {
        let questions: Vec<Question> = [1, 0, 2, 3].into_iter().map(mcq_question).collect();
        let submitted = answers(&[(0, 1), (1, 1)]);

        let first = grade_mcq(&questions, &submitted);
        let second = grade_mcq(&questions, &submitted);
        assert_eq!(first.0, second.0);
    }

    #[test]
    fn auto_score_rounds_to_nearest_integer() {
        assert_eq!(
            auto_score(&TestSummary { pass_count: 1, total_count: 3 }),
            Some(33)
        );
        assert_eq!(
            auto_score(&TestSummary { pass_count: 2, total_count: 3 }),
            Some(67)
        );
        assert_eq!(
            auto_score(&TestSummary { pass_count: 0, total_count: 0 }),
            None
        );
    }

    #[test]
    fn classifier_tie_breaks() {
        let partial = TestSummary { pass_count: 1, total_count: 3 };
        // Hard error downgrades partial to fail for coding only.
        assert_eq!(
            classify(AssignmentKind::Coding, &partial, true),
            ResultStatus::Fail
        );
        assert_eq!(
            classify(AssignmentKind::Coding, &partial, false),
            ResultStatus::Partial
        );
        assert_eq!(
            classify(AssignmentKind::Mcq, &partial, true),
            ResultStatus::Partial
        );

        // A full pass is never downgraded.
        let full = TestSummary { pass_count: 3, total_count: 3 };
        assert_eq!(
            classify(AssignmentKind::Coding, &full, true),
            ResultStatus::Success
        );

        // Zero cases configured can only fail.
        let empty = TestSummary { pass_count: 0, total_count: 0 };
        assert_eq!(
            classify(AssignmentKind::Coding, &empty, false),
            ResultStatus::Fail
        );
    }

    #[test]
    fn flatten_preserves_authored_order() {
        let questions = vec![
            coding_question(vec![case("1", "a"), case("2", "b")]),
            coding_question(vec![case("3", "c")]),
        ];
        let flat = flatten_test_cases(&questions);
        let inputs: Vec<&str> = flat.iter().map(|c| c.input.as_str()).collect();
        assert_eq!(inputs, vec!["1", "2", "3"]);
    }

    fn scripted_executor<F>(script: F) -> Arc<MockCodeExecutor>
    where
        F: Fn(&str) -> Result<ExecutionOutcome> + Send + Sync + 'static,
    {
        let mut mock = MockCodeExecutor::new();
        mock.expect_execute()
            .returning(move |req| script(&req.stdin));
        Arc::new(mock)
    }

    fn ok_outcome(stdout: &str, stderr: &str) -> Result<ExecutionOutcome> {
        Ok(ExecutionOutcome {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            status: Some("ok".to_string()),
        })
    }

    #[tokio::test]
    async fn coding_all_pass_is_success() {
        let questions = vec![coding_question(vec![
            case("1", "one"),
            case("2", "two"),
            case("3", "three"),
        ])];
        let executor = scripted_executor(|stdin| match stdin {
            "1" => ok_outcome("one", ""),
            "2" => ok_outcome("two", ""),
            _ => ok_outcome("three", ""),
        });
        let service = GradingService::new(executor, 2);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Python))
            .await
            .unwrap();

        assert_eq!(report.result_status, ResultStatus::Success);
        assert_eq!(report.summary, TestSummary { pass_count: 3, total_count: 3 });
        assert_eq!(report.auto_score, Some(100));
    }

    #[tokio::test]
    async fn hard_error_downgrades_partial_to_fail() {
        let questions = vec![coding_question(vec![
            case("1", "one"),
            case("2", "two"),
            case("3", "three"),
        ])];
        // One pass, one mismatch, one case with stderr.
        let executor = scripted_executor(|stdin| match stdin {
            "1" => ok_outcome("one", ""),
            "2" => ok_outcome("wrong", ""),
            _ => ok_outcome("", "Traceback (most recent call last)"),
        });
        let service = GradingService::new(executor, 2);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Python))
            .await
            .unwrap();

        assert_eq!(report.result_status, ResultStatus::Fail);
        assert_eq!(report.summary, TestSummary { pass_count: 1, total_count: 3 });
        assert_eq!(report.auto_score, Some(33));
    }

    #[tokio::test]
    async fn transport_failure_fails_case_without_hard_error() {
        let questions = vec![coding_question(vec![case("1", "one"), case("2", "two")])];
        let executor = scripted_executor(|stdin| match stdin {
            "1" => ok_outcome("one", ""),
            _ => Err(crate::error::Error::Executor(
                "execution endpoint returned 503".to_string(),
            )),
        });
        let service = GradingService::new(executor, 2);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Python))
            .await
            .unwrap();

        // Transport failures are not hard errors, so one pass stays partial.
        assert_eq!(report.result_status, ResultStatus::Partial);
        assert_eq!(report.summary, TestSummary { pass_count: 1, total_count: 2 });
        let cases: Vec<GradedCase> =
            serde_json::from_value(report.graded_cases.clone()).unwrap();
        assert_eq!(cases[1].outcome, CaseOutcome::TransportError);
        assert!(!cases[1].hard_error);
    }

    #[tokio::test]
    async fn comparison_trims_and_ignores_case() {
        let questions = vec![coding_question(vec![case("1", "  Hello World \n")])];
        let executor = scripted_executor(|_| ok_outcome("\nhello world  ", ""));
        let service = GradingService::new(executor, 1);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::C))
            .await
            .unwrap();
        assert_eq!(report.result_status, ResultStatus::Success);
    }

    #[tokio::test]
    async fn passing_case_with_stderr_still_counts_the_pass() {
        let questions = vec![coding_question(vec![case("1", "one"), case("2", "two")])];
        let executor = scripted_executor(|stdin| match stdin {
            "1" => ok_outcome("one", "warning: deprecated"),
            _ => ok_outcome("two", ""),
        });
        let service = GradingService::new(executor, 2);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Java))
            .await
            .unwrap();

        // Full pass wins even though a case raised stderr.
        assert_eq!(report.summary.pass_count, 2);
        assert_eq!(report.result_status, ResultStatus::Success);
    }

    #[tokio::test]
    async fn zero_test_cases_fails_with_no_score() {
        let questions = vec![coding_question(vec![])];
        let executor = Arc::new(MockCodeExecutor::new());
        let service = GradingService::new(executor, 2);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Python))
            .await
            .unwrap();

        assert_eq!(report.summary, TestSummary { pass_count: 0, total_count: 0 });
        assert_eq!(report.auto_score, None);
        assert_eq!(report.result_status, ResultStatus::Fail);
    }

    #[tokio::test]
    async fn graded_cases_keep_authored_order() {
        let questions = vec![
            coding_question(vec![case("1", "one"), case("2", "two")]),
            coding_question(vec![case("3", "three")]),
        ];
        let executor = scripted_executor(|stdin| match stdin {
            "1" => ok_outcome("one", ""),
            "2" => ok_outcome("nope", ""),
            _ => ok_outcome("three", ""),
        });
        let service = GradingService::new(executor, 3);

        let report = service
            .grade(AssignmentKind::Coding, &questions, &draft(Language::Python))
            .await
            .unwrap();
        let cases: Vec<GradedCase> = serde_json::from_value(report.graded_cases).unwrap();
        assert_eq!(
            cases.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(cases[0].passed);
        assert!(!cases[1].passed);
        assert!(cases[2].passed);
    }
}
