use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{ExamResult, ResultWithExam};
use crate::services::exam::{AnswerSet, AnswerValue, Exam};
use crate::services::scoring::{QuestionOutcome, QuestionReview};

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitExamRequest {
    /// Raw payload; shape is checked by the submission pipeline. Any score
    /// fields a client sends alongside are ignored.
    #[serde(default)]
    pub(crate) answers: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct ResultsQuery {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub(crate) user_id: Option<String>,
    #[validate(length(min = 1, message = "exam_id must not be empty"))]
    pub(crate) exam_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) score: f64,
    pub(crate) total_score: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
    pub(crate) answers: AnswerSet,
    pub(crate) submitted_at: String,
}

impl From<ExamResult> for ResultResponse {
    fn from(result: ExamResult) -> Self {
        Self {
            id: result.id,
            user_id: result.user_id,
            exam_id: result.exam_id,
            score: result.score,
            total_score: result.total_score,
            percentage: result.percentage,
            passed: result.passed,
            answers: result.answers.0,
            submitted_at: format_primitive(result.submitted_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultListItem {
    #[serde(flatten)]
    pub(crate) result: ResultResponse,
    pub(crate) exam_title: String,
}

impl From<ResultWithExam> for ResultListItem {
    fn from(row: ResultWithExam) -> Self {
        Self { result: ResultResponse::from(row.result), exam_title: row.exam_title }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionReviewResponse {
    pub(crate) question_id: String,
    #[serde(rename = "type")]
    pub(crate) question_type: &'static str,
    pub(crate) prompt: String,
    pub(crate) points: f64,
    pub(crate) earned: f64,
    pub(crate) outcome: QuestionOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) options: Vec<String>,
    pub(crate) submitted: Option<AnswerValue>,
    pub(crate) correct_answer: Option<AnswerValue>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResultReviewResponse {
    pub(crate) exam_title: String,
    #[serde(flatten)]
    pub(crate) result: ResultResponse,
    pub(crate) questions: Vec<QuestionReviewResponse>,
}

impl ResultReviewResponse {
    pub(crate) fn build(exam: &Exam, result: ExamResult, reviews: Vec<QuestionReview>) -> Self {
        let questions = exam
            .questions
            .iter()
            .zip(reviews)
            .map(|(question, review)| QuestionReviewResponse {
                question_id: review.question_id,
                question_type: question.kind.type_name(),
                prompt: question.prompt.clone(),
                points: review.points,
                earned: review.earned,
                outcome: review.outcome,
                options: question.kind.options().to_vec(),
                submitted: review.submitted,
                correct_answer: review.correct_answer,
            })
            .collect();

        Self { exam_title: exam.title.clone(), result: ResultResponse::from(result), questions }
    }
}
