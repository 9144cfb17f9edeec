use serde::Serialize;
use time::PrimitiveDateTime;

use crate::core::time::format_primitive;
use crate::services::availability::ExamAvailability;
use crate::services::exam::{Exam, Question};

/// Question as shown to a student taking the exam. Carries no answer key.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionView {
    pub(crate) id: String,
    #[serde(rename = "type")]
    pub(crate) question_type: &'static str,
    pub(crate) prompt: String,
    pub(crate) points: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            question_type: question.kind.type_name(),
            prompt: question.prompt.clone(),
            points: question.points,
            options: question.kind.options().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamSummary {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: f64,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
    pub(crate) total_questions: i32,
    pub(crate) status: ExamAvailability,
}

impl ExamSummary {
    pub(crate) fn from_exam(exam: &Exam, now: PrimitiveDateTime) -> Self {
        Self {
            id: exam.id.clone(),
            title: exam.title.clone(),
            description: exam.description.clone(),
            duration_minutes: exam.duration_minutes,
            passing_score: exam.passing_score,
            start_date: format_primitive(exam.start_date),
            end_date: format_primitive(exam.end_date),
            total_questions: exam.total_questions,
            status: exam.status_at(now),
        }
    }
}

/// Questions are only filled in while the exam is open, or for staff.
#[derive(Debug, Serialize)]
pub(crate) struct ExamView {
    #[serde(flatten)]
    pub(crate) summary: ExamSummary,
    pub(crate) questions: Vec<QuestionView>,
}

impl ExamView {
    pub(crate) fn from_exam(exam: &Exam, now: PrimitiveDateTime, is_staff: bool) -> Self {
        let summary = ExamSummary::from_exam(exam, now);
        let questions = if is_staff || summary.status.accepts_submissions() {
            exam.questions.iter().map(QuestionView::from).collect()
        } else {
            Vec::new()
        };

        Self { summary, questions }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamStatusResponse {
    pub(crate) exam_id: String,
    pub(crate) status: ExamAvailability,
    pub(crate) now: String,
    pub(crate) start_date: String,
    pub(crate) end_date: String,
}
