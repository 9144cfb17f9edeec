use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::UserRole;
use crate::services::exam::{AnswerSet, Exam, Question};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: String,
    pub(crate) role: UserRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Exam as stored. Questions stay raw JSON until [`ExamRow::into_exam`] so a
/// single malformed question surfaces as a typed error instead of a decode
/// failure for the whole row.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ExamRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) passing_score: f64,
    pub(crate) start_date: PrimitiveDateTime,
    pub(crate) end_date: PrimitiveDateTime,
    pub(crate) questions: Json<serde_json::Value>,
    pub(crate) total_questions: i32,
}

impl ExamRow {
    pub(crate) fn into_exam(self) -> Result<Exam, serde_json::Error> {
        let questions: Vec<Question> = serde_json::from_value(self.questions.0)?;

        Ok(Exam {
            id: self.id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            passing_score: self.passing_score,
            start_date: self.start_date,
            end_date: self.end_date,
            questions,
            total_questions: self.total_questions,
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub(crate) struct ExamResult {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) score: f64,
    pub(crate) total_score: f64,
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
    pub(crate) answers: Json<AnswerSet>,
    pub(crate) submitted_at: PrimitiveDateTime,
}

/// A result joined with its exam's title, for listings.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ResultWithExam {
    #[sqlx(flatten)]
    pub(crate) result: ExamResult,
    pub(crate) exam_title: String,
}

/// Aggregate over every result of one exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, FromRow)]
pub(crate) struct ResultTotals {
    pub(crate) submissions: i64,
    pub(crate) passed: i64,
    pub(crate) percentage_sum: i64,
}
