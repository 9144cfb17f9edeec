//! Deterministic scoring of an answer set against an exam's answer key.
//!
//! Everything here is pure: no clock, no randomness, no I/O. The same
//! `(exam, answers)` pair always produces the same [`ScoreReport`].

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::services::exam::{AnswerSet, AnswerValue, Exam, Question, QuestionKind};

/// Share of an essay's points awarded when the answer clears the length bar.
pub const ESSAY_CREDIT_RATIO: f64 = 0.8;

/// An essay answer must be strictly longer than this many characters after
/// trimming to earn credit.
pub const ESSAY_MIN_TRIMMED_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreReport {
    pub earned_score: f64,
    pub total_score: f64,
    pub percentage: i32,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("exam has no questions")]
    EmptyExam,
    #[error("question at position {position} has no id")]
    UnidentifiedQuestion { position: usize },
    #[error("question id '{0}' appears more than once")]
    DuplicateQuestionId(String),
    #[error("question '{id}' is invalid: {reason}")]
    InvalidQuestion { id: String, reason: &'static str },
    #[error("exam questions add up to zero points")]
    DegenerateExam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    /// Essay long enough to earn the fixed share of its points.
    Credited,
    /// Essay present but too short, or not text at all.
    Insufficient,
    Unanswered,
    /// Question type the engine cannot grade.
    Ungradable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionReview {
    pub question_id: String,
    pub outcome: QuestionOutcome,
    pub earned: f64,
    pub points: f64,
    pub submitted: Option<AnswerValue>,
    /// Expected answer in the same shape a student would submit it. Essays
    /// expose their reference text, if any.
    pub correct_answer: Option<AnswerValue>,
}

/// Checks the invariants scoring relies on.
pub fn validate_exam(exam: &Exam) -> Result<(), ScoringError> {
    if exam.questions.is_empty() {
        return Err(ScoringError::EmptyExam);
    }

    let mut seen = HashSet::with_capacity(exam.questions.len());
    for (position, question) in exam.questions.iter().enumerate() {
        if question.id.trim().is_empty() {
            return Err(ScoringError::UnidentifiedQuestion { position });
        }
        if !seen.insert(question.id.as_str()) {
            return Err(ScoringError::DuplicateQuestionId(question.id.clone()));
        }
        validate_question(question)?;
    }

    Ok(())
}

fn validate_question(question: &Question) -> Result<(), ScoringError> {
    let invalid = |reason| ScoringError::InvalidQuestion { id: question.id.clone(), reason };

    if !question.points.is_finite() || question.points < 0.0 {
        return Err(invalid("points must be a finite, non-negative number"));
    }

    if let QuestionKind::MultipleChoice { options, correct_answer } = &question.kind {
        if options.is_empty() {
            return Err(invalid("multiple choice question has no options"));
        }
        if *correct_answer >= options.len() {
            return Err(invalid("correct option index is out of range"));
        }
    }

    Ok(())
}

/// Grades one question. Returns the outcome and the points earned.
pub fn grade_question(question: &Question, answer: Option<&AnswerValue>) -> (QuestionOutcome, f64) {
    let Some(answer) = answer else {
        let outcome = match question.kind {
            QuestionKind::Unsupported => QuestionOutcome::Ungradable,
            _ => QuestionOutcome::Unanswered,
        };
        return (outcome, 0.0);
    };

    match (&question.kind, answer) {
        (QuestionKind::MultipleChoice { correct_answer, .. }, AnswerValue::Index(index))
            if *index == *correct_answer as u64 =>
        {
            (QuestionOutcome::Correct, question.points)
        }
        (QuestionKind::TrueFalse { correct_answer }, AnswerValue::Flag(flag))
            if flag == correct_answer =>
        {
            (QuestionOutcome::Correct, question.points)
        }
        (QuestionKind::MultipleChoice { .. } | QuestionKind::TrueFalse { .. }, _) => {
            (QuestionOutcome::Incorrect, 0.0)
        }
        (QuestionKind::Essay { .. }, AnswerValue::Text(text))
            if text.trim().chars().count() > ESSAY_MIN_TRIMMED_CHARS =>
        {
            (QuestionOutcome::Credited, question.points * ESSAY_CREDIT_RATIO)
        }
        (QuestionKind::Essay { .. }, _) => (QuestionOutcome::Insufficient, 0.0),
        (QuestionKind::Unsupported, _) => (QuestionOutcome::Ungradable, 0.0),
    }
}

/// Per-question breakdown in the exam's stored order.
pub fn review_answers(
    exam: &Exam,
    answers: &AnswerSet,
) -> Result<Vec<QuestionReview>, ScoringError> {
    validate_exam(exam)?;

    Ok(exam
        .questions
        .iter()
        .map(|question| {
            let submitted = answers.get(&question.id);
            let (outcome, earned) = grade_question(question, submitted);
            QuestionReview {
                question_id: question.id.clone(),
                outcome,
                earned,
                points: question.points,
                submitted: submitted.cloned(),
                correct_answer: expected_answer(&question.kind),
            }
        })
        .collect())
}

fn expected_answer(kind: &QuestionKind) -> Option<AnswerValue> {
    match kind {
        QuestionKind::MultipleChoice { correct_answer, .. } => {
            Some(AnswerValue::Index(*correct_answer as u64))
        }
        QuestionKind::TrueFalse { correct_answer } => Some(AnswerValue::Flag(*correct_answer)),
        QuestionKind::Essay { correct_answer } => correct_answer.clone().map(AnswerValue::Text),
        QuestionKind::Unsupported => None,
    }
}

pub fn compute_score(exam: &Exam, answers: &AnswerSet) -> Result<ScoreReport, ScoringError> {
    let reviews = review_answers(exam, answers)?;
    summarize(&reviews, exam.passing_score)
}

pub fn summarize(
    reviews: &[QuestionReview],
    passing_score: f64,
) -> Result<ScoreReport, ScoringError> {
    let (earned_score, total_score) = reviews.iter().fold((0.0, 0.0), |(earned, total), review| {
        (earned + review.earned, total + review.points)
    });

    if total_score <= 0.0 {
        return Err(ScoringError::DegenerateExam);
    }

    let percentage = round_half_up((earned_score / total_score) * 100.0);

    Ok(ScoreReport {
        earned_score,
        total_score,
        percentage,
        passed: f64::from(percentage) >= passing_score,
    })
}

/// Rounds halves towards positive infinity, so `12.5` becomes `13`.
pub fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
