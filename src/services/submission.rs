use thiserror::Error;
use time::PrimitiveDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::core::metrics;
use crate::db::models::ExamResult;
use crate::repositories::{NewResult, StoreError, SubmissionStore};
use crate::services::availability::ExamAvailability;
use crate::services::exam::{AnswerSet, AnswerSetError};
use crate::services::scoring::{compute_score, ScoringError};

#[derive(Debug, Error)]
pub(crate) enum SubmissionError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid answer set: {0}")]
    InvalidAnswerSet(#[from] AnswerSetError),
    #[error("exam already submitted")]
    DuplicateSubmission,
    #[error("exam is {} and does not accept submissions", .0.as_str())]
    ExamNotActive(ExamAvailability),
    #[error("exam cannot be scored: its questions add up to zero points")]
    DegenerateExam,
    #[error("exam cannot be scored: {0}")]
    InvalidExam(ScoringError),
    /// Stored questions could not be read. Details stay in the logs.
    #[error("exam cannot be scored: its stored questions are malformed")]
    MalformedExam(String),
    #[error("exam not found")]
    ExamNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("storage unavailable: {0}")]
    Storage(StoreError),
}

impl SubmissionError {
    /// Stable machine-readable code, also used as the metrics outcome label.
    pub(crate) fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::InvalidAnswerSet(_) => "invalid_answer_set",
            Self::DuplicateSubmission => "duplicate_submission",
            Self::ExamNotActive(_) => "exam_not_active",
            Self::DegenerateExam => "degenerate_exam",
            Self::InvalidExam(_) | Self::MalformedExam(_) => "invalid_exam",
            Self::ExamNotFound => "exam_not_found",
            Self::UserNotFound => "user_not_found",
            Self::Storage(_) => "storage_unavailable",
        }
    }

    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<ScoringError> for SubmissionError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::DegenerateExam => Self::DegenerateExam,
            other => Self::InvalidExam(other),
        }
    }
}

impl From<StoreError> for SubmissionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateResult => Self::DuplicateSubmission,
            StoreError::Corrupt(detail) => Self::MalformedExam(detail),
            other => Self::Storage(other),
        }
    }
}

/// Accepts a client-reported answer payload, scores it against the stored
/// answer key and persists the result. At most one result ever exists per
/// (user, exam); every later attempt fails with `DuplicateSubmission`.
pub(crate) async fn submit_exam(
    store: &dyn SubmissionStore,
    user_id: &str,
    exam_id: &str,
    answers: Option<&serde_json::Value>,
    now: PrimitiveDateTime,
) -> Result<ExamResult, SubmissionError> {
    let outcome = match answers {
        Some(raw) => submit(store, user_id, exam_id, || AnswerSet::from_json(raw), now).await,
        None => Err(SubmissionError::Validation("answers are required".to_string())),
    };
    record_outcome(user_id, exam_id, &outcome);
    outcome
}

/// Answers are parsed only after the duplicate check, so a repeat submission
/// reports `DuplicateSubmission` whatever its payload looks like.
async fn submit(
    store: &dyn SubmissionStore,
    user_id: &str,
    exam_id: &str,
    parse_answers: impl FnOnce() -> Result<AnswerSet, AnswerSetError>,
    now: PrimitiveDateTime,
) -> Result<ExamResult, SubmissionError> {
    if user_id.trim().is_empty() {
        return Err(SubmissionError::Validation("user_id is required".to_string()));
    }
    if exam_id.trim().is_empty() {
        return Err(SubmissionError::Validation("exam_id is required".to_string()));
    }

    let user = store.find_user(user_id).await?.ok_or(SubmissionError::UserNotFound)?;
    if !user.is_active {
        return Err(SubmissionError::Validation("user account is inactive".to_string()));
    }

    let exam = store.find_exam(exam_id).await?.ok_or(SubmissionError::ExamNotFound)?;

    let availability = exam.status_at(now);
    if !availability.accepts_submissions() {
        return Err(SubmissionError::ExamNotActive(availability));
    }

    if store.find_result(user_id, exam_id).await?.is_some() {
        return Err(SubmissionError::DuplicateSubmission);
    }

    let answers = parse_answers()?;
    answers.reconcile(&exam)?;

    let report = compute_score(&exam, &answers)?;

    let result = NewResult {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        exam_id: exam.id,
        score: report.earned_score,
        total_score: report.total_score,
        percentage: report.percentage,
        passed: report.passed,
        answers,
        submitted_at: now,
    };
    result.validate().map_err(|err| SubmissionError::Validation(err.to_string()))?;

    Ok(store.create_result(result).await?)
}

fn record_outcome(
    user_id: &str,
    exam_id: &str,
    outcome: &Result<ExamResult, SubmissionError>,
) {
    match outcome {
        Ok(result) => {
            metrics::record_submission("accepted");
            tracing::info!(
                user_id,
                exam_id,
                result_id = %result.id,
                percentage = result.percentage,
                passed = result.passed,
                "Exam submission accepted"
            );
        }
        Err(err @ SubmissionError::MalformedExam(detail)) => {
            metrics::record_submission(err.code());
            tracing::error!(user_id, exam_id, detail = %detail, "Exam has malformed questions");
        }
        Err(err @ SubmissionError::Storage(_)) => {
            metrics::record_submission(err.code());
            tracing::error!(user_id, exam_id, error = %err, "Exam submission failed on storage");
        }
        Err(err) => {
            metrics::record_submission(err.code());
            tracing::warn!(
                user_id,
                exam_id,
                code = err.code(),
                error = %err,
                "Exam submission rejected"
            );
        }
    }
}
