use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentStaff, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::schemas::exam::{ExamStatusResponse, ExamSummary, ExamView};
use crate::schemas::result::{ResultResponse, ResultReviewResponse, SubmitExamRequest};
use crate::services::exam::Exam;
use crate::services::result_stats::{self, ExamStats};
use crate::services::{scoring, submission};

async fn load_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    state
        .store()
        .find_exam(exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(super) async fn list_exams(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamSummary>>, ApiError> {
    let exams = state
        .store()
        .list_exams()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let now = primitive_now_utc();

    Ok(Json(exams.iter().map(|exam| ExamSummary::from_exam(exam, now)).collect()))
}

pub(super) async fn get_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamView>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;
    Ok(Json(ExamView::from_exam(&exam, primitive_now_utc(), user.role.is_staff())))
}

pub(super) async fn exam_status(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamStatusResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;
    let now = primitive_now_utc();

    Ok(Json(ExamStatusResponse {
        exam_id: exam.id.clone(),
        status: exam.status_at(now),
        now: format_primitive(now),
        start_date: format_primitive(exam.start_date),
        end_date: format_primitive(exam.end_date),
    }))
}

pub(super) async fn submit_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<(StatusCode, Json<ResultResponse>), ApiError> {
    let result = submission::submit_exam(
        state.store(),
        &user.id,
        &exam_id,
        payload.answers.as_ref(),
        primitive_now_utc(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ResultResponse::from(result))))
}

/// The caller's own result, with each question re-graded from the stored
/// answers against the current answer key.
pub(super) async fn my_result(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ResultReviewResponse>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;
    let result = state
        .store()
        .find_result(&user.id, &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch result"))?
        .ok_or_else(|| ApiError::NotFound("Result not found".to_string()))?;

    let reviews = scoring::review_answers(&exam, &result.answers.0)
        .map_err(|e| ApiError::internal(e, "Stored exam cannot be reviewed"))?;

    Ok(Json(ResultReviewResponse::build(&exam, result, reviews)))
}

pub(super) async fn exam_stats(
    CurrentStaff(_staff): CurrentStaff,
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamStats>, ApiError> {
    let exam = load_exam(&state, &exam_id).await?;
    let assigned = state
        .store()
        .count_students()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count students"))?;
    let totals = state
        .store()
        .result_totals(&exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to aggregate results"))?;

    Ok(Json(result_stats::exam_stats(assigned, totals)))
}
