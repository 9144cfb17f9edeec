use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;
use validator::Validate;

use crate::db::models::{ExamResult, ResultTotals, ResultWithExam};
use crate::services::exam::AnswerSet;

const COLUMNS: &str = "\
    id, user_id, exam_id, score, total_score, percentage, passed, answers, submitted_at";

/// A scored submission ready to be persisted. Built only by the submission
/// guard, from server-side scoring.
#[derive(Debug, Clone, Validate)]
pub(crate) struct NewResult {
    #[validate(length(min = 1))]
    pub(crate) id: String,
    #[validate(length(min = 1))]
    pub(crate) user_id: String,
    #[validate(length(min = 1))]
    pub(crate) exam_id: String,
    #[validate(range(min = 0.0))]
    pub(crate) score: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub(crate) total_score: f64,
    #[validate(range(min = 0, max = 100))]
    pub(crate) percentage: i32,
    pub(crate) passed: bool,
    pub(crate) answers: AnswerSet,
    pub(crate) submitted_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ResultFilter {
    pub(crate) user_id: Option<String>,
    pub(crate) exam_id: Option<String>,
}

pub(crate) async fn find_for_user(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "SELECT {COLUMNS} FROM exam_results WHERE user_id = $1 AND exam_id = $2"
    ))
    .bind(user_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

/// Inserts unless a result for the same (user, exam) already exists. `None`
/// means the unique constraint turned the insert into a no-op.
pub(crate) async fn create_if_absent(
    pool: &PgPool,
    result: &NewResult,
) -> Result<Option<ExamResult>, sqlx::Error> {
    sqlx::query_as::<_, ExamResult>(&format!(
        "INSERT INTO exam_results (
            id, user_id, exam_id, score, total_score, percentage, passed, answers, submitted_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        ON CONFLICT ON CONSTRAINT exam_results_user_exam_key DO NOTHING
        RETURNING {COLUMNS}"
    ))
    .bind(&result.id)
    .bind(&result.user_id)
    .bind(&result.exam_id)
    .bind(result.score)
    .bind(result.total_score)
    .bind(result.percentage)
    .bind(result.passed)
    .bind(Json(&result.answers))
    .bind(result.submitted_at)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &ResultFilter,
) -> Result<Vec<ResultWithExam>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT r.id, r.user_id, r.exam_id, r.score, r.total_score, r.percentage, r.passed,
                r.answers, r.submitted_at, e.title AS exam_title
         FROM exam_results r
         JOIN exams e ON e.id = r.exam_id
         WHERE TRUE",
    );

    if let Some(user_id) = &filter.user_id {
        builder.push(" AND r.user_id = ").push_bind(user_id);
    }
    if let Some(exam_id) = &filter.exam_id {
        builder.push(" AND r.exam_id = ").push_bind(exam_id);
    }
    builder.push(" ORDER BY r.submitted_at DESC, r.id");

    builder.build_query_as::<ResultWithExam>().fetch_all(pool).await
}

pub(crate) async fn totals_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<ResultTotals, sqlx::Error> {
    sqlx::query_as::<_, ResultTotals>(
        "SELECT COUNT(*) AS submissions,
                COUNT(*) FILTER (WHERE passed) AS passed,
                COALESCE(SUM(percentage), 0)::BIGINT AS percentage_sum
         FROM exam_results
         WHERE exam_id = $1",
    )
    .bind(exam_id)
    .fetch_one(pool)
    .await
}
