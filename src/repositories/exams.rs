use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::ExamRow;

pub(crate) const COLUMNS: &str = "\
    id, title, description, duration_minutes, passing_score, start_date, end_date, \
    questions, total_questions";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ExamRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamRow>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<ExamRow>, sqlx::Error> {
    sqlx::query_as::<_, ExamRow>(&format!(
        "SELECT {COLUMNS} FROM exams ORDER BY start_date DESC, id"
    ))
    .fetch_all(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionDocument {
    pub(crate) id: String,
    pub(crate) questions: Json<serde_json::Value>,
    pub(crate) total_questions: i32,
}

/// Raw question documents for the id backfill, which must see rows the typed
/// model cannot parse.
pub(crate) async fn list_question_documents(
    pool: &PgPool,
) -> Result<Vec<QuestionDocument>, sqlx::Error> {
    sqlx::query_as::<_, QuestionDocument>(
        "SELECT id, questions, total_questions FROM exams ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

pub(crate) async fn update_questions(
    pool: &PgPool,
    id: &str,
    questions: &serde_json::Value,
    total_questions: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE exams SET questions = $2, total_questions = $3, updated_at = timezone('utc', now())
         WHERE id = $1",
    )
    .bind(id)
    .bind(Json(questions))
    .bind(total_questions)
    .execute(pool)
    .await?;
    Ok(())
}
