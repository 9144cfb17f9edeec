pub(crate) mod exams;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod results;
pub(crate) mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::models::{ExamResult, ResultTotals, ResultWithExam, User};
use crate::db::types::UserRole;
use crate::services::exam::Exam;

pub(crate) use results::{NewResult, ResultFilter};

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    /// The (user, exam) pair already has a result.
    #[error("a result for this user and exam already exists")]
    DuplicateResult,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Everything the submission pipeline reads and writes.
#[async_trait]
pub(crate) trait SubmissionStore: Send + Sync {
    async fn find_exam(&self, exam_id: &str) -> Result<Option<Exam>, StoreError>;

    async fn list_exams(&self) -> Result<Vec<Exam>, StoreError>;

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    async fn count_students(&self) -> Result<i64, StoreError>;

    async fn find_result(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<ExamResult>, StoreError>;

    /// Must fail with [`StoreError::DuplicateResult`] when a result for the
    /// same (user, exam) already exists, even under concurrent callers.
    async fn create_result(&self, result: NewResult) -> Result<ExamResult, StoreError>;

    /// Newest first.
    async fn list_results(&self, filter: ResultFilter) -> Result<Vec<ResultWithExam>, StoreError>;

    async fn result_totals(&self, exam_id: &str) -> Result<ResultTotals, StoreError>;

    async fn list_results_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ResultWithExam>, StoreError> {
        self.list_results(ResultFilter { user_id: Some(user_id.to_string()), exam_id: None }).await
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt_exam(exam_id: &str, err: serde_json::Error) -> StoreError {
    StoreError::Corrupt(format!("exam {exam_id} has malformed questions: {err}"))
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn find_exam(&self, exam_id: &str) -> Result<Option<Exam>, StoreError> {
        let Some(row) = exams::find_by_id(&self.pool, exam_id).await? else {
            return Ok(None);
        };
        let id = row.id.clone();
        row.into_exam().map(Some).map_err(|err| corrupt_exam(&id, err))
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, StoreError> {
        exams::list(&self.pool)
            .await?
            .into_iter()
            .map(|row| {
                let id = row.id.clone();
                row.into_exam().map_err(|err| corrupt_exam(&id, err))
            })
            .collect()
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_id(&self.pool, user_id).await?)
    }

    async fn count_students(&self) -> Result<i64, StoreError> {
        Ok(users::count_active_by_role(&self.pool, UserRole::Student).await?)
    }

    async fn find_result(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<ExamResult>, StoreError> {
        Ok(results::find_for_user(&self.pool, user_id, exam_id).await?)
    }

    async fn create_result(&self, result: NewResult) -> Result<ExamResult, StoreError> {
        results::create_if_absent(&self.pool, &result).await?.ok_or(StoreError::DuplicateResult)
    }

    async fn list_results(&self, filter: ResultFilter) -> Result<Vec<ResultWithExam>, StoreError> {
        Ok(results::list(&self.pool, &filter).await?)
    }

    async fn result_totals(&self, exam_id: &str) -> Result<ResultTotals, StoreError> {
        Ok(results::totals_for_exam(&self.pool, exam_id).await?)
    }
}
