use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::types::Json;
use tokio::sync::RwLock;

use super::{NewResult, ResultFilter, StoreError, SubmissionStore};
use crate::db::models::{ExamResult, ResultTotals, ResultWithExam, User};
use crate::db::types::UserRole;
use crate::services::exam::Exam;

/// In-process store for tests. Mirrors the unique (user, exam) constraint by
/// checking and inserting under one write lock.
#[derive(Default)]
pub(crate) struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    exams: RwLock<Vec<Exam>>,
    results: RwLock<Vec<ExamResult>>,
}

impl MemoryStore {
    pub(crate) async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    pub(crate) async fn insert_exam(&self, exam: Exam) {
        self.exams.write().await.push(exam);
    }

    pub(crate) async fn results(&self) -> Vec<ExamResult> {
        self.results.read().await.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn find_exam(&self, exam_id: &str) -> Result<Option<Exam>, StoreError> {
        Ok(self.exams.read().await.iter().find(|exam| exam.id == exam_id).cloned())
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, StoreError> {
        let mut exams = self.exams.read().await.clone();
        exams.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.id.cmp(&b.id)));
        Ok(exams)
    }

    async fn find_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn count_students(&self) -> Result<i64, StoreError> {
        let users = self.users.read().await;
        let count =
            users.values().filter(|user| user.role == UserRole::Student && user.is_active).count();
        Ok(count as i64)
    }

    async fn find_result(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<ExamResult>, StoreError> {
        Ok(self
            .results
            .read()
            .await
            .iter()
            .find(|result| result.user_id == user_id && result.exam_id == exam_id)
            .cloned())
    }

    async fn create_result(&self, result: NewResult) -> Result<ExamResult, StoreError> {
        let mut results = self.results.write().await;
        let taken = results
            .iter()
            .any(|existing| existing.user_id == result.user_id && existing.exam_id == result.exam_id);
        if taken {
            return Err(StoreError::DuplicateResult);
        }

        let stored = ExamResult {
            id: result.id,
            user_id: result.user_id,
            exam_id: result.exam_id,
            score: result.score,
            total_score: result.total_score,
            percentage: result.percentage,
            passed: result.passed,
            answers: Json(result.answers),
            submitted_at: result.submitted_at,
        };
        results.push(stored.clone());
        Ok(stored)
    }

    async fn list_results(&self, filter: ResultFilter) -> Result<Vec<ResultWithExam>, StoreError> {
        let exams = self.exams.read().await;
        let mut listed: Vec<ResultWithExam> = self
            .results
            .read()
            .await
            .iter()
            .filter(|result| filter.user_id.as_deref().map_or(true, |id| result.user_id == id))
            .filter(|result| filter.exam_id.as_deref().map_or(true, |id| result.exam_id == id))
            .filter_map(|result| {
                let exam = exams.iter().find(|exam| exam.id == result.exam_id)?;
                Some(ResultWithExam { result: result.clone(), exam_title: exam.title.clone() })
            })
            .collect();
        listed.sort_by(|a, b| {
            b.result
                .submitted_at
                .cmp(&a.result.submitted_at)
                .then_with(|| a.result.id.cmp(&b.result.id))
        });
        Ok(listed)
    }

    async fn result_totals(&self, exam_id: &str) -> Result<ResultTotals, StoreError> {
        let results = self.results.read().await;
        let mut totals = ResultTotals::default();
        for result in results.iter().filter(|result| result.exam_id == exam_id) {
            totals.submissions += 1;
            totals.passed += i64::from(result.passed);
            totals.percentage_sum += i64::from(result.percentage);
        }
        Ok(totals)
    }
}
