use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum BackfillError {
    #[error("questions must be a JSON array")]
    NotAnArray,
    #[error("question at position {position} is not an object")]
    NotAnObject { position: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backfill {
    /// Questions that received a fresh id.
    pub(crate) assigned: usize,
    pub(crate) total_questions: i32,
}

pub(crate) fn generate_question_id() -> String {
    format!("q_{}", Uuid::new_v4().simple())
}

/// Gives every question without a usable id a fresh one. Existing non-empty
/// ids are left alone even when they look odd.
pub(crate) fn backfill_ids(
    questions: &mut Value,
    mut next_id: impl FnMut() -> String,
) -> Result<Backfill, BackfillError> {
    let items = questions.as_array_mut().ok_or(BackfillError::NotAnArray)?;
    let mut assigned = 0;

    for (position, item) in items.iter_mut().enumerate() {
        let object = item.as_object_mut().ok_or(BackfillError::NotAnObject { position })?;
        let has_id = object
            .get("id")
            .and_then(Value::as_str)
            .is_some_and(|id| !id.trim().is_empty());
        if !has_id {
            object.insert("id".to_string(), Value::String(next_id()));
            assigned += 1;
        }
    }

    Ok(Backfill { assigned, total_questions: items.len() as i32 })
}
