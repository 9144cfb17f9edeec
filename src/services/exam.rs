//! Question model, exam aggregate and the answer sets students submit.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use time::PrimitiveDateTime;

use crate::services::availability::{status_of, ExamAvailability};

/// A single gradable item. The answer key lives inside [`QuestionKind`] so the
/// shape of `correct_answer` always agrees with the question type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Opaque identifier, unique within its exam. Legacy rows may carry an
    /// empty id until `backfill_question_ids` has run over them.
    #[serde(default)]
    pub id: String,
    #[serde(alias = "question")]
    pub prompt: String,
    pub points: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        #[serde(alias = "correctAnswer")]
        correct_answer: usize,
    },
    TrueFalse {
        #[serde(alias = "correctAnswer")]
        correct_answer: bool,
    },
    Essay {
        /// Reference text shown to reviewers; never compared against answers.
        #[serde(default, alias = "correctAnswer", deserialize_with = "reference_text")]
        correct_answer: Option<String>,
    },
    /// Any type this service does not know how to grade.
    #[serde(other)]
    Unsupported,
}

/// Older exams carry whatever the authoring form left behind, often the
/// numeric default of a multiple-choice key. Scalars become text, anything
/// else is dropped.
fn reference_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

impl QuestionKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::MultipleChoice { .. } => "multiple_choice",
            Self::TrueFalse { .. } => "true_false",
            Self::Essay { .. } => "essay",
            Self::Unsupported => "unsupported",
        }
    }

    /// Options shown to students; empty for every type but multiple choice.
    pub fn options(&self) -> &[String] {
        match self {
            Self::MultipleChoice { options, .. } => options,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Exam {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    /// Percentage a result must reach to pass.
    pub passing_score: f64,
    pub start_date: PrimitiveDateTime,
    pub end_date: PrimitiveDateTime,
    pub questions: Vec<Question>,
    pub total_questions: i32,
}

impl Exam {
    pub fn status_at(&self, now: PrimitiveDateTime) -> ExamAvailability {
        status_of(self.start_date, self.end_date, now)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}

/// One submitted response. Serialized untagged, so a stored answer set reads
/// back exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Index(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerSetError {
    #[error("answers must be a JSON object keyed by question id")]
    NotAnObject,
    #[error("answer for question '{0}' must be an option index, a boolean or text")]
    UnsupportedValue(String),
    #[error("answer references unknown question '{0}'")]
    UnknownQuestion(String),
}

/// Student responses keyed by question id. Partial sets are normal;
/// unanswered questions simply score zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<String, AnswerValue>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw client payload. Only non-negative integers, booleans and
    /// strings are accepted as values.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AnswerSetError> {
        let object = value.as_object().ok_or(AnswerSetError::NotAnObject)?;
        let mut answers = BTreeMap::new();

        for (question_id, raw) in object {
            let parsed = match raw {
                serde_json::Value::Bool(flag) => AnswerValue::Flag(*flag),
                serde_json::Value::Number(number) => number
                    .as_u64()
                    .map(AnswerValue::Index)
                    .ok_or_else(|| AnswerSetError::UnsupportedValue(question_id.clone()))?,
                serde_json::Value::String(text) => AnswerValue::Text(text.clone()),
                _ => return Err(AnswerSetError::UnsupportedValue(question_id.clone())),
            };
            answers.insert(question_id.clone(), parsed);
        }

        Ok(Self(answers))
    }

    /// Rejects answers for questions the exam does not contain.
    pub fn reconcile(&self, exam: &Exam) -> Result<(), AnswerSetError> {
        match self.0.keys().find(|id| exam.question(id).is_none()) {
            Some(unknown) => Err(AnswerSetError::UnknownQuestion(unknown.clone())),
            None => Ok(()),
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.0.get(question_id)
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: AnswerValue) {
        self.0.insert(question_id.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_reads_legacy_camel_case_shape() {
        let question: Question = serde_json::from_value(json!({
            "id": "q1",
            "type": "multiple_choice",
            "question": "2 + 2?",
            "options": ["3", "4"],
            "correctAnswer": 1,
            "points": 2
        }))
        .expect("question");

        assert_eq!(question.prompt, "2 + 2?");
        assert_eq!(
            question.kind,
            QuestionKind::MultipleChoice { options: vec!["3".into(), "4".into()], correct_answer: 1 }
        );
    }

    #[test]
    fn unknown_question_type_is_unsupported() {
        let question: Question = serde_json::from_value(json!({
            "id": "q9",
            "type": "matching",
            "prompt": "Match the pairs",
            "points": 4
        }))
        .expect("question");

        assert_eq!(question.kind, QuestionKind::Unsupported);
        assert!(question.kind.options().is_empty());
    }

    #[test]
    fn essay_reference_accepts_legacy_scalars() {
        let question: Question = serde_json::from_value(json!({
            "id": "q1",
            "type": "essay",
            "question": "Explain",
            "correctAnswer": 0,
            "points": 5
        }))
        .expect("question");
        assert_eq!(question.kind, QuestionKind::Essay { correct_answer: Some("0".into()) });

        for (raw, expected) in [
            (json!("model answer"), Some("model answer".to_string())),
            (json!(true), Some("true".to_string())),
            (json!(null), None),
            (json!([1, 2]), None),
        ] {
            let question: Question = serde_json::from_value(json!({
                "id": "q1",
                "type": "essay",
                "prompt": "Explain",
                "correct_answer": raw,
                "points": 5
            }))
            .expect("question");
            assert_eq!(question.kind, QuestionKind::Essay { correct_answer: expected });
        }
    }

    #[test]
    fn missing_id_deserializes_as_empty() {
        let question: Question = serde_json::from_value(json!({
            "type": "true_false",
            "prompt": "Water is wet",
            "correct_answer": true,
            "points": 1
        }))
        .expect("question");

        assert!(question.id.is_empty());
    }

    #[test]
    fn answer_set_accepts_index_flag_and_text() {
        let answers =
            AnswerSet::from_json(&json!({"a": 2, "b": false, "c": "some text"})).expect("answers");

        assert_eq!(answers.get("a"), Some(&AnswerValue::Index(2)));
        assert_eq!(answers.get("b"), Some(&AnswerValue::Flag(false)));
        assert_eq!(answers.get("c"), Some(&AnswerValue::Text("some text".into())));
    }

    #[test]
    fn answer_set_rejects_other_shapes() {
        for bad in [json!(null), json!(1.5), json!(-1), json!([1]), json!({"x": 1})] {
            let err = AnswerSet::from_json(&json!({ "q1": bad })).unwrap_err();
            assert_eq!(err, AnswerSetError::UnsupportedValue("q1".into()));
        }
        assert_eq!(AnswerSet::from_json(&json!([1, 2])).unwrap_err(), AnswerSetError::NotAnObject);
    }

    #[test]
    fn stored_answers_read_back_unchanged() {
        let raw = json!({"a": 2, "b": true, "c": "text"});
        let answers = AnswerSet::from_json(&raw).expect("answers");
        assert_eq!(serde_json::to_value(&answers).unwrap(), raw);
        let restored: AnswerSet = serde_json::from_value(raw).unwrap();
        assert_eq!(restored, answers);
    }
}
