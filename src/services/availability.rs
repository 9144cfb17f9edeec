use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

/// Where `now` falls relative to an exam's scheduling window. Derived on
/// every read and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamAvailability {
    Upcoming,
    Active,
    Expired,
}

impl ExamAvailability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }

    pub fn accepts_submissions(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Both window bounds are inclusive: an exam is active at exactly its start
/// and at exactly its end.
pub fn status_of(
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> ExamAvailability {
    if now < start {
        ExamAvailability::Upcoming
    } else if now > end {
        ExamAvailability::Expired
    } else {
        ExamAvailability::Active
    }
}
