use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Teacher,
    Student,
}

impl UserRole {
    /// Staff may read other users' results and exam statistics.
    pub(crate) fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Teacher)
    }
}
