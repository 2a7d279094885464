use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's access to a course. Revocation flips `status`; rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    /// Order that paid for this enrollment, if it came from settlement.
    pub order_token: Option<String>,
    pub price_cents: i64,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Revoked,
    Active,
}

impl EnrollmentStatus {
    pub fn as_i32(&self) -> i32 {
        match self {
            EnrollmentStatus::Revoked => 0,
            EnrollmentStatus::Active => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(EnrollmentStatus::Revoked),
            1 => Some(EnrollmentStatus::Active),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentListItem {
    pub enrollment: Enrollment,
    pub course_title: Option<String>,
    pub course_level: Option<i32>,
}
