use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub teacher_id: i64,
    pub level: i32,
    pub student_count: i64,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Unlisted,
    Listed,
}

impl CourseStatus {
    pub fn as_i32(&self) -> i32 {
        match self {
            CourseStatus::Unlisted => 0,
            CourseStatus::Listed => 1,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(CourseStatus::Unlisted),
            1 => Some(CourseStatus::Listed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub level: i32,
    pub status: CourseStatus,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub level: Option<i32>,
    pub status: Option<CourseStatus>,
}

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 3;
