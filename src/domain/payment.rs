use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A payment order. One row per attempt; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: String,
    pub user_id: i64,
    pub course_id: i64,
    /// Snapshot of the course price when the order was created.
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub external_txn_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order row joined with the title of the course it pays for.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentListItem {
    pub payment: Payment,
    pub course_title: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }

    /// Statuses only move forward out of `pending`. `completed -> refunded` is the
    /// one manual path after settlement. Re-applying the current status is allowed
    /// so a completed order can be re-settled to repair a missing enrollment.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (PaymentStatus::Pending, _) | (PaymentStatus::Completed, PaymentStatus::Refunded)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Wechat,
    Alipay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Wechat => "wechat",
            PaymentMethod::Alipay => "alipay",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "wechat" => Some(PaymentMethod::Wechat),
            "alipay" => Some(PaymentMethod::Alipay),
            _ => None,
        }
    }
}

/// Insert payload for a new order.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: String,
    pub user_id: i64,
    pub course_id: i64,
    pub amount_cents: i64,
    pub payment_method: PaymentMethod,
}
