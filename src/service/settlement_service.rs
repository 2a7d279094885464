use sqlx::{SqliteConnection, SqlitePool};

use crate::{
    domain::{Payment, PaymentStatus},
    error::{AppError, Result},
    repository::{enrollment_repository, payment_repository, WriteTransaction},
};

/// Applies payment status changes and, on completion, grants the enrollment.
///
/// The status write and the enrollment grant share one transaction, with the
/// status written first. An existing active enrollment does not block
/// settlement; any other enrollment failure rolls the status change back.
pub struct SettlementService {
    pool: SqlitePool,
}

impl SettlementService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn apply_status(
        &self,
        order_id: &str,
        external_txn_id: Option<&str>,
        status: PaymentStatus,
    ) -> Result<Payment> {
        let mut tx = WriteTransaction::begin(&self.pool).await?;
        let result = apply_status_in(tx.conn()?, order_id, external_txn_id, status).await;
        tx.finish(result).await
    }
}

async fn apply_status_in(
    conn: &mut SqliteConnection,
    order_id: &str,
    external_txn_id: Option<&str>,
    status: PaymentStatus,
) -> Result<Payment> {
    let order = payment_repository::find_by_order_id_in(&mut *conn, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment order not found".to_string()))?;

    if !order.status.can_transition_to(status) {
        return Err(AppError::Conflict(format!(
            "Cannot move order {} from {} to {}",
            order_id,
            order.status.as_str(),
            status.as_str()
        )));
    }

    payment_repository::set_status_in(&mut *conn, order_id, external_txn_id, status).await?;

    if status == PaymentStatus::Completed {
        match enrollment_repository::enroll_in(
            &mut *conn,
            order.user_id,
            order.course_id,
            Some(order.order_id.as_str()),
            Some(order.amount_cents),
        )
        .await
        {
            Ok(enrollment) => {
                tracing::info!(
                    "Order {} settled; enrollment {} granted to user {} for course {}",
                    order_id,
                    enrollment.id,
                    order.user_id,
                    order.course_id
                );
            }
            Err(AppError::AlreadyEnrolled) => {
                tracing::info!(
                    "Order {} settled; user {} already enrolled in course {}",
                    order_id,
                    order.user_id,
                    order.course_id
                );
            }
            Err(e) => {
                tracing::warn!("Settlement of order {} rolled back: {}", order_id, e);
                return Err(e);
            }
        }
    } else {
        tracing::info!(
            "Order {} moved from {} to {}",
            order_id,
            order.status.as_str(),
            status.as_str()
        );
    }

    payment_repository::find_by_order_id_in(&mut *conn, order_id)
        .await?
        .ok_or_else(|| AppError::Database("Failed to retrieve updated payment".to_string()))
}
