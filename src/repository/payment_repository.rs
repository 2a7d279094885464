use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool, FromRow};

use crate::{
    domain::{NewPayment, Payment, PaymentListItem, PaymentMethod, PaymentStatus},
    error::{is_unique_violation, AppError, Result},
    repository::PaymentRepository,
};

const PAYMENT_COLUMNS: &str = "id, order_token, user_id, course_id, amount_cents, \
    payment_method, status, external_txn_id, created_at, updated_at";

#[derive(FromRow)]
struct PaymentRow {
    id: i64,
    order_token: String,
    user_id: i64,
    course_id: i64,
    amount_cents: i64,
    payment_method: String,
    status: String,
    external_txn_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct PaymentListRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    course_title: Option<String>,
}

pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_payment(row: PaymentRow) -> Result<Payment> {
    Ok(Payment {
        id: row.id,
        order_id: row.order_token,
        user_id: row.user_id,
        course_id: row.course_id,
        amount_cents: row.amount_cents,
        payment_method: PaymentMethod::from_str(&row.payment_method).ok_or_else(|| {
            AppError::Database(format!("Invalid payment method: {}", row.payment_method))
        })?,
        status: PaymentStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("Invalid payment status: {}", row.status)))?,
        external_txn_id: row.external_txn_id,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
    })
}

pub async fn find_by_order_id_in(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> Result<Option<Payment>> {
    let query = format!("SELECT {} FROM payments WHERE order_token = ?", PAYMENT_COLUMNS);
    let row = sqlx::query_as::<_, PaymentRow>(&query)
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(row_to_payment).transpose()
}

/// Write a new status. An empty or missing transaction id keeps the stored one.
pub async fn set_status_in(
    conn: &mut SqliteConnection,
    order_id: &str,
    external_txn_id: Option<&str>,
    status: PaymentStatus,
) -> Result<()> {
    let now = Utc::now().naive_utc();
    let txn_id = external_txn_id.filter(|id| !id.is_empty());

    let result = sqlx::query(
        r#"
        UPDATE payments
        SET status = ?,
            external_txn_id = COALESCE(?, external_txn_id),
            updated_at = ?
        WHERE order_token = ?
        "#
    )
    .bind(status.as_str())
    .bind(txn_id)
    .bind(now)
    .bind(order_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Payment order not found".to_string()));
    }

    Ok(())
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn create(&self, payment: NewPayment) -> Result<Payment> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO payments (
                order_token, user_id, course_id, amount_cents,
                payment_method, status, external_txn_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, NULL, ?, ?)
            "#
        )
        .bind(&payment.order_id)
        .bind(payment.user_id)
        .bind(payment.course_id)
        .bind(payment.amount_cents)
        .bind(payment.payment_method.as_str())
        .bind(PaymentStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Order id collision: {}", payment.order_id))
            } else {
                AppError::from(e)
            }
        })?;

        self.find_by_order_id(&payment.order_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created payment".to_string())
        })
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>> {
        let mut conn = self.pool.acquire().await?;
        find_by_order_id_in(&mut *conn, order_id).await
    }

    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PaymentListItem>, i64)> {
        let rows = sqlx::query_as::<_, PaymentListRow>(
            r#"
            SELECT p.id, p.order_token, p.user_id, p.course_id, p.amount_cents,
                   p.payment_method, p.status, p.external_txn_id,
                   p.created_at, p.updated_at, c.title AS course_title
            FROM payments p
            LEFT JOIN courses c ON p.course_id = c.id
            WHERE p.user_id = ?
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM payments WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(PaymentListItem {
                    payment: row_to_payment(row.payment)?,
                    course_title: row.course_title,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total))
    }
}
