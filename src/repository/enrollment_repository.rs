use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool, FromRow};

use crate::{
    domain::{Enrollment, EnrollmentListItem, EnrollmentStatus},
    error::{is_unique_violation, AppError, Result},
    repository::{course_repository, EnrollmentRepository, WriteTransaction},
};

#[derive(FromRow)]
struct EnrollmentRow {
    id: i64,
    user_id: i64,
    course_id: i64,
    order_token: Option<String>,
    price_cents: i64,
    status: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct EnrollmentListRow {
    #[sqlx(flatten)]
    enrollment: EnrollmentRow,
    course_title: Option<String>,
    course_level: Option<i32>,
}

pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment> {
    Ok(Enrollment {
        id: row.id,
        user_id: row.user_id,
        course_id: row.course_id,
        order_token: row.order_token,
        price_cents: row.price_cents,
        status: EnrollmentStatus::from_i32(row.status).ok_or_else(|| {
            AppError::Database(format!("Invalid enrollment status: {}", row.status))
        })?,
        created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
    })
}

async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<Enrollment>> {
    let row = sqlx::query_as::<_, EnrollmentRow>(
        r#"
        SELECT id, user_id, course_id, order_token, price_cents, status,
               created_at, updated_at
        FROM enrollments
        WHERE id = ?
        "#
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.map(row_to_enrollment).transpose()
}

/// Grant access to a course on the caller's transaction.
///
/// `price_cents` is the amount paid; `None` snapshots the course's current price.
/// The partial unique index on active rows is what rejects a second active
/// enrollment, so two racing callers cannot both succeed.
pub async fn enroll_in(
    conn: &mut SqliteConnection,
    user_id: i64,
    course_id: i64,
    order_token: Option<&str>,
    price_cents: Option<i64>,
) -> Result<Enrollment> {
    let course_price = course_repository::price_of_in(&mut *conn, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    let price = price_cents.unwrap_or(course_price);
    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        INSERT INTO enrollments (
            user_id, course_id, order_token, price_cents, status,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#
    )
    .bind(user_id)
    .bind(course_id)
    .bind(order_token)
    .bind(price)
    .bind(EnrollmentStatus::Active.as_i32())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::AlreadyEnrolled
        } else {
            AppError::from(e)
        }
    })?;

    course_repository::adjust_student_count(&mut *conn, course_id, 1).await?;

    find_by_id_in(&mut *conn, result.last_insert_rowid())
        .await?
        .ok_or_else(|| AppError::Database("Failed to retrieve created enrollment".to_string()))
}

/// Revoke the active enrollment for the pair on the caller's transaction.
pub async fn unenroll_in(conn: &mut SqliteConnection, user_id: i64, course_id: i64) -> Result<()> {
    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        UPDATE enrollments
        SET status = ?, updated_at = ?
        WHERE user_id = ? AND course_id = ? AND status = ?
        "#
    )
    .bind(EnrollmentStatus::Revoked.as_i32())
    .bind(now)
    .bind(user_id)
    .bind(course_id)
    .bind(EnrollmentStatus::Active.as_i32())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("No active enrollment for this course".to_string()));
    }

    course_repository::adjust_student_count(&mut *conn, course_id, -1).await
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn enroll(
        &self,
        user_id: i64,
        course_id: i64,
        order_token: Option<&str>,
    ) -> Result<Enrollment> {
        let mut tx = WriteTransaction::begin(&self.pool).await?;
        let result = enroll_in(tx.conn()?, user_id, course_id, order_token, None).await;
        tx.finish(result).await
    }

    async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<()> {
        let mut tx = WriteTransaction::begin(&self.pool).await?;
        let result = unenroll_in(tx.conn()?, user_id, course_id).await;
        tx.finish(result).await
    }

    async fn find_latest(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        let row = sqlx::query_as::<_, EnrollmentRow>(
            r#"
            SELECT id, user_id, course_id, order_token, price_cents, status,
                   created_at, updated_at
            FROM enrollments
            WHERE user_id = ? AND course_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_enrollment).transpose()
    }

    async fn list_active_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<EnrollmentListItem>, i64)> {
        let rows = sqlx::query_as::<_, EnrollmentListRow>(
            r#"
            SELECT e.id, e.user_id, e.course_id, e.order_token, e.price_cents, e.status,
                   e.created_at, e.updated_at,
                   c.title AS course_title, c.level AS course_level
            FROM enrollments e
            LEFT JOIN courses c ON e.course_id = c.id
            WHERE e.user_id = ? AND e.status = ?
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(user_id)
        .bind(EnrollmentStatus::Active.as_i32())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = ? AND status = ?"
        )
        .bind(user_id)
        .bind(EnrollmentStatus::Active.as_i32())
        .fetch_one(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(EnrollmentListItem {
                    enrollment: row_to_enrollment(row.enrollment)?,
                    course_title: row.course_title,
                    course_level: row.course_level,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((items, total))
    }
}
