use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqliteConnection, SqlitePool, FromRow};

use crate::{
    domain::{Course, CourseStatus, CreateCourseRequest, UpdateCourseRequest},
    error::{AppError, Result},
    repository::CourseRepository,
};

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    title: String,
    description: String,
    price_cents: i64,
    teacher_id: i64,
    level: i32,
    student_count: i64,
    status: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: row.id,
            title: row.title,
            description: row.description,
            price_cents: row.price_cents,
            teacher_id: row.teacher_id,
            level: row.level,
            student_count: row.student_count,
            status: CourseStatus::from_i32(row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid course status: {}", row.status)))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }
}

/// Current price of a course, read on the caller's connection or transaction.
pub async fn price_of_in(conn: &mut SqliteConnection, course_id: i64) -> Result<Option<i64>> {
    let price = sqlx::query_scalar::<_, i64>("SELECT price_cents FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(price)
}

/// Shift the denormalized student counter. The counter never drops below zero.
pub async fn adjust_student_count(
    conn: &mut SqliteConnection,
    course_id: i64,
    delta: i64,
) -> Result<()> {
    let now = Utc::now().naive_utc();

    let result = sqlx::query(
        r#"
        UPDATE courses
        SET student_count = MAX(student_count + ?, 0),
            updated_at = ?
        WHERE id = ?
        "#
    )
    .bind(delta)
    .bind(now)
    .bind(course_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    Ok(())
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, teacher_id: i64, course: CreateCourseRequest) -> Result<Course> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO courses (
                title, description, price_cents, teacher_id, level,
                student_count, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price_cents)
        .bind(teacher_id)
        .bind(course.level)
        .bind(course.status.as_i32())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created course".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price_cents, teacher_id, level,
                   student_count, status, created_at, updated_at
            FROM courses
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Course>, i64)> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, title, description, price_cents, teacher_id, level,
                   student_count, status, created_at, updated_at
            FROM courses
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;

        let courses = rows
            .into_iter()
            .map(Self::row_to_course)
            .collect::<Result<Vec<_>>>()?;

        Ok((courses, total))
    }

    async fn update(&self, id: i64, update: UpdateCourseRequest) -> Result<Course> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE courses
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                price_cents = COALESCE(?, price_cents),
                level = COALESCE(?, level),
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.level)
        .bind(update.status.map(|s| s.as_i32()))
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated course".to_string())
        })
    }

    async fn exists(&self, id: i64) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn price_of(&self, id: i64) -> Result<Option<i64>> {
        let mut conn = self.pool.acquire().await?;
        price_of_in(&mut *conn, id).await
    }
}
