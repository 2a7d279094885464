use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};

use crate::{
    domain::{NewUser, User, UserRole, UserStatus},
    error::{is_unique_violation, AppError, Result},
    repository::UserRepository,
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    nickname: String,
    role: String,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            nickname: row.nickname,
            role: UserRole::from_str(&row.role)
                .ok_or_else(|| AppError::Database(format!("Invalid user role: {}", row.role)))?,
            status: UserStatus::from_str(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid user status: {}", row.status)))?,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
        let query = format!(
            "SELECT id, username, email, nickname, role, status, created_at, updated_at \
             FROM users WHERE {} = ?",
            column
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO users (
                username, email, password_hash, nickname, role, status,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(user.role.as_str())
        .bind(UserStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Username or email already exists".to_string())
            } else {
                AppError::from(e)
            }
        })?;

        self.find_by_id(result.last_insert_rowid()).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, nickname, role, status, created_at, updated_at
            FROM users
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hash)
    }

    async fn update_nickname(&self, id: i64, nickname: &str) -> Result<User> {
        let now = Utc::now().naive_utc();

        let result = sqlx::query("UPDATE users SET nickname = ?, updated_at = ? WHERE id = ?")
            .bind(nickname)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }
}
