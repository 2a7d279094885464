#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use uuid::Uuid;

use lyceum::{
    auth::AuthService,
    config::Settings,
    domain::{Course, CourseStatus, CreateCourseRequest, NewUser, PaymentMethod, User, UserRole},
    payments::{OrderTokenGenerator, UuidTokenGenerator},
    repository::{
        SqliteCourseRepository, SqliteEnrollmentRepository, SqlitePaymentRepository,
        SqliteUserRepository, UserRepository,
    },
    service::{user_service::RegisterUser, ServiceContext},
};

/// Fresh in-memory database. A single long-lived connection keeps the
/// schema alive for the whole test.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

/// A throwaway on-disk database, removed on drop.
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("lyceum-test-{}.db", Uuid::new_v4().simple()));
        Self { path }
    }

    pub fn options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true)
    }

    /// Pool sized like the server's default settings.
    pub async fn pool(&self) -> anyhow::Result<SqlitePool> {
        self.pool_with(self.options()).await
    }

    pub async fn pool_with(&self, options: SqliteConnectOptions) -> anyhow::Result<SqlitePool> {
        let database = Settings::default().database;
        let pool = SqlitePoolOptions::new()
            .max_connections(database.max_connections)
            .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await?;

        Ok(pool)
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Hands out the given tokens in order, then repeats the last one.
pub struct FixedTokenGenerator {
    tokens: Vec<String>,
    next: AtomicUsize,
}

impl FixedTokenGenerator {
    pub fn new(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl OrderTokenGenerator for FixedTokenGenerator {
    fn generate(&self) -> String {
        let i = self.next.fetch_add(1, Ordering::SeqCst).min(self.tokens.len() - 1);
        self.tokens[i].clone()
    }
}

pub fn context_with_tokens(pool: SqlitePool, tokens: Arc<dyn OrderTokenGenerator>) -> ServiceContext {
    let settings = Settings::default();

    ServiceContext::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteCourseRepository::new(pool.clone())),
        Arc::new(SqlitePaymentRepository::new(pool.clone())),
        Arc::new(SqliteEnrollmentRepository::new(pool.clone())),
        Arc::new(AuthService::new(&settings.auth)),
        tokens,
        vec![PaymentMethod::Wechat, PaymentMethod::Alipay],
        pool,
    )
}

pub async fn test_context() -> anyhow::Result<ServiceContext> {
    Ok(context_with_tokens(test_pool().await?, Arc::new(UuidTokenGenerator)))
}

/// Insert a user without hashing a password, for tests that need many accounts.
pub async fn insert_user(ctx: &ServiceContext, username: &str) -> anyhow::Result<User> {
    let user = ctx.user_repo
        .create(NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "unused".to_string(),
            nickname: username.to_string(),
            role: UserRole::Student,
        })
        .await?;

    Ok(user)
}

pub async fn create_user(ctx: &ServiceContext, username: &str, role: UserRole) -> anyhow::Result<User> {
    let user = ctx.user_service
        .create_with_role(
            RegisterUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password: "password123".to_string(),
            },
            role,
        )
        .await?;

    Ok(user)
}

pub async fn create_course(ctx: &ServiceContext, teacher: &User, price_cents: i64) -> anyhow::Result<Course> {
    let course = ctx.course_service
        .create(
            teacher.id,
            teacher.role,
            CreateCourseRequest {
                title: "Rust for Beginners".to_string(),
                description: "Ownership, borrowing and lifetimes".to_string(),
                price_cents,
                level: 1,
                status: CourseStatus::Listed,
            },
        )
        .await?;

    Ok(course)
}

pub async fn student_count(ctx: &ServiceContext, course_id: i64) -> anyhow::Result<i64> {
    Ok(ctx.course_service.get(course_id).await?.student_count)
}
