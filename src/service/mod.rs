pub mod user_service;
pub mod course_service;
pub mod enrollment_service;
pub mod payment_service;
pub mod settlement_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::repository::*;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::domain::PaymentMethod;
use crate::error::{AppError, Result};
use crate::payments::{generator_for, OrderTokenGenerator};
use user_service::UserService;
use course_service::CourseService;
use enrollment_service::EnrollmentService;
use payment_service::PaymentService;
use settlement_service::SettlementService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub payment_service: Arc<PaymentService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        course_repo: Arc<dyn CourseRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        auth_service: Arc<AuthService>,
        order_tokens: Arc<dyn OrderTokenGenerator>,
        payment_methods: Vec<PaymentMethod>,
        db_pool: SqlitePool,
    ) -> Self {
        let settlement_service = Arc::new(SettlementService::new(db_pool.clone()));

        let user_service = Arc::new(UserService::new(user_repo.clone(), auth_service.clone()));
        let course_service = Arc::new(CourseService::new(course_repo.clone()));
        let enrollment_service = Arc::new(EnrollmentService::new(
            enrollment_repo.clone(),
            course_repo.clone(),
        ));
        let payment_service = Arc::new(PaymentService::new(
            payment_repo.clone(),
            course_repo.clone(),
            settlement_service,
            order_tokens,
            payment_methods,
        ));

        Self {
            user_repo,
            course_repo,
            payment_repo,
            enrollment_repo,
            auth_service,
            user_service,
            course_service,
            enrollment_service,
            payment_service,
            db_pool,
        }
    }

    /// Wire the SQLite repositories and services from loaded settings.
    pub fn with_sqlite(db_pool: SqlitePool, settings: &Settings) -> Self {
        let payment_methods = settings.payments.methods
            .iter()
            .filter_map(|name| {
                let method = PaymentMethod::from_str(name);
                if method.is_none() {
                    tracing::warn!("Ignoring unknown payment method in config: {}", name);
                }
                method
            })
            .collect();

        Self::new(
            Arc::new(SqliteUserRepository::new(db_pool.clone())),
            Arc::new(SqliteCourseRepository::new(db_pool.clone())),
            Arc::new(SqlitePaymentRepository::new(db_pool.clone())),
            Arc::new(SqliteEnrollmentRepository::new(db_pool.clone())),
            Arc::new(AuthService::new(&settings.auth)),
            generator_for(settings.payments.order_token_format),
            payment_methods,
            db_pool,
        )
    }
}

/// Row offset for a 1-indexed page. Pages past what `i64` can address are rejected.
pub fn page_offset(page: i64, page_size: i64) -> Result<i64> {
    (page.max(1) - 1)
        .checked_mul(page_size.max(0))
        .ok_or_else(|| AppError::InvalidInput("Page out of range".to_string()))
}
