use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod user_repository;
pub mod course_repository;
pub mod payment_repository;
pub mod enrollment_repository;
pub mod write_tx;

pub use user_repository::SqliteUserRepository;
pub use course_repository::SqliteCourseRepository;
pub use payment_repository::SqlitePaymentRepository;
pub use enrollment_repository::SqliteEnrollmentRepository;
pub use write_tx::WriteTransaction;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn get_password_hash(&self, username: &str) -> Result<Option<String>>;
    async fn update_nickname(&self, id: i64, nickname: &str) -> Result<User>;
}

/// Course catalog, and the lookup contract the payment and enrollment flows rely on.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, teacher_id: i64, course: CreateCourseRequest) -> Result<Course>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Course>>;
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<Course>, i64)>;
    async fn update(&self, id: i64, update: UpdateCourseRequest) -> Result<Course>;
    async fn exists(&self, id: i64) -> Result<bool>;
    async fn price_of(&self, id: i64) -> Result<Option<i64>>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: NewPayment) -> Result<Payment>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Payment>>;
    async fn list_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PaymentListItem>, i64)>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn enroll(
        &self,
        user_id: i64,
        course_id: i64,
        order_token: Option<&str>,
    ) -> Result<Enrollment>;
    async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<()>;
    async fn find_latest(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>>;
    async fn list_active_by_user(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<EnrollmentListItem>, i64)>;
}
