use std::sync::Arc;

use crate::{
    domain::{NewPayment, Payment, PaymentListItem, PaymentMethod, PaymentStatus},
    error::{AppError, Result},
    payments::OrderTokenGenerator,
    repository::{CourseRepository, PaymentRepository},
    service::{page_offset, settlement_service::SettlementService},
};

pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRepository>,
    course_repo: Arc<dyn CourseRepository>,
    settlement: Arc<SettlementService>,
    tokens: Arc<dyn OrderTokenGenerator>,
    methods: Vec<PaymentMethod>,
}

impl PaymentService {
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        course_repo: Arc<dyn CourseRepository>,
        settlement: Arc<SettlementService>,
        tokens: Arc<dyn OrderTokenGenerator>,
        methods: Vec<PaymentMethod>,
    ) -> Self {
        Self {
            payment_repo,
            course_repo,
            settlement,
            tokens,
            methods,
        }
    }

    fn parse_method(&self, method: &str) -> Result<PaymentMethod> {
        PaymentMethod::from_str(method)
            .filter(|m| self.methods.contains(m))
            .ok_or_else(|| AppError::InvalidInput(format!("Unsupported payment method: {}", method)))
    }

    /// Open a `pending` order whose amount is the course price right now.
    pub async fn create_order(&self, user_id: i64, course_id: i64, method: &str) -> Result<Payment> {
        let payment_method = self.parse_method(method)?;

        let amount_cents = self.course_repo
            .price_of(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let order = self.payment_repo
            .create(NewPayment {
                order_id: self.tokens.generate(),
                user_id,
                course_id,
                amount_cents,
                payment_method,
            })
            .await?;

        tracing::info!(
            "Created order {} for user {} course {} ({} cents via {})",
            order.order_id,
            user_id,
            course_id,
            amount_cents,
            payment_method.as_str()
        );

        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Payment> {
        self.payment_repo
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment order not found".to_string()))
    }

    /// Newest first. `page` is 1-indexed; `page_size` is not capped.
    pub async fn list_orders(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<PaymentListItem>, i64)> {
        let offset = page_offset(page, page_size)?;
        self.payment_repo.list_by_user(user_id, page_size, offset).await
    }

    /// Record a status reported by the gateway or an operator. `completed`
    /// settles the order and grants the enrollment in the same step.
    pub async fn update_status(
        &self,
        order_id: &str,
        external_txn_id: &str,
        status: &str,
    ) -> Result<Payment> {
        let status = PaymentStatus::from_str(status)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown payment status: {}", status)))?;

        self.settlement
            .apply_status(order_id, Some(external_txn_id), status)
            .await
    }
}
