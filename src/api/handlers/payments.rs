use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        handlers::{Ack, PageParams, Paged},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{cents_to_decimal, PaymentListItem, PaymentMethod, PaymentStatus},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    course_id: i64,
    payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct OrderSummary {
    order_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
    pay_url: String,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusDto {
    order_id: String,
    status: PaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    method: PaymentMethod,
    created_at: String,
}

#[derive(Debug, Serialize)]
pub struct OrderListItemDto {
    order_id: String,
    course_id: i64,
    course_title: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    method: PaymentMethod,
    status: PaymentStatus,
    created_at: String,
}

impl From<PaymentListItem> for OrderListItemDto {
    fn from(item: PaymentListItem) -> Self {
        let payment = item.payment;
        Self {
            order_id: payment.order_id,
            course_id: payment.course_id,
            course_title: item.course_title,
            amount: cents_to_decimal(payment.amount_cents),
            method: payment.payment_method,
            status: payment.status,
            created_at: payment.created_at.to_rfc3339(),
        }
    }
}

/// Settlement notification body, as posted by the gateway or an operator.
#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    order_id: String,
    #[serde(default)]
    transaction_id: String,
    status: String,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<OrderSummary>)> {
    let order = state.service_context.payment_service
        .create_order(user.id, req.course_id, &req.payment_method)
        .await?;

    let pay_url = format!("{}{}", state.settings.payments.pay_url_base, order.order_id);

    Ok((StatusCode::CREATED, Json(OrderSummary {
        order_id: order.order_id,
        amount: cents_to_decimal(order.amount_cents),
        method: order.payment_method,
        status: order.status,
        pay_url,
    })))
}

pub async fn status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusDto>> {
    let order = state.service_context.payment_service
        .get_order(&order_id)
        .await?;

    Ok(Json(OrderStatusDto {
        order_id: order.order_id,
        status: order.status,
        amount: cents_to_decimal(order.amount_cents),
        method: order.payment_method,
        created_at: order.created_at.to_rfc3339(),
    }))
}

pub async fn list_for_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paged<OrderListItemDto>>> {
    let (orders, total) = state.service_context.payment_service
        .list_orders(user.id, params.page(), params.page_size())
        .await?;

    Ok(Json(Paged {
        list: orders.into_iter().map(Into::into).collect(),
        total,
        page: params.page(),
        page_size: params.page_size(),
    }))
}

// Gateway callbacks are not signature-checked; see DESIGN.md.
pub async fn notify(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<Ack>> {
    state.service_context.payment_service
        .update_status(&req.order_id, &req.transaction_id, &req.status)
        .await?;

    Ok(Json(Ack::new("success")))
}
