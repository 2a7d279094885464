use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    api::{
        handlers::{Ack, PageParams, Paged},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{cents_to_decimal, Enrollment, EnrollmentListItem},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct EnrollmentDto {
    id: i64,
    course_id: i64,
    order_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    /// 1 = active, 0 = revoked
    status: i32,
    created_at: String,
}

impl From<Enrollment> for EnrollmentDto {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            course_id: enrollment.course_id,
            order_id: enrollment.order_token,
            price: cents_to_decimal(enrollment.price_cents),
            status: enrollment.status.as_i32(),
            created_at: enrollment.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrollmentListItemDto {
    #[serde(flatten)]
    enrollment: EnrollmentDto,
    course_title: Option<String>,
    course_level: Option<i32>,
}

impl From<EnrollmentListItem> for EnrollmentListItemDto {
    fn from(item: EnrollmentListItem) -> Self {
        Self {
            enrollment: item.enrollment.into(),
            course_title: item.course_title,
            course_level: item.course_level,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paged<EnrollmentListItemDto>>> {
    let (items, total) = state.service_context.enrollment_service
        .list_active(user.id, params.page(), params.page_size())
        .await?;

    Ok(Json(Paged {
        list: items.into_iter().map(Into::into).collect(),
        total,
        page: params.page(),
        page_size: params.page_size(),
    }))
}

pub async fn enroll(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<(StatusCode, Json<EnrollmentDto>)> {
    let enrollment = state.service_context.enrollment_service
        .enroll(user.id, course_id)
        .await?;

    Ok((StatusCode::CREATED, Json(enrollment.into())))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<Json<EnrollmentDto>> {
    let enrollment = state.service_context.enrollment_service
        .get(user.id, course_id)
        .await?;

    Ok(Json(enrollment.into()))
}

pub async fn unenroll(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i64>,
) -> Result<Json<Ack>> {
    state.service_context.enrollment_service
        .unenroll(user.id, course_id)
        .await?;

    Ok(Json(Ack::new("Unenrolled")))
}
