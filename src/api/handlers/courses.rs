use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    api::{
        handlers::{PageParams, Paged},
        middleware::auth::CurrentUser,
        state::AppState,
    },
    domain::{
        cents_to_decimal, decimal_to_cents, Course, CourseStatus, CreateCourseRequest,
        UpdateCourseRequest,
    },
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct CourseDto {
    id: i64,
    title: String,
    description: String,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    teacher_id: i64,
    level: i32,
    student_count: i64,
    status: CourseStatus,
    created_at: String,
}

impl From<Course> for CourseDto {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price: cents_to_decimal(course.price_cents),
            teacher_id: course.teacher_id,
            level: course.level,
            student_count: course.student_count,
            status: course.status,
            created_at: course.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseDto {
    title: String,
    #[serde(default)]
    description: String,
    price: Decimal,
    #[serde(default = "default_level")]
    level: i32,
    #[serde(default = "default_status")]
    status: CourseStatus,
}

fn default_level() -> i32 {
    1
}

fn default_status() -> CourseStatus {
    CourseStatus::Listed
}

#[derive(Debug, Deserialize)]
pub struct UpdateCourseDto {
    title: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    level: Option<i32>,
    status: Option<CourseStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Paged<CourseDto>>> {
    let (courses, total) = state.service_context.course_service
        .list(params.page(), params.page_size())
        .await?;

    Ok(Json(Paged {
        list: courses.into_iter().map(Into::into).collect(),
        total,
        page: params.page(),
        page_size: params.page_size(),
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseDto>> {
    let course = state.service_context.course_service
        .get(id)
        .await?;

    Ok(Json(course.into()))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(dto): Json<CreateCourseDto>,
) -> Result<(StatusCode, Json<CourseDto>)> {
    let request = CreateCourseRequest {
        title: dto.title,
        description: dto.description,
        price_cents: decimal_to_cents(dto.price)?,
        level: dto.level,
        status: dto.status,
    };

    let course = state.service_context.course_service
        .create(user.id, user.role, request)
        .await?;

    Ok((StatusCode::CREATED, Json(course.into())))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(dto): Json<UpdateCourseDto>,
) -> Result<Json<CourseDto>> {
    let request = UpdateCourseRequest {
        title: dto.title,
        description: dto.description,
        price_cents: dto.price.map(decimal_to_cents).transpose()?,
        level: dto.level,
        status: dto.status,
    };

    let course = state.service_context.course_service
        .update(user.role, id, request)
        .await?;

    Ok(Json(course.into()))
}
