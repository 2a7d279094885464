use std::sync::Arc;

use crate::{
    domain::{Course, CreateCourseRequest, UpdateCourseRequest, UserRole, MAX_LEVEL, MIN_LEVEL},
    error::{AppError, Result},
    repository::CourseRepository,
    service::page_offset,
};

pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, page: i64, page_size: i64) -> Result<(Vec<Course>, i64)> {
        let offset = page_offset(page, page_size)?;
        self.repo.list(page_size, offset).await
    }

    pub async fn get(&self, id: i64) -> Result<Course> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
    }

    pub async fn create(
        &self,
        actor_id: i64,
        actor_role: UserRole,
        request: CreateCourseRequest,
    ) -> Result<Course> {
        if !actor_role.can_manage_courses() {
            return Err(AppError::Forbidden);
        }

        validate_title(&request.title)?;
        validate_price(request.price_cents)?;
        validate_level(request.level)?;

        let course = self.repo.create(actor_id, request).await?;
        tracing::info!("Course {} created by user {}", course.id, actor_id);

        Ok(course)
    }

    /// Price changes never touch existing orders; their amount is a snapshot.
    pub async fn update(
        &self,
        actor_role: UserRole,
        id: i64,
        request: UpdateCourseRequest,
    ) -> Result<Course> {
        if !actor_role.can_manage_courses() {
            return Err(AppError::Forbidden);
        }

        if let Some(ref title) = request.title {
            validate_title(title)?;
        }
        if let Some(price) = request.price_cents {
            validate_price(price)?;
        }
        if let Some(level) = request.level {
            validate_level(level)?;
        }

        self.repo.update(id, request).await
    }
}

fn validate_title(title: &str) -> Result<()> {
    let len = title.trim().chars().count();
    if !(2..=100).contains(&len) {
        return Err(AppError::InvalidInput(
            "Title must be between 2 and 100 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_price(price_cents: i64) -> Result<()> {
    if price_cents < 0 {
        return Err(AppError::InvalidInput("Price cannot be negative".to_string()));
    }
    Ok(())
}

fn validate_level(level: i32) -> Result<()> {
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
        return Err(AppError::InvalidInput(format!(
            "Level must be between {} and {}",
            MIN_LEVEL, MAX_LEVEL
        )));
    }
    Ok(())
}
