use std::sync::Arc;

use crate::{
    domain::{Enrollment, EnrollmentListItem},
    error::{AppError, Result},
    repository::{CourseRepository, EnrollmentRepository},
    service::page_offset,
};

pub struct EnrollmentService {
    repo: Arc<dyn EnrollmentRepository>,
    course_repo: Arc<dyn CourseRepository>,
}

impl EnrollmentService {
    pub fn new(repo: Arc<dyn EnrollmentRepository>, course_repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo, course_repo }
    }

    /// Direct enrollment at the course's current price.
    pub async fn enroll(&self, user_id: i64, course_id: i64) -> Result<Enrollment> {
        let enrollment = self.repo.enroll(user_id, course_id, None).await?;
        tracing::info!("User {} enrolled in course {}", user_id, course_id);

        Ok(enrollment)
    }

    pub async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<()> {
        self.repo.unenroll(user_id, course_id).await?;
        tracing::info!("User {} unenrolled from course {}", user_id, course_id);

        Ok(())
    }

    /// Most recent record for the pair, active or revoked.
    pub async fn get(&self, user_id: i64, course_id: i64) -> Result<Enrollment> {
        if let Some(enrollment) = self.repo.find_latest(user_id, course_id).await? {
            return Ok(enrollment);
        }

        if !self.course_repo.exists(course_id).await? {
            return Err(AppError::NotFound("Course not found".to_string()));
        }

        Err(AppError::NotFound("Enrollment not found".to_string()))
    }

    pub async fn list_active(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<EnrollmentListItem>, i64)> {
        let offset = page_offset(page, page_size)?;
        self.repo.list_active_by_user(user_id, page_size, offset).await
    }
}
