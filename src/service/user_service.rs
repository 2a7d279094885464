use std::sync::Arc;

use crate::{
    auth::AuthService,
    domain::{NewUser, User, UserRole, UserStatus},
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    auth_service: Arc<AuthService>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, auth_service: Arc<AuthService>) -> Self {
        Self { repo, auth_service }
    }

    /// Self-service registration always creates a student.
    pub async fn register(&self, request: RegisterUser) -> Result<User> {
        self.create_with_role(request, UserRole::Student).await
    }

    pub async fn create_with_role(&self, request: RegisterUser, role: UserRole) -> Result<User> {
        // Check for duplicate username
        if self.repo.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        // Check for duplicate email
        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = AuthService::hash_password(&request.password).await?;

        let user = self.repo
            .create(NewUser {
                nickname: request.username.clone(),
                username: request.username,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        tracing::info!("Registered user {} ({}) as {}", user.username, user.id, role.as_str());

        Ok(user)
    }

    /// Returns a signed bearer token and the user it was issued for.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User)> {
        let password_hash = self.repo
            .get_password_hash(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !AuthService::verify_password(password, &password_hash).await? {
            tracing::debug!("Failed login for {}", username);
            return Err(AppError::Unauthorized);
        }

        let user = self.repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.status != UserStatus::Active {
            return Err(AppError::Unauthorized);
        }

        let token = self.auth_service.issue_token(&user)?;

        Ok((token, user))
    }

    pub async fn profile(&self, user_id: i64) -> Result<User> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_nickname(&self, user_id: i64, nickname: &str) -> Result<User> {
        let nickname = nickname.trim();
        if nickname.is_empty() || nickname.chars().count() > 50 {
            return Err(AppError::InvalidInput(
                "Nickname must be between 1 and 50 characters".to_string(),
            ));
        }

        self.repo.update_nickname(user_id, nickname).await
    }
}
