use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{handlers::users::UserDto, state::AppState},
    error::Result,
    service::user_service::RegisterUser,
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserDto>)> {
    req.validate()?;

    let user = state.service_context.user_service
        .register(RegisterUser {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let (token, user) = state.service_context.user_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}
