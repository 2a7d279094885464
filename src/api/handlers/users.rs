use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{User, UserRole},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct UserDto {
    id: i64,
    username: String,
    email: String,
    nickname: String,
    role: UserRole,
    created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            nickname: user.nickname,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    nickname: String,
}

pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserDto>> {
    let user = state.service_context.user_service
        .profile(user.id)
        .await?;

    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserDto>> {
    let user = state.service_context.user_service
        .update_nickname(user.id, &req.nickname)
        .await?;

    Ok(Json(user.into()))
}
