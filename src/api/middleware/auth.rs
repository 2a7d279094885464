use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    api::state::AppState,
    domain::{UserRole, UserStatus},
    error::AppError,
};

/// Caller identity resolved from a validated bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
}

pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;

    let claims = state.service_context.auth_service
        .validate_token(bearer.token())?;

    // Tokens outlive account changes; re-check the account on every request
    let user = state.service_context.user_repo
        .find_by_id(claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if user.status != UserStatus::Active {
        return Err(AppError::Forbidden);
    }

    // Insert current user into request extensions
    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    Ok(next.run(request).await)
}
