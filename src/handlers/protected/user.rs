use axum::extract::{Extension, State};

use crate::api::user::{self, UserResponse, UserUpdateRequest};
use crate::api::AppJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /user/me - Profile of the authenticated user
pub async fn me(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<UserResponse> {
    let current = state.users().get_user(auth.id).await?;
    Ok(ApiResponse::success(UserResponse::from(current)))
}

/// PATCH /user/me - Update email, name or password of the authenticated user
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(payload): AppJson<UserUpdateRequest>,
) -> ApiResult<UserResponse> {
    let changes = user::validate_update(payload)?;
    let updated = state.users().update_user(auth.id, changes).await?;
    Ok(ApiResponse::success(UserResponse::from(updated)))
}
