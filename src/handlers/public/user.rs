use axum::extract::State;
use tracing::instrument;

use crate::api::user::{self, TokenRequest, TokenResponse, UserCreateRequest, UserResponse};
use crate::api::AppJson;
use crate::auth::issue_token;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /user/create - Register a new account
///
/// Input: `{"email", "password", "name"}`. Returns `{email, name}` with 201.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UserCreateRequest>,
) -> ApiResult<UserResponse> {
    let account = user::validate_create(payload)?;
    let created = state
        .users()
        .create_user(&account.email, Some(&account.password), account.fields)
        .await?;

    Ok(ApiResponse::created(UserResponse::from(created)))
}

/// POST /user/token - Exchange credentials for a bearer token
///
/// Bad credentials answer 400 with a `non_field_errors` entry.
#[instrument(skip(state, payload))]
pub async fn create_token(
    State(state): State<AppState>,
    AppJson(payload): AppJson<TokenRequest>,
) -> ApiResult<TokenResponse> {
    let (email, password) = user::validate_token(payload)?;
    let authenticated = state.users().verify_credential(&email, &password).await?;
    let token = issue_token(&authenticated, &state.config.security)?;

    tracing::info!("Issued token for user {}", authenticated.id);
    Ok(ApiResponse::success(TokenResponse { token }))
}
