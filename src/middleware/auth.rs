use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::validate_jwt;
use crate::database::repository::UserRepository;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, injected into request extensions by `jwt_auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
}

/// JWT authentication middleware that validates tokens and checks the user is still active
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract JWT from Authorization header
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    // Validate and decode JWT
    let claims = validate_jwt(&token, &state.config.security)?;
    let user_id = claims.user_id()?;

    // Tokens outlive accounts; confirm the user still exists and is active
    let mut conn = state.pool.acquire().await.map_err(crate::database::DatabaseError::from)?;
    let user = UserRepository::find_by_id(&mut conn, user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| {
            tracing::warn!("Token presented for missing or inactive user {}", user_id);
            ApiError::unauthorized("User inactive or deleted.")
        })?;
    drop(conn);

    request.extensions_mut().insert(AuthUser { id: user.id });

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Authentication credentials were not provided.".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
