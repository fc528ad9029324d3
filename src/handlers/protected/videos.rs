use axum::extract::{Extension, State};

use crate::api::video::{self, VideoCreateRequest, VideoResponse};
use crate::api::AppJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /videos - The caller's videos, ordered by title descending
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<VideoResponse>> {
    let videos = state.videos().list_videos(auth.id).await?;
    Ok(ApiResponse::success(videos.into_iter().map(VideoResponse::from).collect()))
}

/// POST /videos - Create a video owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(payload): AppJson<VideoCreateRequest>,
) -> ApiResult<VideoResponse> {
    let title = video::validate_create(payload)?;
    let created = state.videos().create_video(auth.id, &title).await?;
    Ok(ApiResponse::created(VideoResponse::from(created)))
}
