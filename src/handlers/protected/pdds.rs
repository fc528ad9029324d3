use axum::extract::{multipart::MultipartRejection, Extension, Multipart, State};

use crate::api::pdd::{
    self, PddDetailResponse, PddRequest, PddResponse, PddVideoFileResponse,
};
use crate::api::{AppJson, AppPath};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UploadedFile;
use crate::state::AppState;

/// Multipart field carrying the uploaded video
const VIDEOFILE_FIELD: &str = "videofile";

/// GET /pdds - The caller's PDDs, most recent first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<PddResponse>> {
    let pdds = state.pdds().list_pdds(auth.id).await?;
    Ok(ApiResponse::success(pdds.into_iter().map(PddResponse::from).collect()))
}

/// POST /pdds - Create a PDD owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppJson(payload): AppJson<PddRequest>,
) -> ApiResult<PddResponse> {
    let new = pdd::validate_create(payload)?;
    let created = state
        .pdds()
        .create_pdd(auth.id, &new.name, new.timestamp, &new.videos)
        .await?;
    Ok(ApiResponse::created(PddResponse::from(created)))
}

/// GET /pdds/:id - Detail with videos expanded
pub async fn detail(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<PddDetailResponse> {
    let found = state.pdds().get_pdd_detail(auth.id, id).await?;
    Ok(ApiResponse::success(PddDetailResponse::from(found)))
}

/// PATCH /pdds/:id - Change only the supplied fields
pub async fn partial_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<PddRequest>,
) -> ApiResult<PddResponse> {
    let changes = pdd::validate_partial(payload)?;
    let updated = state.pdds().update_pdd(auth.id, id, changes).await?;
    Ok(ApiResponse::success(PddResponse::from(updated)))
}

/// PUT /pdds/:id - Full replace; an omitted `videos` clears the links
pub async fn replace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<PddRequest>,
) -> ApiResult<PddResponse> {
    let replacement = pdd::validate_replace(payload)?;
    let replaced = state
        .pdds()
        .replace_pdd(auth.id, id, &replacement.name, replacement.timestamp, replacement.videos)
        .await?;
    Ok(ApiResponse::success(PddResponse::from(replaced)))
}

/// DELETE /pdds/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppPath(id): AppPath<i64>,
) -> ApiResult<()> {
    state.pdds().delete_pdd(auth.id, id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /pdds/:id/upload-video - Attach a video file (multipart field `videofile`)
///
/// Ownership is checked before the body is read, so unknown ids answer 404
/// whatever the payload. A body that is not multipart carries no file.
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    AppPath(id): AppPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<PddVideoFileResponse> {
    let pdds = state.pdds();
    pdds.get_pdd(auth.id, id).await?;

    let file = match multipart {
        Ok(multipart) => read_videofile(multipart).await?,
        Err(rejection) => {
            tracing::debug!("Upload without multipart body: {}", rejection);
            None
        }
    };

    let updated = pdds.attach_video_file(auth.id, id, file).await?;
    Ok(ApiResponse::success(PddVideoFileResponse::new(updated, state.storage.as_ref())))
}

/// Pull the first `videofile` part that carries a filename
async fn read_videofile(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(VIDEOFILE_FIELD) {
            continue;
        }
        // Parts without a filename are plain form values, not files
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let contents = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {e}")))?;
        return Ok(Some(UploadedFile {
            filename,
            contents: contents.to_vec(),
        }));
    }
    Ok(None)
}
