use serde::{Deserialize, Serialize};

use crate::database::models::VideoObj;
use crate::error::{ApiError, FieldErrors};

use super::require;

#[derive(Debug, Deserialize)]
pub struct VideoCreateRequest {
    pub title: Option<String>,
}

/// `{id, title}`; the owner is never exposed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: i64,
    pub title: String,
}

impl From<VideoObj> for VideoResponse {
    fn from(video: VideoObj) -> Self {
        Self {
            id: video.id,
            title: video.title,
        }
    }
}

/// Extract the title; blank and length checks happen in the video catalog
pub fn validate_create(request: VideoCreateRequest) -> Result<String, ApiError> {
    let mut errors = FieldErrors::new();
    match require(&mut errors, "title", request.title) {
        Some(title) => Ok(title),
        None => Err(ApiError::invalid_fields(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_required() {
        let request: VideoCreateRequest = serde_json::from_str(r#"{"name": "Hello again"}"#).unwrap();
        let err = validate_create(request).unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["title"], "This field is required.");
    }

    #[test]
    fn response_hides_owner() {
        let video = VideoObj {
            id: 3,
            title: "Jurassic Park".into(),
            user_id: 9,
        };
        let body = serde_json::to_value(VideoResponse::from(video)).unwrap();
        assert_eq!(body, serde_json::json!({"id": 3, "title": "Jurassic Park"}));
    }
}
