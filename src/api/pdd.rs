use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::Pdd;
use crate::error::{ApiError, FieldErrors};
use crate::services::{PddChanges, PddDetail, PddWithVideos};
use crate::storage::FileStorage;

use super::{not_null, present, require_not_null};
use super::video::VideoResponse;

const TIMESTAMP_FORMAT_ERROR: &str =
    "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

/// Body of POST, PUT and PATCH on the PDD collection and records.
/// The outer `Option` tells an omitted field from an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct PddRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub timestamp: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub videos: Option<Option<Vec<i64>>>,
}

/// Validated input for create
#[derive(Debug, Clone, PartialEq)]
pub struct NewPdd {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub videos: Vec<i64>,
}

/// Validated input for a full replace. `videos: None` means the client omitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct PddReplacement {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub videos: Option<Vec<i64>>,
}

/// List, create and update shape: video references as bare ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PddResponse {
    pub id: i64,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub videos: Vec<i64>,
}

/// Detail shape: video references expanded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PddDetailResponse {
    pub id: i64,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub videos: Vec<VideoResponse>,
}

/// Upload sub-action shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PddVideoFileResponse {
    pub id: i64,
    pub videofile: Option<String>,
}

impl From<PddWithVideos> for PddResponse {
    fn from(value: PddWithVideos) -> Self {
        Self {
            id: value.pdd.id,
            name: value.pdd.name,
            timestamp: value.pdd.timestamp,
            videos: value.video_ids,
        }
    }
}

impl From<PddDetail> for PddDetailResponse {
    fn from(value: PddDetail) -> Self {
        Self {
            id: value.pdd.id,
            name: value.pdd.name,
            timestamp: value.pdd.timestamp,
            videos: value.videos.into_iter().map(VideoResponse::from).collect(),
        }
    }
}

impl PddVideoFileResponse {
    pub fn new(pdd: Pdd, storage: &dyn FileStorage) -> Self {
        Self {
            id: pdd.id,
            videofile: pdd.videofile.as_deref().map(|path| storage.url(path)),
        }
    }
}

/// Accept RFC 3339 instants, or naive `YYYY-MM-DD[ T]hh:mm[:ss]` taken as UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TIMESTAMP_FORMAT_ERROR.to_string())
}

fn parse_timestamp_field(errors: &mut FieldErrors, value: Option<&str>) -> Option<DateTime<Utc>> {
    match parse_timestamp(value?) {
        Ok(timestamp) => Some(timestamp),
        Err(message) => {
            errors.insert("timestamp".to_string(), message);
            None
        }
    }
}

fn finish<T>(errors: FieldErrors, value: Option<T>) -> Result<T, ApiError> {
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(ApiError::invalid_fields(errors)),
    }
}

/// POST: name and timestamp required, videos default to none
pub fn validate_create(request: PddRequest) -> Result<NewPdd, ApiError> {
    let replacement = validate_replace(request)?;
    Ok(NewPdd {
        name: replacement.name,
        timestamp: replacement.timestamp,
        videos: replacement.videos.unwrap_or_default(),
    })
}

/// PUT: same required fields as create, omitted videos are kept as `None`
pub fn validate_replace(request: PddRequest) -> Result<PddReplacement, ApiError> {
    let mut errors = FieldErrors::new();
    let name = require_not_null(&mut errors, "name", request.name);
    let timestamp = require_not_null(&mut errors, "timestamp", request.timestamp)
        .and_then(|raw| parse_timestamp_field(&mut errors, Some(&raw)));
    let videos = not_null(&mut errors, "videos", request.videos);

    let replacement = match (name, timestamp) {
        (Some(name), Some(timestamp)) => Some(PddReplacement { name, timestamp, videos }),
        _ => None,
    };
    finish(errors, replacement)
}

/// PATCH: every field optional
pub fn validate_partial(request: PddRequest) -> Result<PddChanges, ApiError> {
    let mut errors = FieldErrors::new();
    let name = not_null(&mut errors, "name", request.name);
    let raw_timestamp = not_null(&mut errors, "timestamp", request.timestamp);
    let timestamp = parse_timestamp_field(&mut errors, raw_timestamp.as_deref());
    let videos = not_null(&mut errors, "videos", request.videos);

    let changes = PddChanges { name, timestamp, videos };
    finish(errors, Some(changes))
}
