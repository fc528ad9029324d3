//! File storage behind a trait so the PDD catalog never touches the filesystem directly.

mod local;

pub use local::LocalFileStorage;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Fixed prefix for uploaded PDD video files, relative to the storage root
pub const PDD_VIDEO_UPLOAD_DIR: &str = "uploads/videos";

/// Longest extension kept; the stored path must fit a 100 character column
const MAX_EXTENSION_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write `contents` at `path`, creating parent directories as needed
    async fn save(&self, path: &str, contents: &[u8]) -> Result<(), StorageError>;

    /// Remove the file at `path`. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Public URL a client can fetch the stored file from
    fn url(&self, path: &str) -> String;
}

/// Upload path for a PDD video: a fresh v4 uuid plus the original extension.
///
/// Only the extension of `original_filename` is used. Extensions that are not
/// plain alphanumerics are dropped rather than risk a path component.
pub fn pdd_video_file_path(original_filename: &str) -> String {
    let name = Uuid::new_v4();
    match file_extension(original_filename) {
        Some(ext) => format!("{PDD_VIDEO_UPLOAD_DIR}/{name}.{ext}"),
        None => format!("{PDD_VIDEO_UPLOAD_DIR}/{name}"),
    }
}

fn file_extension(filename: &str) -> Option<&str> {
    let base = Path::new(filename).file_name()?.to_str()?;
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext)
}
