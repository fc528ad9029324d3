use sqlx::PgPool;
use tracing::info;

use crate::database::models::VideoObj;
use crate::database::repository::VideoRepository;

use super::{validate_char_field, ServiceError};

pub const TITLE_MAX_LENGTH: usize = 255;

pub struct VideoService {
    pool: PgPool,
}

impl VideoService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The owner's videos, ordered by title descending
    pub async fn list_videos(&self, owner: i64) -> Result<Vec<VideoObj>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(VideoRepository::list_for_owner(&mut conn, owner).await?)
    }

    /// Owner always comes from the authenticated caller, never from the payload
    pub async fn create_video(&self, owner: i64, title: &str) -> Result<VideoObj, ServiceError> {
        validate_char_field("title", title, TITLE_MAX_LENGTH)?;

        let mut tx = self.pool.begin().await?;
        let video = VideoRepository::insert(&mut tx, owner, title).await?;
        tx.commit().await?;

        info!("User {} created video {}", owner, video.id);
        Ok(video)
    }
}
