use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::{info, warn};

use crate::database::models::{Pdd, VideoObj};
use crate::database::repository::{PddFields, PddRepository, VideoRepository};
use crate::storage::{pdd_video_file_path, FileStorage};

use super::{validate_char_field, ServiceError};

pub const NAME_MAX_LENGTH: usize = 255;

/// A PDD with the ids of its linked videos
#[derive(Debug, Clone)]
pub struct PddWithVideos {
    pub pdd: Pdd,
    pub video_ids: Vec<i64>,
}

/// A PDD with its linked videos expanded
#[derive(Debug, Clone)]
pub struct PddDetail {
    pub pdd: Pdd,
    pub videos: Vec<VideoObj>,
}

/// Partial update. `None` leaves the stored value (or link set) untouched.
#[derive(Debug, Clone, Default)]
pub struct PddChanges {
    pub name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub videos: Option<Vec<i64>>,
}

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

pub struct PddService {
    pool: PgPool,
    storage: Arc<dyn FileStorage>,
    restrict_video_links_to_owner: bool,
}

impl PddService {
    pub fn new(pool: PgPool, storage: Arc<dyn FileStorage>, restrict_video_links_to_owner: bool) -> Self {
        Self {
            pool,
            storage,
            restrict_video_links_to_owner,
        }
    }

    /// The owner's PDDs, most recent first
    pub async fn list_pdds(&self, owner: i64) -> Result<Vec<PddWithVideos>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let pdds = PddRepository::list_for_owner(&mut conn, owner).await?;

        let ids: Vec<i64> = pdds.iter().map(|p| p.id).collect();
        let mut links = PddRepository::video_ids_for(&mut conn, &ids).await?;

        Ok(pdds
            .into_iter()
            .map(|pdd| {
                let video_ids = links.remove(&pdd.id).unwrap_or_default();
                PddWithVideos { pdd, video_ids }
            })
            .collect())
    }

    /// NotFound when the PDD is absent or belongs to another user
    pub async fn get_pdd(&self, owner: i64, id: i64) -> Result<PddWithVideos, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let pdd = PddRepository::find_owned(&mut conn, owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let video_ids = PddRepository::video_ids(&mut conn, pdd.id).await?;
        Ok(PddWithVideos { pdd, video_ids })
    }

    /// `get_pdd` with linked videos expanded into full records
    pub async fn get_pdd_detail(&self, owner: i64, id: i64) -> Result<PddDetail, ServiceError> {
        let PddWithVideos { pdd, video_ids } = self.get_pdd(owner, id).await?;
        let mut conn = self.pool.acquire().await?;
        let videos = VideoRepository::find_by_ids(&mut conn, &video_ids).await?;
        Ok(PddDetail { pdd, videos })
    }

    pub async fn create_pdd(
        &self,
        owner: i64,
        name: &str,
        timestamp: DateTime<Utc>,
        video_ids: &[i64],
    ) -> Result<PddWithVideos, ServiceError> {
        validate_char_field("name", name, NAME_MAX_LENGTH)?;

        let mut tx = self.pool.begin().await?;
        let video_ids = self.resolve_videos(&mut tx, owner, video_ids).await?;
        let fields = PddFields {
            name: name.to_string(),
            timestamp,
        };
        let pdd = PddRepository::insert(&mut tx, owner, &fields).await?;
        PddRepository::add_videos(&mut tx, pdd.id, &video_ids).await?;
        tx.commit().await?;

        info!("User {} created pdd {} with {} videos", owner, pdd.id, video_ids.len());
        Ok(PddWithVideos { pdd, video_ids })
    }

    /// Change only the supplied fields; omitted videos keep their links
    pub async fn update_pdd(
        &self,
        owner: i64,
        id: i64,
        changes: PddChanges,
    ) -> Result<PddWithVideos, ServiceError> {
        if let Some(name) = changes.name.as_deref() {
            validate_char_field("name", name, NAME_MAX_LENGTH)?;
        }

        let mut tx = self.pool.begin().await?;
        PddRepository::find_owned_for_update(&mut tx, owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let pdd = PddRepository::update_fields(&mut tx, id, changes.name.as_deref(), changes.timestamp).await?;
        if let Some(videos) = changes.videos.as_deref() {
            let video_ids = self.resolve_videos(&mut tx, owner, videos).await?;
            PddRepository::set_videos(&mut tx, id, &video_ids).await?;
        }
        let video_ids = PddRepository::video_ids(&mut tx, id).await?;
        tx.commit().await?;

        info!("User {} updated pdd {}", owner, id);
        Ok(PddWithVideos { pdd, video_ids })
    }

    /// Full replace. Omitted videos clear every existing link.
    pub async fn replace_pdd(
        &self,
        owner: i64,
        id: i64,
        name: &str,
        timestamp: DateTime<Utc>,
        videos: Option<Vec<i64>>,
    ) -> Result<PddWithVideos, ServiceError> {
        validate_char_field("name", name, NAME_MAX_LENGTH)?;

        let mut tx = self.pool.begin().await?;
        PddRepository::find_owned_for_update(&mut tx, owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let video_ids = self
            .resolve_videos(&mut tx, owner, &videos.unwrap_or_default())
            .await?;
        let pdd = PddRepository::update_fields(&mut tx, id, Some(name), Some(timestamp)).await?;
        PddRepository::set_videos(&mut tx, id, &video_ids).await?;
        tx.commit().await?;

        info!("User {} replaced pdd {}", owner, id);
        Ok(PddWithVideos { pdd, video_ids })
    }

    /// Store an uploaded video under a fresh name and point the PDD at it.
    ///
    /// The record lock is taken before the file is inspected, so an unknown id
    /// reports NotFound even when the payload is also missing. If the row
    /// update fails after the file was written, the file is removed again.
    pub async fn attach_video_file(
        &self,
        owner: i64,
        id: i64,
        file: Option<UploadedFile>,
    ) -> Result<Pdd, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let current = PddRepository::find_owned_for_update(&mut tx, owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        let file = file.ok_or_else(|| ServiceError::field("videofile", "No file was submitted."))?;
        if file.contents.is_empty() {
            return Err(ServiceError::field("videofile", "The submitted file is empty."));
        }

        let path = pdd_video_file_path(&file.filename);
        self.storage.save(&path, &file.contents).await?;

        let updated = match Self::store_videofile(tx, id, &path).await {
            Ok(pdd) => pdd,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    warn!("Failed to remove orphaned upload {}: {}", path, cleanup);
                }
                return Err(e);
            }
        };

        if let Some(previous) = current.videofile.filter(|p| *p != path) {
            self.remove_file(&previous).await;
        }

        info!("User {} attached {} ({} bytes) to pdd {}", owner, path, file.contents.len(), id);
        Ok(updated)
    }

    /// Delete the PDD, its links, and its stored file
    pub async fn delete_pdd(&self, owner: i64, id: i64) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        let pdd = PddRepository::find_owned_for_update(&mut tx, owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        PddRepository::delete(&mut tx, id).await?;
        tx.commit().await?;

        if let Some(path) = pdd.videofile {
            self.remove_file(&path).await;
        }

        info!("User {} deleted pdd {}", owner, id);
        Ok(())
    }

    async fn store_videofile(
        mut tx: Transaction<'_, Postgres>,
        id: i64,
        path: &str,
    ) -> Result<Pdd, ServiceError> {
        let pdd = PddRepository::set_videofile(&mut tx, id, Some(path)).await?;
        tx.commit().await?;
        Ok(pdd)
    }

    async fn remove_file(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            warn!("Failed to remove stored file {}: {}", path, e);
        }
    }

    /// Deduplicate and check that every referenced video exists.
    ///
    /// Videos are looked up across all owners unless
    /// `restrict_video_links_to_owner` is set.
    async fn resolve_videos(
        &self,
        conn: &mut PgConnection,
        owner: i64,
        requested: &[i64],
    ) -> Result<Vec<i64>, ServiceError> {
        let mut ids = requested.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let scope = self.restrict_video_links_to_owner.then_some(owner);
        let existing = VideoRepository::existing_ids(conn, &ids, scope).await?;

        if let Some(missing) = requested.iter().find(|id| !existing.contains(id)) {
            return Err(ServiceError::field(
                "videos",
                format!("Invalid pk \"{missing}\" - object does not exist."),
            ));
        }
        Ok(ids)
    }
}
