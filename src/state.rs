use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{PddService, UserService, VideoService};
use crate::storage::FileStorage;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            storage,
        }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone())
    }

    pub fn videos(&self) -> VideoService {
        VideoService::new(self.pool.clone())
    }

    pub fn pdds(&self) -> PddService {
        PddService::new(
            self.pool.clone(),
            self.storage.clone(),
            self.config.security.restrict_video_links_to_owner,
        )
    }
}
