use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::VideoObj;

pub struct VideoRepository;

impl VideoRepository {
    /// Videos owned by `owner`, ordered by title descending
    pub async fn list_for_owner(
        conn: &mut PgConnection,
        owner: i64,
    ) -> Result<Vec<VideoObj>, DatabaseError> {
        let rows = sqlx::query_as::<_, VideoObj>(
            "SELECT id, title, user_id FROM video_objs WHERE user_id = $1 ORDER BY title DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        owner: i64,
        title: &str,
    ) -> Result<VideoObj, DatabaseError> {
        let row = sqlx::query_as::<_, VideoObj>(
            "INSERT INTO video_objs (title, user_id) VALUES ($1, $2) RETURNING id, title, user_id",
        )
        .bind(title)
        .bind(owner)
        .fetch_one(&mut *conn)
        .await?;
        Ok(row)
    }

    /// Videos with the given ids regardless of owner, ordered by id
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        ids: &[i64],
    ) -> Result<Vec<VideoObj>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query_as::<_, VideoObj>(
            "SELECT id, title, user_id FROM video_objs WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Subset of `ids` that exist, optionally restricted to one owner
    pub async fn existing_ids(
        conn: &mut PgConnection,
        ids: &[i64],
        owner: Option<i64>,
    ) -> Result<Vec<i64>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT id FROM video_objs WHERE id = ANY($1) AND ($2::BIGINT IS NULL OR user_id = $2)",
        )
        .bind(ids)
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
