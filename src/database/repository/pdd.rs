use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use std::collections::HashMap;

use crate::database::manager::DatabaseError;
use crate::database::models::Pdd;

const PDD_COLUMNS: &str = "id, user_id, name, \"timestamp\", videofile";

/// Scalar columns written on create and full replace
#[derive(Debug, Clone)]
pub struct PddFields {
    pub name: String,
    pub timestamp: DateTime<Utc>,
}

pub struct PddRepository;

impl PddRepository {
    /// PDDs owned by `owner`, most recent first
    pub async fn list_for_owner(conn: &mut PgConnection, owner: i64) -> Result<Vec<Pdd>, DatabaseError> {
        let sql = format!("SELECT {PDD_COLUMNS} FROM pdds WHERE user_id = $1 ORDER BY id DESC");
        let rows = sqlx::query_as::<_, Pdd>(&sql)
            .bind(owner)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// Fetch by id and owner together so other users' rows look absent
    pub async fn find_owned(
        conn: &mut PgConnection,
        owner: i64,
        id: i64,
    ) -> Result<Option<Pdd>, DatabaseError> {
        let sql = format!("SELECT {PDD_COLUMNS} FROM pdds WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, Pdd>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Same as `find_owned` but holds a row lock until the transaction ends
    pub async fn find_owned_for_update(
        conn: &mut PgConnection,
        owner: i64,
        id: i64,
    ) -> Result<Option<Pdd>, DatabaseError> {
        let sql = format!("SELECT {PDD_COLUMNS} FROM pdds WHERE id = $1 AND user_id = $2 FOR UPDATE");
        let row = sqlx::query_as::<_, Pdd>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn insert(conn: &mut PgConnection, owner: i64, fields: &PddFields) -> Result<Pdd, DatabaseError> {
        let sql = format!(
            "INSERT INTO pdds (user_id, name, \"timestamp\") VALUES ($1, $2, $3) RETURNING {PDD_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Pdd>(&sql)
            .bind(owner)
            .bind(&fields.name)
            .bind(fields.timestamp)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row)
    }

    /// Update scalar columns; `None` keeps the stored value
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: i64,
        name: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<Pdd, DatabaseError> {
        let sql = format!(
            "UPDATE pdds SET name = COALESCE($2, name), \"timestamp\" = COALESCE($3, \"timestamp\") \
             WHERE id = $1 RETURNING {PDD_COLUMNS}"
        );
        sqlx::query_as::<_, Pdd>(&sql)
            .bind(id)
            .bind(name)
            .bind(timestamp)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("pdd {id}")))
    }

    pub async fn set_videofile(
        conn: &mut PgConnection,
        id: i64,
        videofile: Option<&str>,
    ) -> Result<Pdd, DatabaseError> {
        let sql = format!("UPDATE pdds SET videofile = $2 WHERE id = $1 RETURNING {PDD_COLUMNS}");
        sqlx::query_as::<_, Pdd>(&sql)
            .bind(id)
            .bind(videofile)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("pdd {id}")))
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM pdds WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("pdd {id}")));
        }
        Ok(())
    }

    /// Linked video ids for one PDD, ascending
    pub async fn video_ids(conn: &mut PgConnection, pdd_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT videoobj_id FROM pdd_videos WHERE pdd_id = $1 ORDER BY videoobj_id",
        )
        .bind(pdd_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Linked video ids for many PDDs in one query. PDDs without links are absent from the map.
    pub async fn video_ids_for(
        conn: &mut PgConnection,
        pdd_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, DatabaseError> {
        let mut links: HashMap<i64, Vec<i64>> = HashMap::new();
        if pdd_ids.is_empty() {
            return Ok(links);
        }
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT pdd_id, videoobj_id FROM pdd_videos WHERE pdd_id = ANY($1) ORDER BY pdd_id, videoobj_id",
        )
        .bind(pdd_ids)
        .fetch_all(&mut *conn)
        .await?;
        for (pdd_id, video_id) in rows {
            links.entry(pdd_id).or_default().push(video_id);
        }
        Ok(links)
    }

    /// Replace the whole link set. An empty slice clears every link.
    pub async fn set_videos(
        conn: &mut PgConnection,
        pdd_id: i64,
        video_ids: &[i64],
    ) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM pdd_videos WHERE pdd_id = $1 AND NOT (videoobj_id = ANY($2))")
            .bind(pdd_id)
            .bind(video_ids)
            .execute(&mut *conn)
            .await?;
        Self::add_videos(conn, pdd_id, video_ids).await
    }

    pub async fn add_videos(
        conn: &mut PgConnection,
        pdd_id: i64,
        video_ids: &[i64],
    ) -> Result<(), DatabaseError> {
        if video_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            "INSERT INTO pdd_videos (pdd_id, videoobj_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             ON CONFLICT (pdd_id, videoobj_id) DO NOTHING",
        )
        .bind(pdd_id)
        .bind(video_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
