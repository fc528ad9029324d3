use chrono::Utc;
use sqlx::PgConnection;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

const USER_COLUMNS: &str =
    "id, email, name, password, is_active, is_staff, is_superuser, last_login, created_at";

/// Values for a new `users` row. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Column changes for an existing user; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

pub struct UserRepository;

impl UserRepository {
    pub async fn insert(conn: &mut PgConnection, user: &NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            "INSERT INTO users (email, name, password, is_active, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.name)
            .bind(&user.password)
            .bind(user.is_active)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        changes: &UserUpdate,
    ) -> Result<User, DatabaseError> {
        let sql = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                name = COALESCE($3, name), \
                password = COALESCE($4, password), \
                is_staff = COALESCE($5, is_staff), \
                is_superuser = COALESCE($6, is_superuser) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email.as_deref())
            .bind(changes.name.as_deref())
            .bind(changes.password.as_deref())
            .bind(changes.is_staff)
            .bind(changes.is_superuser)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {id}")))
    }

    pub async fn touch_last_login(conn: &mut PgConnection, id: i64) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
