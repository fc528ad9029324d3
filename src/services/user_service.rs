use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::auth::{hash_password, unusable_password, verify_password, verify_unknown_account};
use crate::database::models::User;
use crate::database::repository::{NewUser, UserRepository, UserUpdate};
use crate::database::DatabaseError;

use super::ServiceError;

/// Optional profile fields accepted at creation time
#[derive(Debug, Clone, Default)]
pub struct NewUserFields {
    pub name: String,
}

/// Profile changes for an existing user; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Lowercase the domain part of an email address. The local part is kept as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Identity store: account creation and credential checks
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a regular user. `None` password stores an unusable one.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        extra: NewUserFields,
    ) -> Result<User, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let user = Self::insert_user(&mut tx, email, password, extra).await?;
        tx.commit().await?;

        info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Create a user and escalate it to staff + superuser in one transaction
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let user = Self::insert_user(&mut tx, email, Some(password), NewUserFields::default()).await?;
        let escalate = UserUpdate {
            is_staff: Some(true),
            is_superuser: Some(true),
            ..Default::default()
        };
        let user = UserRepository::update(&mut tx, user.id, &escalate).await?;
        tx.commit().await?;

        info!("Created superuser {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Look up by normalized email and check the password against the stored hash
    pub async fn verify_credential(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        let mut conn = self.pool.acquire().await?;

        let Some(user) = UserRepository::find_by_email(&mut conn, &email).await? else {
            verify_unknown_account(password).await;
            warn!("Credential check for unknown email {}", email);
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(password, &user.password).await {
            warn!("Failed credential check for {}", email);
            return Err(ServiceError::InvalidCredentials);
        }
        if !user.is_active {
            warn!("Credential check for inactive user {}", email);
            return Err(ServiceError::InvalidCredentials);
        }

        UserRepository::touch_last_login(&mut conn, user.id).await?;
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        UserRepository::find_by_id(&mut conn, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    /// Look up by email, normalized the same way as at creation
    pub async fn find_user_by_email(&self, email: &str) -> Result<User, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        UserRepository::find_by_email(&mut conn, &normalize_email(email))
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, ServiceError> {
        let password = match changes.password.as_deref() {
            Some(raw) => Some(hash_password(raw).await?),
            None => None,
        };
        let update = UserUpdate {
            email: changes.email.as_deref().map(normalize_email),
            name: changes.name,
            password,
            ..Default::default()
        };

        let mut tx = self.pool.begin().await?;
        let user = UserRepository::update(&mut tx, id, &update)
            .await
            .map_err(Self::map_unique_email)?;
        tx.commit().await?;
        Ok(user)
    }

    async fn insert_user(
        conn: &mut PgConnection,
        email: &str,
        password: Option<&str>,
        extra: NewUserFields,
    ) -> Result<User, ServiceError> {
        if email.trim().is_empty() {
            return Err(ServiceError::field("email", "Users must have an email address."));
        }

        let password = match password {
            Some(raw) => hash_password(raw).await?,
            None => unusable_password(),
        };
        let new_user = NewUser {
            email: normalize_email(email),
            name: extra.name,
            password,
            is_active: true,
            is_staff: false,
            is_superuser: false,
        };

        UserRepository::insert(conn, &new_user)
            .await
            .map_err(Self::map_unique_email)
    }

    fn map_unique_email(err: DatabaseError) -> ServiceError {
        if err.is_unique_violation() {
            ServiceError::field("email", "user with this email already exists.")
        } else {
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_domain_only() {
        assert_eq!(normalize_email("test@GMAIL.COM"), "test@gmail.com");
        assert_eq!(normalize_email("Test.User@Example.Org"), "Test.User@example.org");
    }

    #[test]
    fn trims_and_tolerates_missing_at() {
        assert_eq!(normalize_email("  a@B.com "), "a@b.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn splits_on_last_at() {
        assert_eq!(normalize_email("\"odd@local\"@EXAMPLE.com"), "\"odd@local\"@example.com");
    }
}
