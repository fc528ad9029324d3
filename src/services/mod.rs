pub mod pdd_service;
pub mod user_service;
pub mod video_service;

pub use pdd_service::{PddChanges, PddDetail, PddService, PddWithVideos, UploadedFile};
pub use user_service::{normalize_email, NewUserFields, UserChanges, UserService};
pub use video_service::VideoService;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::error::FieldErrors;
use crate::storage::StorageError;

/// Failures of catalog and identity operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Absent, or owned by someone else
    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ServiceError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), message.into());
        ServiceError::Validation(errors)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(err.into())
    }
}

/// Non-blank text no longer than `max` characters
pub fn validate_char_field(field: &str, value: &str, max: usize) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::field(field, "This field may not be blank."));
    }
    if value.chars().count() > max {
        return Err(ServiceError::field(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_field_rules() {
        assert!(validate_char_field("title", "Jurassic Park", 255).is_ok());
        assert!(matches!(
            validate_char_field("title", "   ", 255),
            Err(ServiceError::Validation(ref e)) if e["title"] == "This field may not be blank."
        ));
        assert!(validate_char_field("title", &"x".repeat(255), 255).is_ok());
        assert!(validate_char_field("title", &"x".repeat(256), 255).is_err());
    }
}
