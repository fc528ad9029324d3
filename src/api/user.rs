use serde::{Deserialize, Serialize};

use crate::database::models::User;
use crate::error::{ApiError, FieldErrors};
use crate::services::{NewUserFields, UserChanges};

use super::require;

const PASSWORD_MIN_LENGTH: usize = 5;
const EMAIL_MAX_LENGTH: usize = 254;
const NAME_MAX_LENGTH: usize = 254;

#[derive(Debug, Default, Deserialize)]
pub struct UserCreateRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated sign-up input
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub fields: NewUserFields,
}

/// `{email, name}`; the password never leaves the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            name: user.name,
        }
    }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    let email = email.trim();
    let well_formed = matches!(email.rsplit_once('@'), Some((local, domain)) if !local.is_empty() && domain.contains('.'));
    if !well_formed {
        errors.insert("email".to_string(), "Enter a valid email address.".to_string());
    } else if email.chars().count() > EMAIL_MAX_LENGTH {
        errors.insert(
            "email".to_string(),
            format!("Ensure this field has no more than {EMAIL_MAX_LENGTH} characters."),
        );
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.insert(
            "password".to_string(),
            format!("Ensure this field has at least {PASSWORD_MIN_LENGTH} characters."),
        );
    }
}

fn check_name(errors: &mut FieldErrors, name: &str) {
    if name.trim().is_empty() {
        errors.insert("name".to_string(), "This field may not be blank.".to_string());
    } else if name.chars().count() > NAME_MAX_LENGTH {
        errors.insert(
            "name".to_string(),
            format!("Ensure this field has no more than {NAME_MAX_LENGTH} characters."),
        );
    }
}

pub fn validate_create(request: UserCreateRequest) -> Result<NewAccount, ApiError> {
    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", request.email);
    let password = require(&mut errors, "password", request.password);
    let name = require(&mut errors, "name", request.name);

    if let Some(email) = email.as_deref() {
        check_email(&mut errors, email);
    }
    if let Some(password) = password.as_deref() {
        check_password(&mut errors, password);
    }
    if let Some(name) = name.as_deref() {
        check_name(&mut errors, name);
    }

    match (email, password, name) {
        (Some(email), Some(password), Some(name)) if errors.is_empty() => Ok(NewAccount {
            email,
            password,
            fields: NewUserFields { name },
        }),
        _ => Err(ApiError::invalid_fields(errors)),
    }
}

pub fn validate_update(request: UserUpdateRequest) -> Result<UserChanges, ApiError> {
    let mut errors = FieldErrors::new();
    if let Some(email) = request.email.as_deref() {
        check_email(&mut errors, email);
    }
    if let Some(password) = request.password.as_deref() {
        check_password(&mut errors, password);
    }
    if let Some(name) = request.name.as_deref() {
        check_name(&mut errors, name);
    }

    if !errors.is_empty() {
        return Err(ApiError::invalid_fields(errors));
    }
    Ok(UserChanges {
        email: request.email,
        name: request.name,
        password: request.password,
    })
}

/// Returns `(email, password)`
pub fn validate_token(request: TokenRequest) -> Result<(String, String), ApiError> {
    let mut errors = FieldErrors::new();
    let email = require(&mut errors, "email", request.email);
    let password = require(&mut errors, "password", request.password);

    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(ApiError::invalid_fields(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_collects_every_problem() {
        let err = validate_create(UserCreateRequest {
            email: Some("not-an-email".into()),
            password: Some("pw".into()),
            name: None,
        })
        .unwrap_err();
        let fields = &err.to_json()["field_errors"];
        assert_eq!(fields["email"], "Enter a valid email address.");
        assert_eq!(fields["password"], "Ensure this field has at least 5 characters.");
        assert_eq!(fields["name"], "This field is required.");
    }

    #[test]
    fn create_accepts_valid_account() {
        let account = validate_create(UserCreateRequest {
            email: Some("test@gmail.com".into()),
            password: Some("testpass".into()),
            name: Some("Test name".into()),
        })
        .unwrap();
        assert_eq!(account.email, "test@gmail.com");
        assert_eq!(account.fields.name, "Test name");
    }

    #[test]
    fn update_only_checks_supplied_fields() {
        let changes = validate_update(UserUpdateRequest {
            name: Some("New name".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.name.as_deref(), Some("New name"));
        assert!(changes.email.is_none());

        assert!(validate_update(UserUpdateRequest {
            password: Some("123".into()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn token_requires_both_fields() {
        let err = validate_token(TokenRequest {
            email: Some("test@gmail.com".into()),
            password: None,
        })
        .unwrap_err();
        assert_eq!(err.to_json()["field_errors"]["password"], "This field is required.");
    }

    #[test]
    fn response_omits_password() {
        let body = serde_json::to_value(UserResponse {
            email: "a@b.com".into(),
            name: "A".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"email": "a@b.com", "name": "A"}));
    }
}
