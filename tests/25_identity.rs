mod common;

use anyhow::Result;

use pdd_api::services::{NewUserFields, ServiceError, UserService};

#[tokio::test]
async fn superuser_is_staff_and_can_sign_in() -> Result<()> {
    let Some(pool) = common::database_pool().await? else {
        return Ok(());
    };
    let users = UserService::new(pool);
    let email = common::unique_email("root");

    let admin = users.create_superuser(&email, "rootpass").await?;
    assert!(admin.is_staff);
    assert!(admin.is_superuser);
    assert!(admin.is_active);

    let signed_in = users.verify_credential(&email, "rootpass").await?;
    assert_eq!(signed_in.id, admin.id);
    assert!(matches!(
        users.verify_credential(&email, "wrong").await,
        Err(ServiceError::InvalidCredentials)
    ));
    Ok(())
}

#[tokio::test]
async fn regular_user_has_no_privileges() -> Result<()> {
    let Some(pool) = common::database_pool().await? else {
        return Ok(());
    };
    let users = UserService::new(pool);

    let user = users
        .create_user(&common::unique_email("plain"), Some("testpass"), NewUserFields::default())
        .await?;
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    Ok(())
}

#[tokio::test]
async fn empty_email_is_rejected_before_insert() -> Result<()> {
    let Some(pool) = common::database_pool().await? else {
        return Ok(());
    };
    let users = UserService::new(pool);

    for email in ["", "   "] {
        match users.create_user(email, Some("testpass"), NewUserFields::default()).await {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors["email"], "Users must have an email address.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
    assert!(matches!(
        users.create_superuser("", "rootpass").await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(users.find_user_by_email("").await, Err(ServiceError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn unknown_email_fails_like_a_wrong_password() -> Result<()> {
    let Some(pool) = common::database_pool().await? else {
        return Ok(());
    };
    let users = UserService::new(pool);

    assert!(matches!(
        users.verify_credential(&common::unique_email("ghost"), "testpass").await,
        Err(ServiceError::InvalidCredentials)
    ));
    Ok(())
}
