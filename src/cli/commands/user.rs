use anyhow::Context;
use clap::Args;
use serde_json::json;

use crate::auth::issue_token;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::services::{NewUserFields, UserService};

#[derive(Args)]
pub struct CreateUserArgs {
    #[arg(help = "Email")]
    pub email: String,
    #[arg(long, default_value = "", help = "Display name")]
    pub name: String,
    #[arg(long, help = "Password (the account cannot log in without one)")]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct CreateSuperuserArgs {
    #[arg(help = "Email")]
    pub email: String,
    #[arg(long, env = "PDD_SUPERUSER_PASSWORD", help = "Password")]
    pub password: String,
}

pub async fn create_user(args: CreateUserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserService::new(super::connect().await?);
    let user = users
        .create_user(&args.email, args.password.as_deref(), NewUserFields { name: args.name })
        .await
        .context("Failed to create user")?;

    output_success(
        &output_format,
        &format!("Created user {} ({})", user.id, user.email),
        Some(json!({ "id": user.id, "email": user.email, "name": user.name })),
    )
}

pub async fn create_superuser(args: CreateSuperuserArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserService::new(super::connect().await?);
    let user = users
        .create_superuser(&args.email, &args.password)
        .await
        .context("Failed to create superuser")?;

    output_success(
        &output_format,
        &format!("Created superuser {} ({})", user.id, user.email),
        Some(json!({ "id": user.id, "email": user.email })),
    )
}

pub async fn token(email: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let users = UserService::new(super::connect().await?);
    let user = users
        .find_user_by_email(email)
        .await
        .with_context(|| format!("No user with email {email}"))?;
    let token = issue_token(&user, &config().security)?;

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Token issued", Some(json!({ "token": token }))),
        // Bare token so it can be captured by scripts
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
