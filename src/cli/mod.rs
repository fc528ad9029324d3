pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "pdd")]
#[command(about = "PDD CLI - Administrative commands for the PDD API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create a regular user")]
    CreateUser(commands::user::CreateUserArgs),

    #[command(about = "Create a staff superuser")]
    CreateSuperuser(commands::user::CreateSuperuserArgs),

    #[command(about = "Issue a bearer token for an existing user")]
    Token {
        #[arg(help = "Email of the user")]
        email: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::db::migrate(output_format).await,
        Commands::CreateUser(args) => commands::user::create_user(args, output_format).await,
        Commands::CreateSuperuser(args) => commands::user::create_superuser(args, output_format).await,
        Commands::Token { email } => commands::user::token(&email, output_format).await,
    }
}
