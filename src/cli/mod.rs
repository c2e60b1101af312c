pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "userhub-console")]
#[command(about = "userhub console - user administration and local environment setup")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Creates a local user")]
    CreateUser {
        #[arg(long, help = "Username (prompted when omitted)")]
        username: Option<String>,

        #[arg(long, help = "Password (prompted when omitted)")]
        password: Option<String>,
    },

    #[command(about = "Setup local environment, including the key pair for JWT signing")]
    SetupEnv {
        #[arg(long, default_value = ".env.local", help = "Env file holding the generated settings")]
        env_file: PathBuf,

        #[arg(long, default_value = "config/jwt", help = "Directory for private.pem and public.pem")]
        key_dir: PathBuf,
    },

    #[command(about = "Apply database migrations")]
    Migrate,
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
        Commands::CreateUser { username, password } => {
            commands::create_user::handle(username, password, output_format).await
        }
        Commands::SetupEnv { env_file, key_dir } => {
            commands::setup_env::handle(&env_file, &key_dir, output_format)
        }
        Commands::Migrate => commands::migrate::handle(output_format).await,
    }
}
