//! Carniceria CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! carniceria-cli migrate
//!
//! # Seed the catalog from a YAML file
//! carniceria-cli seed seeds/catalog.yaml
//!
//! # Create a staff account
//! carniceria-cli user create -e admin@example.com -n "Admin" -r admin -p secret
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed categories, products, and accounts from YAML
//! - `user create` - Create staff accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "carniceria-cli")]
#[command(author, version, about = "Carniceria catalog CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database from a YAML file
    Seed {
        /// Path to the YAML seed file
        file: String,
    },
    /// Manage staff accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new staff account
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `editor`)
        #[arg(short, long, default_value = "editor")]
        role: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                role,
                password,
            } => {
                commands::user::create(&email, &name, &role, &password).await?;
            }
        },
    }
    Ok(())
}
