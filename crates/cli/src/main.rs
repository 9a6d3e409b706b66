//! Shopdemo CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply migrations
//! shop-cli migrate
//!
//! # Load the demo catalog and accounts (safe to re-run)
//! shop-cli seed
//!
//! # Create a user, optionally as admin
//! shop-cli user create -e jane@example.com -p s3cret! --first-name Jane --admin
//!
//! # Change an existing user's role
//! shop-cli user promote -e jane@example.com
//! shop-cli user promote -e jane@example.com --role user
//!
//! # Delete expired bearer tokens
//! shop-cli tokens purge
//! ```
//!
//! All commands read `SHOP_DATABASE_URL` (or `DATABASE_URL`), loading `.env`
//! if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Shopdemo CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo categories, products, and users
    Seed,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage bearer tokens
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters)
        #[arg(short, long)]
        password: String,

        #[arg(short, long, default_value = "")]
        first_name: String,

        #[arg(short, long, default_value = "")]
        last_name: String,

        /// Create the user as an admin
        #[arg(long)]
        admin: bool,
    },
    /// Set an existing user's role
    Promote {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role to assign (`admin` or `user`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Delete expired tokens
    Purge,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                password,
                first_name,
                last_name,
                admin,
            } => {
                commands::user::create(&email, &password, &first_name, &last_name, admin).await?;
            }
            UserAction::Promote { email, role } => {
                commands::user::set_role(&email, &role).await?;
            }
        },
        Commands::Tokens { action } => match action {
            TokenAction::Purge => commands::tokens::purge().await?,
        },
    }
    Ok(())
}
