//! CLI administration tool for country-api.
//!
//! Provides commands for managing API tokens, viewing statistics,
//! and performing database operations without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a read-only API token
//! cargo run --bin admin -- token create
//!
//! # Create a token allowed to query and modify countries
//! cargo run --bin admin -- token create --editor
//!
//! # List all tokens
//! cargo run --bin admin -- token list
//!
//! # Revoke a token
//! cargo run --bin admin -- token revoke "Import job"
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (or `DB_*` components): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET`: must match the server's value for tokens to verify

use country_api::application::services::auth_service::{generate_token, hash_token};
use country_api::config::Config;
use country_api::domain::repositories::{CountryRepository, TokenRepository};
use country_api::infrastructure::persistence::{PgCountryRepository, PgTokenRepository};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing country-api.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name (e.g., "Import job", "Back office")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Grant the editor capability (queries and writes)
        #[arg(short, long)]
        editor: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url().context("Database is not configured")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create {
            name,
            token,
            editor,
            yes,
        } => {
            let signing_secret = std::env::var("TOKEN_SIGNING_SECRET")
                .context("TOKEN_SIGNING_SECRET must be set")?;
            if signing_secret.is_empty() {
                anyhow::bail!("TOKEN_SIGNING_SECRET must not be empty");
            }
            create_token(repo, &signing_secret, name, token, editor, yes).await?;
        }
        TokenAction::List => {
            list_tokens(repo).await?;
        }
        TokenAction::Revoke { name_or_id } => {
            revoke_token(repo, name_or_id).await?;
        }
    }

    Ok(())
}

/// Creates a new API token with interactive prompts.
///
/// Only the HMAC of the token is stored; the raw value is shown once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    signing_secret: &str,
    name: Option<String>,
    token: Option<String>,
    editor: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Back office")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "Using provided token value".yellow());
            t
        }
        None => {
            let generated = generate_token();
            println!("{}", "Generated new token".green());
            generated
        }
    };

    let role = if editor { "editor".magenta() } else { "reader".normal() };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Role:  {}", role);
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let token_hash = hash_token(signing_secret, &token_value);

    repo.create_token(&token_name, &token_hash, editor)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/Countries/\\$count",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists all API tokens with role and status.
///
/// # Output Format
///
/// ```text
///   ID  Name                           Role     Created              Status
///   1   Back office                    editor   2026-01-15 10:30     ACTIVE
///   2   Reporting                      reader   2026-01-16 14:20     REVOKED
/// ```
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "API Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list_tokens()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create --editor",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<30} {:<8} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Role".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "-".repeat(80).bright_black());

    for token in &tokens {
        let status = if token.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let role = if token.is_editor { "editor" } else { "reader" };

        println!(
            "  {:<3} {:<30} {:<8} {:<20} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            role,
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or ID with confirmation prompt.
///
/// Numeric input is looked up as an ID, anything else as an exact name.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "Revoke API Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo
            .find_by_id(id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
        Err(_) => repo
            .find_by_name(&name_or_id)
            .await
            .map_err(|e| anyhow::anyhow!("Database error: {}", e))?,
    };

    let token = token.context("Token not found")?;

    if token.revoked_at.is_some() {
        println!("{}", "This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

/// Displays country and token counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let countries = PgCountryRepository::new(Arc::new(pool.clone()));
    let countries_count = countries
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count countries: {}", e))?;

    let (active_tokens, editor_tokens): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_editor) FROM api_tokens WHERE revoked_at IS NULL",
    )
    .fetch_one(pool)
    .await?;

    println!(
        "  Countries:     {}",
        countries_count.to_string().bright_green().bold()
    );
    println!(
        "  Active tokens: {}",
        active_tokens.to_string().bright_green().bold()
    );
    println!(
        "  Editor tokens: {}",
        editor_tokens.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
