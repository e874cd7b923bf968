//! `resto`: command-line front end for the restaurant-ordering API.
//!
//! Keeps a session on disk between invocations, so `resto login` followed by
//! `resto list orders` behaves like a logged-in browser tab.

mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resto_client::config::ClientConfig;
use resto_client::context::AppContext;
use resto_client::storage::FileStorage;
use resto_core::resource::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line client for the restaurant-ordering platform.
#[derive(Debug, Parser)]
#[command(name = "resto")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "RESTO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in as it
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "RESTO_PASSWORD", hide_env_values = true)]
        password: String,

        /// Role to request for the new account
        #[arg(long)]
        role_id: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the current user
    Whoami,

    /// List one page of a resource
    List {
        /// tables, products, orders, users, roles, payment-methods, promotions, posts, audit-logs
        resource: Resource,

        /// Zero-based page index
        #[arg(long, default_value = "0")]
        page: u32,

        #[arg(long, default_value = "10")]
        size: u32,

        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show a single entry
    Get { resource: Resource, id: String },

    /// Delete a single entry
    Delete { resource: Resource, id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resto_client=info,resto_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    tracing::debug!(api_url = %config.api_url, session_dir = %config.session_dir.display(), "Loaded client configuration");

    let storage = Arc::new(FileStorage::in_dir(&config.session_dir));
    let ctx = AppContext::new(config, storage).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Login { username, password } => {
            commands::login(&ctx, username, password).await?;
        }
        Command::Register {
            username,
            email,
            password,
            role_id,
        } => {
            commands::register(&ctx, username, email, password, &role_id).await?;
        }
        Command::Logout => commands::logout(&ctx),
        Command::Whoami => commands::whoami(&ctx)?,
        Command::List {
            resource,
            page,
            size,
            search,
        } => {
            commands::list(&ctx, resource, page, size, search).await?;
        }
        Command::Get { resource, id } => {
            commands::get(&ctx, resource, &id).await?;
        }
        Command::Delete { resource, id } => {
            commands::delete(&ctx, resource, &id).await?;
        }
    }

    Ok(())
}
