//! VersaTrak CLI - query a VersaTrak monitoring server from the terminal.
//!
//! Connection settings come from flags, then the environment (a `.env`
//! file in the working directory is loaded first), then built-in defaults.
//! Responses are printed to stdout as the server returns them.

mod cli;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use versatrak::{auth::mask_token, SessionClient};

use cli::{Cli, Command};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let mut cli = Cli::parse();
    if cli.username.is_some() && cli.password.is_none() && cli.token.is_none() {
        let password = rpassword::prompt_password("Password: ")
            .context("Failed to read password")?;
        cli.password = Some(password);
    }

    let client = SessionClient::connect(cli.client_config())
        .await
        .context("Failed to create client")?;
    info!(
        instance = client.instance_id(),
        logged_on = client.is_logged_on_cached(),
        "Client ready"
    );

    run(&client, cli.command).await
}

async fn run(client: &SessionClient, command: Command) -> Result<()> {
    match command {
        Command::Instances => {
            let instances = client.get_instances().await.context("Failed to list instances")?;
            println!("{}", serde_json::to_string_pretty(&instances)?);
        }
        Command::Status => {
            println!("{}", client.is_logged_on().await?);
        }
        Command::Login => {
            let logged_on = client.login().await.context("Login failed")?;
            print_session(client, logged_on);
        }
        Command::Refresh => {
            client.ensure_logged_in().await.context("Login failed")?;
            let logged_on = client
                .refresh_auth_token()
                .await
                .context("Token refresh failed")?;
            print_session(client, logged_on);
        }
        Command::Logoff => {
            client.ensure_logged_in().await.context("Login failed")?;
            println!("{}", client.logoff().await.context("Logoff failed")?);
        }
        Command::Resource { name } => {
            let body = client
                .fetch(name)
                .await
                .with_context(|| format!("Failed to fetch {}", name))?;
            println!("{}", body);
        }
        Command::User { id } => {
            let body = client
                .get_user(&id)
                .await
                .with_context(|| format!("Failed to fetch user {}", id))?;
            println!("{}", body);
        }
        Command::History {
            object_id,
            start,
            end,
            period,
            include_events,
        } => {
            let query = Command::history_query(start, end, &period, include_events);
            let body = client
                .get_history_data(&object_id, &query)
                .await
                .with_context(|| format!("Failed to fetch history for {}", object_id))?;
            println!("{}", body);
        }
    }
    Ok(())
}

fn print_session(client: &SessionClient, logged_on: bool) {
    println!("logged on: {}", logged_on);
    if let Some(tokens) = client.tokens() {
        println!("access token: {}", mask_token(&tokens.access_token));
        println!("refresh token: {}", mask_token(&tokens.refresh_token));
    }
}
