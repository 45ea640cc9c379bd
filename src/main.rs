// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! tgtg-tracker command-line client
//!
//! Logs in to the marketplace by email confirmation, keeps the session and
//! preferences in a flat config file, and lists or watches nearby deals.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tgtg_tracker::{
    config::Config,
    models::{ConfigState, DealItem},
    services::{DealSnapshot, Poller},
    time_utils::{format_pickup_window, format_utc_rfc3339},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "tgtg-tracker", about = "Watch surplus-food deals nearby", version)]
struct Cli {
    /// Path of the session/preferences file
    #[arg(long, env = "TGTG_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the config file with defaults if it does not exist
    Init,
    /// Show login state and preferences
    Status,
    /// Log in by email confirmation link
    Login { email: String },
    /// Forget the stored session
    Logout,
    /// Flip the notification preference
    ToggleNotifications,
    /// Flip the favorites-only preference
    ToggleFavorites,
    /// Fetch and print deals once
    Deals,
    /// Poll deals until interrupted
    Watch {
        /// Seconds between polls (defaults to TGTG_POLL_INTERVAL_SECS)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = cli.config_file {
        config.config_file = path;
    }

    let app = AppState::from_config(config).context("Failed to create API client")?;

    if let Command::Init = cli.command {
        app.store.init().context("Failed to initialize config file")?;
        println!("Config file ready at {}", app.store.path().display());
        return Ok(());
    }

    let mut state = app.store.load().with_context(|| {
        format!(
            "Failed to load {} (run `tgtg-tracker init` to create it)",
            app.store.path().display()
        )
    })?;

    match cli.command {
        Command::Init => {}
        Command::Status => print_status(&state),
        Command::Login { email } => login(&app, &mut state, &email).await?,
        Command::Logout => {
            app.auth.logout(&app.store, &mut state)?;
            println!("Logged out");
        }
        Command::ToggleNotifications => {
            let on = app.store.toggle_notification(&mut state)?;
            println!("Notifications {}", on_off(on));
        }
        Command::ToggleFavorites => {
            let on = app.store.toggle_favorite_only(&mut state)?;
            println!("Favorites only {}", on_off(on));
        }
        Command::Deals => {
            let deals = app.deals.fetch_deals(&app.store, &mut state).await?;
            print_deals(&deals);
        }
        Command::Watch { interval } => {
            let secs = interval.unwrap_or(app.config.poll_interval_secs);
            let poller = Poller::new(app.deals.clone(), Duration::from_secs(secs));
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl-C");
                }
            };
            poller
                .run(&app.store, &mut state, shutdown, print_snapshot)
                .await;
        }
    }

    Ok(())
}

async fn login(app: &AppState, state: &mut ConfigState, email: &str) -> anyhow::Result<()> {
    if let Some(current) = &state.email {
        println!("Already logged in as {} (run `tgtg-tracker logout` first)", current);
        return Ok(());
    }

    app.auth
        .login_with(&app.store, state, email, |pending| {
            println!(
                "A link has been sent to {}. Please confirm the connection.",
                pending.email
            );
        })
        .await?;
    println!("Logged in as {}", email.trim());
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn print_status(state: &ConfigState) {
    match &state.email {
        Some(email) => println!("Logged in as {}", email),
        None => println!("Not logged in"),
    }
    println!("Notifications: {}", on_off(state.notification_on));
    println!("Favorites only: {}", on_off(state.favorite_only));
}

fn print_deals(deals: &[DealItem]) {
    if deals.is_empty() {
        println!("No deals");
        return;
    }
    for deal in deals {
        println!(
            "{:<11}  {:>10}  {}",
            format_pickup_window(deal.pickup_start, deal.pickup_end),
            deal.display_price(),
            deal.name
        );
    }
}

fn print_snapshot(snapshot: &DealSnapshot) {
    if let Some(updated) = snapshot.last_updated {
        println!("── {} ──", format_utc_rfc3339(updated));
    }
    if let Some(error) = &snapshot.error {
        println!("Last poll failed: {}", error);
    }
    print_deals(&snapshot.deals);
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tgtg_tracker=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .with(format)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_must_be_positive() {
        assert!(Cli::try_parse_from(["tgtg-tracker", "watch", "--interval", "0"]).is_err());

        let cli = Cli::try_parse_from(["tgtg-tracker", "watch", "--interval", "30"]).unwrap();
        assert!(matches!(cli.command, Command::Watch { interval: Some(30) }));
    }
}
