//! Ledgerwise CLI - Local-first spending analyzer
//!
//! Usage:
//!   ledgerwise init                    Initialize database
//!   ledgerwise import --file FILE      Import a statement (JSON or CSV)
//!   ledgerwise add Coffee 4.50         Add a transaction by hand
//!   ledgerwise dashboard               Show the full analysis

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let today = commands::parse_optional_date(cli.today.as_deref(), "--today")?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Config { defaults } => commands::cmd_config(cli.config.as_deref(), defaults),
        Commands::Screen { file } => commands::cmd_screen(&file),
        command => {
            let mut finance =
                commands::open_finance(&cli.db, cli.no_encrypt, cli.config.as_deref(), today)
                    .await?;
            run(&mut finance, command).await
        }
    }
}

async fn run(finance: &mut commands::Finance, command: Commands) -> Result<()> {
    match command {
        Commands::Import {
            file,
            replace,
            screen,
        } => commands::cmd_import(finance, &file, replace, screen).await,
        Commands::Receipt { file } => commands::cmd_receipt(finance, &file).await,
        Commands::Add {
            title,
            amount,
            kind,
            date,
            time,
            category,
        } => {
            commands::cmd_add(
                finance,
                &title,
                amount,
                &kind,
                date.as_deref(),
                time.as_deref(),
                category.as_deref(),
            )
            .await
        }
        Commands::Transactions { action } => match action {
            None => commands::cmd_transactions_list(finance, 20),
            Some(TransactionsAction::List { limit }) => {
                commands::cmd_transactions_list(finance, limit)
            }
            Some(TransactionsAction::Delete { id }) => {
                commands::cmd_transactions_delete(finance, &id).await
            }
            Some(TransactionsAction::Clear { yes }) => {
                commands::cmd_transactions_clear(finance, yes).await
            }
        },
        Commands::Balance { amount } => commands::cmd_balance(finance, amount).await,
        Commands::Currency {
            symbol,
            code,
            reset,
        } => commands::cmd_currency(finance, symbol.as_deref(), code.as_deref(), reset).await,
        Commands::Subscriptions { action } => match action {
            None | Some(SubscriptionsAction::List) => commands::cmd_subscriptions_list(finance),
            Some(SubscriptionsAction::Add {
                name,
                amount,
                frequency,
                next,
            }) => {
                commands::cmd_subscriptions_add(finance, &name, amount, &frequency, next.as_deref())
                    .await
            }
            Some(SubscriptionsAction::Delete { id }) => {
                commands::cmd_subscriptions_delete(finance, &id).await
            }
        },
        Commands::Warranties { action } => match action {
            None | Some(WarrantiesAction::List) => commands::cmd_warranties_list(finance),
            Some(WarrantiesAction::Add {
                product,
                expires,
                serial,
            }) => {
                commands::cmd_warranties_add(finance, &product, &expires, serial.as_deref()).await
            }
            Some(WarrantiesAction::Delete { id }) => {
                commands::cmd_warranties_delete(finance, &id).await
            }
        },
        Commands::Dashboard { json } => commands::cmd_dashboard(finance, json),
        Commands::Notifications { ack } => {
            commands::cmd_notifications(finance, ack.as_deref()).await
        }
        Commands::Profile { name, email } => {
            commands::cmd_profile(finance, name.as_deref(), email.as_deref()).await
        }
        Commands::Export { file } => commands::cmd_export(finance, &file),
        Commands::Reset { yes } => commands::cmd_reset(finance, yes).await,
        Commands::Init | Commands::Config { .. } | Commands::Screen { .. } => {
            anyhow::bail!("This command does not use the finance store")
        }
    }
}
