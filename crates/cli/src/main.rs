//! Order Reminders CLI - scheduled reminder runs and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # One reminder run (schedule this hourly)
//! reminders-cli run
//!
//! # Show what a run would send right now
//! reminders-cli run --dry-run
//!
//! # Show the configured windows and the window for 14:00
//! reminders-cli window --hour 14
//!
//! # Apply database migrations
//! reminders-cli migrate
//!
//! # Remove a subscription by endpoint
//! reminders-cli subscriptions prune --endpoint https://fcm.googleapis.com/fcm/send/abc
//!
//! # Show the delivery log of an order
//! reminders-cli history --order 42
//! ```
//!
//! Configuration is read from the environment (and `.env`), see
//! [`NotifierConfig`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use order_reminders_notifier::NotifierConfig;

mod commands;

#[derive(Parser)]
#[command(name = "reminders-cli")]
#[command(author, version, about = "Order reminder notifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send reminders for the current window
    Run {
        /// Map every hour to a window (for testing outside the schedule)
        #[arg(long)]
        test_mode: bool,

        /// List due orders without sending or recording anything
        #[arg(long)]
        dry_run: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the window schedule and the window for an hour
    Window {
        /// Local hour (0-23); defaults to the current hour
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,
    },
    /// Apply database migrations
    Migrate,
    /// Manage push subscriptions
    Subscriptions {
        #[command(subcommand)]
        action: SubscriptionAction,
    },
    /// Show the notification log of an order
    History {
        /// Order ID
        #[arg(short, long)]
        order: i32,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum SubscriptionAction {
    /// Delete subscriptions registered for an endpoint
    Prune {
        /// Push service endpoint URL
        #[arg(short, long)]
        endpoint: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &NotifierConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "order_reminders_notifier=info,reminders_cli=info".into());

    // JSON for log shippers, text for terminals
    let json = std::env::var("REMINDERS_LOG_JSON").is_ok();
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match NotifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            std::process::exit(1);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let sentry_guard = init_sentry(&config);
    init_tracing();
    if sentry_guard.is_some() {
        tracing::info!("Sentry initialized");
    }

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &NotifierConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run {
            test_mode,
            dry_run,
            json,
        } => {
            let options = commands::run::RunOptions {
                test_mode,
                dry_run,
                json,
            };
            commands::run::execute(config, options).await?;
        }
        Commands::Window { hour } => commands::window::show(config, hour),
        Commands::Migrate => commands::migrate::run(config).await?,
        Commands::Subscriptions { action } => match action {
            SubscriptionAction::Prune { endpoint } => {
                commands::subscriptions::prune(config, &endpoint).await?;
            }
        },
        Commands::History { order, json } => commands::history::show(config, order, json).await?,
    }
    Ok(())
}
