//! Catalog CLI - Product catalog administration from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password read from CATALOG_PASSWORD)
//! CATALOG_PASSWORD=... catalog-cli login -u admin@example.com
//!
//! # List the second page of one category
//! catalog-cli products --page 2 --category toys
//!
//! # Create a product with two secondary images
//! catalog-cli create --title Lamp --unit pc --price 100 --image a.png --image b.png
//!
//! # Change a price
//! catalog-cli edit -NxYz --price 90
//!
//! # Sign out
//! catalog-cli logout
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `check` - Session management
//! - `products` / `show` - Browse the catalog
//! - `create` / `edit` / `delete` - Change the catalog

#![cfg_attr(not(test), forbid(unsafe_code))]

use catalog_admin::{AdminConfig, LogFormat};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::products::DraftFields;

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(author, version, about = "Catalog admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Administrator email address
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long, env = "CATALOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Verify the stored session
    Check,
    /// List products
    Products {
        /// Page to show
        #[arg(long)]
        page: Option<u32>,

        /// Only products in this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product id (service ids may start with `-`)
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
    /// Create a product
    Create {
        #[command(flatten)]
        fields: DraftFields,
    },
    /// Edit a product
    Edit {
        /// Product id (service ids may start with `-`)
        #[arg(allow_hyphen_values = true)]
        id: String,

        #[command(flatten)]
        fields: DraftFields,

        /// Remove the existing secondary images before adding `--image`s
        #[arg(long)]
        clear_images: bool,
    },
    /// Delete a product
    Delete {
        /// Product id (service ids may start with `-`)
        #[arg(allow_hyphen_values = true)]
        id: String,
    },
}

/// Initialize Sentry error tracking if configured.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::info!("Sentry initialized");
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

/// Install the tracing subscriber. Logs go to stderr; stdout is for output.
fn init_tracing(log_format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalog_admin=info,catalog_cli=info".into());

    let is_json = log_format == LogFormat::Json;
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

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

    let config = match AdminConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        // Flush queued Sentry events before exiting
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AdminConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Login { username, password } => {
            commands::session::login(config, &username, password).await?;
        }
        Commands::Logout => commands::session::logout(config)?,
        Commands::Check => commands::session::check(config).await?,
        Commands::Products { page, category } => {
            commands::products::list(config, page, category).await?;
        }
        Commands::Show { id } => commands::products::show(config, &id).await?,
        Commands::Create { fields } => commands::products::create(config, &fields).await?,
        Commands::Edit {
            id,
            fields,
            clear_images,
        } => commands::products::edit(config, &id, &fields, clear_images).await?,
        Commands::Delete { id } => commands::products::delete(config, &id).await?,
    }
    Ok(())
}
