//! Headshop CLI - Catalog management and shipping-quote tools.
//!
//! # Usage
//!
//! ```bash
//! # List the storefront catalog (active products)
//! headshop products list
//!
//! # List every row including inactive products
//! headshop products list --all
//!
//! # Show one product by SKU
//! headshop products show BG-30
//!
//! # Fetch a shipping quote for a 3-item parcel
//! headshop quote -d 01310100 -n 3
//!
//! # Catalog writes (require an admin token)
//! headshop admin -t $TOKEN create -s BG-30 --title "Glass Bong 30cm" -p 189.90
//! headshop admin -t $TOKEN stock <id> 12
//! ```
//!
//! # Commands
//!
//! - `products` - Read the catalog
//! - `quote` - Fetch a shipping quote
//! - `admin` - Create, update, delete, and restock products

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "headshop")]
#[command(author, version, about = "Headshop storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Fetch a shipping quote
    Quote {
        /// Destination postal code (8 digits, punctuation ignored)
        #[arg(short, long)]
        destination: String,

        /// Number of items in the parcel
        #[arg(short = 'n', long, default_value_t = 1)]
        items: u32,
    },
    /// Manage the catalog (requires an admin token)
    Admin {
        /// Admin token checked against the introspection endpoint
        #[arg(short, long, env = "HEADSHOP_ADMIN_TOKEN")]
        token: String,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products (active only by default)
    List {
        /// Include inactive products
        #[arg(long)]
        all: bool,
    },
    /// Show one product by SKU
    Show {
        /// Product SKU
        sku: String,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new product
    Create {
        #[command(flatten)]
        fields: commands::admin::ProductArgs,
    },
    /// Update an existing product
    Update {
        /// Product identifier
        id: uuid::Uuid,

        #[command(flatten)]
        fields: commands::admin::ProductArgs,
    },
    /// Delete a product
    Delete {
        /// Product identifier
        id: uuid::Uuid,
    },
    /// Set a product's stock level
    Stock {
        /// Product identifier
        id: uuid::Uuid,

        /// New stock level
        stock: u32,
    },
}

/// Initialize Sentry error tracking and return a guard that must be kept
/// alive for the process lifetime.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty())?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

/// Route tracing events to Sentry by severity.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry must come up before the tracing subscriber
    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "headshop=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List { all } => commands::products::list(all).await?,
            ProductsAction::Show { sku } => commands::products::show(&sku).await?,
        },
        Commands::Quote { destination, items } => {
            commands::quote::fetch(&destination, items).await?;
        }
        Commands::Admin { token, action } => match action {
            AdminAction::Create { fields } => {
                commands::admin::create(&token, fields).await?;
            }
            AdminAction::Update { id, fields } => {
                commands::admin::update(&token, id, fields).await?;
            }
            AdminAction::Delete { id } => commands::admin::delete(&token, id).await?,
            AdminAction::Stock { id, stock } => {
                commands::admin::set_stock(&token, id, stock).await?;
            }
        },
    }
    Ok(())
}
