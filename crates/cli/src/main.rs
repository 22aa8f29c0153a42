//! Marigold CLI - storefront management and demo tools.
//!
//! # Usage
//!
//! ```bash
//! # Write a starter catalog to the data directory
//! marigold seed
//!
//! # Search the catalog
//! marigold search "mug" --category kitchen --in-stock
//!
//! # Run a scripted shopping session end to end
//! marigold shop
//!
//! # Show or edit the stored profile
//! marigold profile show
//! marigold profile set --name "Fern Callow" --email fern@example.com
//! ```
//!
//! # Commands
//!
//! - `seed` - Write a starter catalog YAML
//! - `search` - One-shot catalog search with filters
//! - `shop` - Scripted demo session (cart, shipping, checkout)
//! - `profile` - Show or edit the stored profile

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "marigold")]
#[command(author, version, about = "Marigold Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter catalog to the configured catalog path
    Seed {
        /// Overwrite an existing catalog file
        #[arg(short, long)]
        force: bool,
    },
    /// Search the catalog
    Search {
        /// Query text (omit to browse everything)
        query: Option<String>,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,

        /// Only in-stock products
        #[arg(long)]
        in_stock: bool,

        /// Only on-sale products
        #[arg(long)]
        on_sale: bool,

        /// Minimum price, e.g. 9.99
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price, e.g. 30
        #[arg(long)]
        max_price: Option<String>,

        /// Sort order: relevance, price-ascending, price-descending
        #[arg(long, default_value = "relevance")]
        sort: String,

        /// Maximum number of hits
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Run a scripted shopping session against the catalog
    Shop,
    /// Show or edit the stored profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Validate and save profile fields
    Set {
        /// Display name (required)
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long, default_value = "")]
        email: String,

        /// Phone number
        #[arg(short, long, default_value = "")]
        phone: String,

        /// Postal address
        #[arg(short, long, default_value = "")]
        address: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing; default to info so command output is visible
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Seed { force } => commands::seed::run(force)?,
        Commands::Search {
            query,
            category,
            in_stock,
            on_sale,
            min_price,
            max_price,
            sort,
            limit,
        } => {
            let args = commands::search::SearchArgs {
                query: query.unwrap_or_default(),
                category,
                in_stock,
                on_sale,
                min_price,
                max_price,
                sort,
                limit,
            };
            commands::search::run(&args)?;
        }
        Commands::Shop => commands::shop::run().await?,
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::profile::show()?,
            ProfileAction::Set {
                name,
                email,
                phone,
                address,
            } => commands::profile::set(name, email, phone, address)?,
        },
    }
    Ok(())
}
