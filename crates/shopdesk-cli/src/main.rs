mod catalog;
mod orders;
mod reviews;

use clap::{Parser, Subcommand};
use shopdesk_core::credentials::{hash_password, MIN_PASSWORD_LEN};
use shopdesk_store::StoreClient;
use tracing_subscriber::EnvFilter;

use catalog::ProductsCommands;
use orders::OrdersCommands;
use reviews::ReviewsCommands;

#[derive(Debug, Parser)]
#[command(name = "shopdesk-cli")]
#[command(about = "Shopdesk catalog admin command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the salted SHA-256 digest for `SHOPDESK_ADMIN_PASSWORD_SHA256`
    HashPassword {
        /// Salt, the same value as `SHOPDESK_ADMIN_PASSWORD_SALT`
        #[arg(long, env = "SHOPDESK_ADMIN_PASSWORD_SALT")]
        salt: String,
        /// Plain-text admin password
        #[arg(long, env = "SHOPDESK_ADMIN_PASSWORD")]
        password: String,
    },
    /// Show catalog and order totals
    Dashboard,
    /// Catalog products and categories
    Products {
        #[command(subcommand)]
        command: ProductsCommands,
    },
    /// Customer orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
    /// Customer reviews
    Reviews {
        #[command(subcommand)]
        command: ReviewsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("shopdesk-cli ready; run with --help to list commands");
        return Ok(());
    };

    match command {
        Commands::HashPassword { salt, password } => run_hash_password(&salt, &password),
        Commands::Dashboard => run_dashboard(&connect()?).await,
        Commands::Products { command } => catalog::run(&connect()?, command).await,
        Commands::Orders { command } => orders::run(&connect()?, command).await,
        Commands::Reviews { command } => reviews::run(&connect()?, command).await,
    }
}

/// Builds a store client from the `SHOPDESK_STORE_*` variables only.
fn connect() -> anyhow::Result<StoreClient> {
    let config = shopdesk_core::load_store_config()
        .map_err(|e| anyhow::anyhow!("store configuration invalid: {e}"))?;
    tracing::debug!(
        project_id = %config.project_id,
        dataset = %config.dataset,
        "connecting to document store"
    );
    StoreClient::new(&config).map_err(|e| anyhow::anyhow!("failed to build store client: {e}"))
}

fn run_hash_password(salt: &str, password: &str) -> anyhow::Result<()> {
    if salt.trim().is_empty() {
        anyhow::bail!("salt must not be empty");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("password must be at least {MIN_PASSWORD_LEN} characters");
    }
    println!("{}", hash_password(salt, password));
    Ok(())
}

async fn run_dashboard(client: &StoreClient) -> anyhow::Result<()> {
    let summary = shopdesk_store::dashboard::summary(client).await?;

    println!("Products:  {}", summary.total_products);
    println!("Orders:    {}", summary.total_orders);
    println!("  pending:   {}", summary.pending_orders);
    println!("  delivered: {}", summary.delivered_orders);
    println!("Reviews:   {}", summary.total_reviews);
    if !summary.chart.is_empty() {
        println!();
        for point in &summary.chart {
            println!("{:<12} {:>10.2}", point.label, point.total);
        }
    }
    Ok(())
}

/// Format an optional cell for table output, returning `"-"` when `None`.
pub(crate) fn cell<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
