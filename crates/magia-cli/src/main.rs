mod catalog;
mod estimate;

use clap::{CommandFactory, Parser, Subcommand};
use magia_catalog::Catalog;
use magia_core::{EstimateLedger, FileStore};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::catalog::SortArg;
use crate::estimate::EstimateCommands;

#[derive(Debug, Parser)]
#[command(name = "magia-cli")]
#[command(about = "Magia Buena catalog and price estimator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        /// Category name, `all`, or `sugeridos`
        #[arg(long, default_value = "all")]
        category: String,
        /// Case-insensitive product name search
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
        /// Lowest reference price to show (MXN)
        #[arg(long)]
        min_price: Option<Decimal>,
        /// Highest reference price to show (MXN)
        #[arg(long)]
        max_price: Option<Decimal>,
    },
    /// List product categories
    Categories,
    /// Show the purchase options for one product
    Options {
        product_id: String,
    },
    /// Manage the local price estimate
    Estimate {
        #[command(subcommand)]
        command: EstimateCommands,
    },
    /// Print the estimate message and Telegram links to send it
    Contact,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = magia_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(
        env = %config.env,
        remote = config.remote_catalog.is_some(),
        ledger_dir = %config.ledger_dir.display(),
        "magia-cli starting"
    );

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Catalog {
            category,
            search,
            sort,
            min_price,
            max_price,
        } => {
            let catalog = Catalog::from_config(&config)?;
            let query = catalog::build_query(&category, search, sort, min_price, max_price)?;
            catalog::run_catalog(&catalog, &query).await;
        }
        Commands::Categories => {
            let catalog = Catalog::from_config(&config)?;
            catalog::run_categories(&catalog).await;
        }
        Commands::Options { product_id } => {
            let catalog = Catalog::from_config(&config)?;
            catalog::run_options(&catalog, &product_id).await?;
        }
        Commands::Estimate { command } => {
            let mut ledger = open_ledger(&config);
            match command {
                EstimateCommands::Show => estimate::run_estimate_show(&ledger),
                EstimateCommands::Add {
                    product_id,
                    tier,
                    quantity,
                } => {
                    let catalog = Catalog::from_config(&config)?;
                    estimate::run_estimate_add(&mut ledger, &catalog, &product_id, tier, quantity)
                        .await?;
                }
                EstimateCommands::Set { key, quantity } => {
                    estimate::run_estimate_set(&mut ledger, &key, quantity)?;
                }
                EstimateCommands::Remove { key } => {
                    estimate::run_estimate_remove(&mut ledger, &key)?;
                }
                EstimateCommands::Clear => estimate::run_estimate_clear(&mut ledger),
            }
        }
        Commands::Contact => {
            let ledger = open_ledger(&config);
            estimate::run_contact(&ledger, &config);
        }
    }

    Ok(())
}

fn open_ledger(config: &magia_core::AppConfig) -> EstimateLedger<FileStore> {
    EstimateLedger::open(FileStore::new(&config.ledger_dir), &config.ledger_key)
}

#[cfg(test)]
mod tests;
