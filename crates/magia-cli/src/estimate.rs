//! Estimate command handlers for the CLI.
//!
//! The ledger is opened from the configured store by `main` and handed to
//! each handler. Every mutation is persisted by the ledger itself.

use clap::Subcommand;
use magia_catalog::Catalog;
use magia_core::{
    default_tier, format_mxn, price_options, unit_price, AppConfig, ContactLinks,
    EstimateLedger, EstimateSummary, LedgerStore, NewLineItem, PriceTier, Product,
};

/// Sub-commands available under `estimate`.
#[derive(Debug, Subcommand)]
pub enum EstimateCommands {
    /// Show the current estimate
    Show,
    /// Add a product to the estimate
    Add {
        product_id: String,
        /// Price tier (unit, piece, gram, half-ounce, ounce); defaults to the first option
        #[arg(long)]
        tier: Option<PriceTier>,
        /// Grams to add; other tiers always add one
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },
    /// Set the quantity of a line; zero or less removes it
    Set {
        /// Line key, e.g. `7:piece`
        key: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line from the estimate
    Remove {
        /// Line key, e.g. `7:piece`
        key: String,
    },
    /// Remove every line from the estimate
    Clear,
}

/// Turns a catalog product and the requested tier into a ledger entry.
///
/// # Errors
///
/// Returns an error if the product is sold out, has no listed prices, or is
/// not sold in `tier`.
pub(crate) fn resolve_line(
    product: &Product,
    tier: Option<PriceTier>,
    quantity: u32,
) -> anyhow::Result<NewLineItem> {
    if !product.available {
        anyhow::bail!("product '{}' is sold out", product.name);
    }

    let tier = match tier {
        Some(tier) => tier,
        None => default_tier(product).ok_or_else(|| {
            anyhow::anyhow!(
                "product '{}' has no listed prices; ask the shop for a quote",
                product.name
            )
        })?,
    };

    let options = price_options(product);
    if !options.iter().any(|o| o.tier == tier) {
        let offered = options
            .iter()
            .map(|o| o.tier.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        anyhow::bail!(
            "product '{}' is not sold by {tier}; options: {}",
            product.name,
            if offered.is_empty() { "none" } else { offered.as_str() }
        );
    }

    Ok(NewLineItem {
        product_id: product.id.clone(),
        tier,
        name: product.name.clone(),
        category: product.category.clone(),
        unit_price: unit_price(product, tier),
        quantity: tier.quantity_per_add(quantity),
    })
}

pub(crate) fn run_estimate_show<S: LedgerStore>(ledger: &EstimateLedger<S>) {
    if ledger.is_empty() {
        println!("estimate is empty; add products with `estimate add <product-id>`");
        return;
    }

    println!(
        "{:<16}{:>6}  {:<28}{:<12}{:>12}{:>12}",
        "KEY", "QTY", "NAME", "TIER", "UNIT", "TOTAL"
    );
    for line in ledger.items() {
        println!(
            "{:<16}{:>6}  {:<28}{:<12}{:>12}{:>12}",
            line.id,
            line.quantity,
            line.name,
            line.tier.summary_label(),
            format_mxn(line.unit_price),
            format_mxn(line.total)
        );
    }
    println!();
    println!("items: {}", ledger.item_count());
    println!("estimated total: {}", format_mxn(ledger.total()));
}

/// Add a catalog product to the estimate.
///
/// # Errors
///
/// Returns an error if the product does not exist or cannot be added.
pub(crate) async fn run_estimate_add<S: LedgerStore>(
    ledger: &mut EstimateLedger<S>,
    catalog: &Catalog,
    product_id: &str,
    tier: Option<PriceTier>,
    quantity: u32,
) -> anyhow::Result<()> {
    let (product, _) = catalog
        .find_product(product_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("product '{product_id}' not found; run `catalog` to list ids"))?;

    let item = resolve_line(&product, tier, quantity)?;
    if item.quantity != quantity {
        eprintln!(
            "note: {} is added one at a time; ignoring --quantity {quantity}",
            item.tier.summary_label()
        );
    }

    match ledger.add(item) {
        Some(line) => println!(
            "{} x {} ({}) = {}  [key {}]",
            line.quantity,
            line.name,
            line.tier.summary_label(),
            format_mxn(line.total),
            line.id
        ),
        None => println!("nothing added"),
    }
    println!("estimated total: {}", format_mxn(ledger.total()));
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if no line has key `key`.
pub(crate) fn run_estimate_set<S: LedgerStore>(
    ledger: &mut EstimateLedger<S>,
    key: &str,
    quantity: i64,
) -> anyhow::Result<()> {
    if ledger.get(key).is_none() {
        anyhow::bail!("no estimate line '{key}'; run `estimate show` to list keys");
    }

    match ledger.update_quantity(key, quantity) {
        Some(line) => println!(
            "{} x {} = {}",
            line.quantity,
            line.name,
            format_mxn(line.total)
        ),
        None => println!("removed {key}"),
    }
    println!("estimated total: {}", format_mxn(ledger.total()));
    Ok(())
}

/// Remove one line.
///
/// # Errors
///
/// Returns an error if no line has key `key`.
pub(crate) fn run_estimate_remove<S: LedgerStore>(
    ledger: &mut EstimateLedger<S>,
    key: &str,
) -> anyhow::Result<()> {
    let removed = ledger
        .remove(key)
        .ok_or_else(|| anyhow::anyhow!("no estimate line '{key}'; run `estimate show` to list keys"))?;
    println!("removed {} ({})", removed.name, removed.tier.summary_label());
    println!("estimated total: {}", format_mxn(ledger.total()));
    Ok(())
}

pub(crate) fn run_estimate_clear<S: LedgerStore>(ledger: &mut EstimateLedger<S>) {
    let lines = ledger.len();
    ledger.clear();
    println!("cleared {lines} line{}", if lines == 1 { "" } else { "s" });
}

/// Print the hand-off message and the links that open it in Telegram.
pub(crate) fn run_contact<S: LedgerStore>(ledger: &EstimateLedger<S>, config: &AppConfig) {
    let summary = EstimateSummary::from_ledger(ledger);
    let links = ContactLinks::for_summary(
        &config.telegram_handle,
        config.telegram_phone.as_deref(),
        &summary,
    );

    println!("{summary}");
    println!();
    println!("telegram: {}", links.telegram_web);
    if let Some(app) = &links.telegram_app {
        println!("telegram app: {app}");
    }
    if let Some(dialer) = &links.dialer {
        println!("phone: {dialer}");
    }
}
