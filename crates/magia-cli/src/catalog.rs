//! Catalog command handlers for the CLI.
//!
//! Reads never fail: when the hosted catalog is unreachable the fallback
//! list answers and a note is printed so the user knows prices may be stale.

use clap::ValueEnum;
use magia_catalog::{BrowseQuery, Catalog, CatalogSource, CategoryFilter, PriceRange, SortOrder};
use magia_core::{category_display_name, format_mxn, headline_price, price_options, Product};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Name,
    PriceLow,
    PriceHigh,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::Name,
            SortArg::PriceLow => SortOrder::PriceLow,
            SortArg::PriceHigh => SortOrder::PriceHigh,
        }
    }
}

/// Builds a browse query from CLI flags. Missing price bounds keep the
/// default range.
///
/// # Errors
///
/// Returns an error if `min_price` is greater than `max_price`.
pub(crate) fn build_query(
    category: &str,
    search: Option<String>,
    sort: SortArg,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
) -> anyhow::Result<BrowseQuery> {
    let defaults = PriceRange::default();
    let price_range = PriceRange {
        min: min_price.unwrap_or(defaults.min),
        max: max_price.unwrap_or(defaults.max),
    };
    if price_range.min > price_range.max {
        anyhow::bail!(
            "--min-price {} is greater than --max-price {}",
            price_range.min,
            price_range.max
        );
    }

    let Ok(category) = category.parse::<CategoryFilter>();

    Ok(BrowseQuery {
        category,
        search,
        price_range,
        sort: sort.into(),
    })
}

/// Note printed when the fallback list answered instead of the hosted catalog.
pub(crate) fn source_note(catalog: &Catalog, source: CatalogSource) -> Option<&'static str> {
    match source {
        CatalogSource::Remote => None,
        CatalogSource::Fallback if catalog.has_remote() => {
            Some("note: hosted catalog unreachable; showing the offline catalog, prices may be out of date")
        }
        CatalogSource::Fallback => {
            Some("note: no hosted catalog configured; showing the offline catalog")
        }
    }
}

fn print_source_note(catalog: &Catalog, source: CatalogSource) {
    if let Some(note) = source_note(catalog, source) {
        eprintln!("{note}");
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_owned()
    }
}

/// Price shown next to a product in listings.
pub(crate) fn headline_display(product: &Product) -> String {
    headline_price(product).map_or_else(|| "Consultar".to_owned(), format_mxn)
}

/// Browse the catalog and print matching products.
pub(crate) async fn run_catalog(catalog: &Catalog, query: &BrowseQuery) {
    let page = catalog.browse(query).await;
    print_source_note(catalog, page.source);

    if page.products.is_empty() {
        println!(
            "no products found in {}",
            query.category.display_name()
        );
        return;
    }

    println!(
        "{:<10}{:<30}{:<14}{:>12}  STATUS",
        "ID", "NAME", "CATEGORY", "PRICE"
    );
    for product in &page.products {
        let status = if product.available {
            "disponible"
        } else {
            "agotado"
        };
        println!(
            "{:<10}{:<30}{:<14}{:>12}  {}",
            truncate(&product.id, 9),
            truncate(&product.name, 29),
            truncate(&category_display_name(&product.category), 13),
            headline_display(product),
            status
        );
    }
    println!();
    println!(
        "{} product{} in {}",
        page.products.len(),
        if page.products.len() == 1 { "" } else { "s" },
        query.category.display_name()
    );
}

/// Print the category list with the pseudo-categories first.
pub(crate) async fn run_categories(catalog: &Catalog) {
    let page = catalog.categories().await;
    print_source_note(catalog, page.source);

    println!("{:<16}{:<16}{:>8}", "FILTER", "NAME", "ACTIVE");
    println!("{:<16}{:<16}{:>8}", "all", CategoryFilter::All.display_name(), "");
    println!(
        "{:<16}{:<16}{:>8}",
        "sugeridos",
        CategoryFilter::Suggested.display_name(),
        ""
    );
    for row in &page.categories {
        let Some(name) = row.category.as_deref() else {
            continue;
        };
        let active = row
            .active_products
            .map(|n| n.to_string())
            .unwrap_or_default();
        println!(
            "{:<16}{:<16}{:>8}",
            name,
            category_display_name(name),
            active
        );
    }
}

/// Print the purchase options for one product.
///
/// # Errors
///
/// Returns an error if no product has id `product_id`.
pub(crate) async fn run_options(catalog: &Catalog, product_id: &str) -> anyhow::Result<()> {
    let (product, source) = catalog
        .find_product(product_id)
        .await
        .ok_or_else(|| anyhow::anyhow!("product '{product_id}' not found; run `catalog` to list ids"))?;
    print_source_note(catalog, source);

    println!(
        "{} ({})",
        product.name,
        category_display_name(&product.category)
    );
    if !product.available {
        println!("agotado: this product cannot be added to an estimate");
    }

    let options = price_options(&product);
    if options.is_empty() {
        println!("no listed prices; ask the shop for a quote");
        return Ok(());
    }

    println!("{:<12}{:<14}{:>12}", "TIER", "OPTION", "PRICE");
    for (index, option) in options.iter().enumerate() {
        let marker = if index == 0 { "  (default)" } else { "" };
        println!(
            "{:<12}{:<14}{:>12}{marker}",
            option.tier.as_str(),
            option.label,
            format_mxn(option.price)
        );
    }
    Ok(())
}
