use magia_catalog::{Catalog, CatalogClient, CatalogSource, CategoryFilter, FallbackCatalog, SortOrder};
use magia_core::{EstimateLedger, MemoryStore, PriceTier, Product, TierPrices};
use rust_decimal::Decimal;

use super::*;
use crate::estimate::resolve_line;

fn flower() -> Product {
    Product {
        id: "1".to_owned(),
        name: "Gorila Rainbow".to_owned(),
        category: "flores".to_owned(),
        prices: TierPrices {
            gram: Some(Decimal::new(120, 0)),
            half_ounce: Some(Decimal::new(1700, 0)),
            ounce: Some(Decimal::new(3200, 0)),
            ..TierPrices::default()
        },
        available: true,
        stock: None,
        photo_url: None,
    }
}

// ---------------------------------------------------------------------------
// argument parsing
// ---------------------------------------------------------------------------

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["magia-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_catalog_defaults() {
    let cli = Cli::try_parse_from(["magia-cli", "catalog"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Catalog {
            ref category,
            search: None,
            sort: SortArg::Name,
            min_price: None,
            max_price: None,
        }) if category == "all"
    ));
}

#[test]
fn parses_catalog_filters() {
    let cli = Cli::try_parse_from([
        "magia-cli",
        "catalog",
        "--category",
        "flores",
        "--search",
        "kush",
        "--sort",
        "price-high",
        "--min-price",
        "100",
        "--max-price",
        "2500.50",
    ])
    .expect("expected valid cli args");
    let Some(Commands::Catalog {
        category,
        search,
        sort,
        min_price,
        max_price,
    }) = cli.command
    else {
        panic!("expected catalog command");
    };
    assert_eq!(category, "flores");
    assert_eq!(search.as_deref(), Some("kush"));
    assert_eq!(sort, SortArg::PriceHigh);
    assert_eq!(min_price, Some(Decimal::new(100, 0)));
    assert_eq!(max_price, Some(Decimal::new(250_050, 2)));
}

#[test]
fn rejects_unknown_sort() {
    assert!(Cli::try_parse_from(["magia-cli", "catalog", "--sort", "random"]).is_err());
}

#[test]
fn parses_options_command() {
    let cli = Cli::try_parse_from(["magia-cli", "options", "7"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Options { ref product_id }) if product_id == "7"
    ));
}

#[test]
fn parses_estimate_add_with_spanish_tier() {
    let cli = Cli::try_parse_from([
        "magia-cli",
        "estimate",
        "add",
        "1",
        "--tier",
        "gramo",
        "--quantity",
        "3",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Estimate {
            command: EstimateCommands::Add {
                ref product_id,
                tier: Some(PriceTier::Gram),
                quantity: 3,
            }
        }) if product_id == "1"
    ));
}

#[test]
fn estimate_add_defaults_to_one_and_no_tier() {
    let cli = Cli::try_parse_from(["magia-cli", "estimate", "add", "5"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Estimate {
            command: EstimateCommands::Add {
                tier: None,
                quantity: 1,
                ..
            }
        })
    ));
}

#[test]
fn estimate_add_rejects_zero_quantity() {
    assert!(Cli::try_parse_from(["magia-cli", "estimate", "add", "1", "--quantity", "0"]).is_err());
}

#[test]
fn estimate_add_rejects_unknown_tier() {
    assert!(Cli::try_parse_from(["magia-cli", "estimate", "add", "1", "--tier", "kilo"]).is_err());
}

#[test]
fn estimate_set_accepts_negative_quantity() {
    let cli = Cli::try_parse_from(["magia-cli", "estimate", "set", "1:gram", "-2"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Estimate {
            command: EstimateCommands::Set {
                ref key,
                quantity: -2,
            }
        }) if key == "1:gram"
    ));
}

#[test]
fn parses_contact_and_clear() {
    let cli = Cli::try_parse_from(["magia-cli", "contact"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Contact)));

    let cli =
        Cli::try_parse_from(["magia-cli", "estimate", "clear"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Estimate {
            command: EstimateCommands::Clear
        })
    ));
}

// ---------------------------------------------------------------------------
// query building
// ---------------------------------------------------------------------------

#[test]
fn build_query_maps_flags() {
    let query = catalog::build_query(
        "sugeridos",
        None,
        SortArg::PriceLow,
        Some(Decimal::new(50, 0)),
        None,
    )
    .unwrap();
    assert_eq!(query.category, CategoryFilter::Suggested);
    assert_eq!(query.sort, SortOrder::PriceLow);
    assert_eq!(query.price_range.min, Decimal::new(50, 0));
    assert_eq!(query.price_range.max, Decimal::new(5000, 0));
}

#[test]
fn build_query_rejects_inverted_range() {
    let result = catalog::build_query(
        "all",
        None,
        SortArg::Name,
        Some(Decimal::new(900, 0)),
        Some(Decimal::new(100, 0)),
    );
    assert!(result.is_err());
}

#[test]
fn headline_display_asks_for_quote_without_prices() {
    let mut product = flower();
    assert_eq!(catalog::headline_display(&product), "$3,200");
    product.prices = TierPrices::default();
    assert_eq!(catalog::headline_display(&product), "Consultar");
}

#[test]
fn source_note_explains_why_fallback_answered() {
    let offline = Catalog::new(None, FallbackCatalog::embedded().unwrap());
    let unreachable = Catalog::new(
        Some(CatalogClient::new("http://127.0.0.1:9", "anon-key", 1, "magia-test/0.1", 0, 0).unwrap()),
        FallbackCatalog::embedded().unwrap(),
    );

    assert!(catalog::source_note(&offline, CatalogSource::Remote).is_none());
    assert!(catalog::source_note(&offline, CatalogSource::Fallback)
        .unwrap()
        .contains("no hosted catalog configured"));
    assert!(catalog::source_note(&unreachable, CatalogSource::Fallback)
        .unwrap()
        .contains("unreachable"));
}

// ---------------------------------------------------------------------------
// line resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_line_uses_default_tier() {
    let item = resolve_line(&flower(), None, 5).unwrap();
    assert_eq!(item.tier, PriceTier::Gram);
    assert_eq!(item.quantity, 5);
    assert_eq!(item.unit_price, Decimal::new(120, 0));
}

#[test]
fn resolve_line_adds_one_bag_for_ounce() {
    let item = resolve_line(&flower(), Some(PriceTier::Ounce), 4).unwrap();
    assert_eq!(item.quantity, 1);
    assert_eq!(item.unit_price, Decimal::new(3200, 0));
}

#[test]
fn resolve_line_rejects_tier_not_offered() {
    let err = resolve_line(&flower(), Some(PriceTier::Piece), 1).unwrap_err();
    assert!(err.to_string().contains("not sold by piece"));
}

#[test]
fn resolve_line_rejects_sold_out_product() {
    let mut product = flower();
    product.available = false;
    assert!(resolve_line(&product, None, 1).is_err());
}

#[test]
fn resolve_line_rejects_unpriced_product() {
    let mut product = flower();
    product.prices = TierPrices::default();
    let err = resolve_line(&product, None, 1).unwrap_err();
    assert!(err.to_string().contains("no listed prices"));
}

#[test]
fn estimate_handlers_mutate_ledger() {
    let mut ledger = EstimateLedger::open(MemoryStore::new(), "magiabuena_cart");
    ledger.add(resolve_line(&flower(), None, 2).unwrap());
    ledger.add(resolve_line(&flower(), Some(PriceTier::Ounce), 1).unwrap());

    estimate::run_estimate_set(&mut ledger, "1:gram", 10).unwrap();
    assert_eq!(ledger.get("1:gram").unwrap().quantity, 10);

    assert!(estimate::run_estimate_set(&mut ledger, "9:unit", 1).is_err());

    estimate::run_estimate_remove(&mut ledger, "1:ounce").unwrap();
    assert!(estimate::run_estimate_remove(&mut ledger, "1:ounce").is_err());
    assert_eq!(ledger.total(), Decimal::new(1200, 0));

    estimate::run_estimate_clear(&mut ledger);
    assert!(ledger.is_empty());
}
