//! Price option lookup for catalog products.
//!
//! Turns a product's raw tier prices into the list of options a shopper can
//! pick from, and resolves a picked tier back to a unit price.
//!
//! Precedence rule: a flower-like product with no positive unit or piece
//! price is sold by weight (gram, ounce, half-ounce, in that order). Anything
//! else, including flower with a unit or piece price, is sold by unit then
//! piece and never shows weight tiers.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::products::{PriceTier, Product};

/// Category names treated as flower, compared after trimming and lowercasing.
const FLOWER_CATEGORIES: [&str; 4] = ["flores", "flor", "flower", "flowers"];

const WEIGHT_ORDER: [PriceTier; 3] = [PriceTier::Gram, PriceTier::Ounce, PriceTier::HalfOunce];
const COUNT_ORDER: [PriceTier; 2] = [PriceTier::Unit, PriceTier::Piece];

/// Headline order for weight-priced cards: the biggest bag first.
const WEIGHT_HEADLINE_ORDER: [PriceTier; 3] =
    [PriceTier::Ounce, PriceTier::HalfOunce, PriceTier::Gram];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryClass {
    Flower,
    Other,
}

impl CategoryClass {
    #[must_use]
    pub fn classify(category: &str) -> Self {
        let normalized = category.trim().to_lowercase();
        if FLOWER_CATEGORIES.contains(&normalized.as_str()) {
            CategoryClass::Flower
        } else {
            CategoryClass::Other
        }
    }
}

/// A selectable purchase option for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceOption {
    pub tier: PriceTier,
    pub label: &'static str,
    pub price: Decimal,
}

/// `true` when the product should be offered by weight.
fn sells_by_weight(product: &Product) -> bool {
    CategoryClass::classify(&product.category) == CategoryClass::Flower
        && product.prices.offered(PriceTier::Unit).is_none()
        && product.prices.offered(PriceTier::Piece).is_none()
}

fn tier_order(product: &Product) -> &'static [PriceTier] {
    if sells_by_weight(product) {
        &WEIGHT_ORDER
    } else {
        &COUNT_ORDER
    }
}

/// Lists the purchase options for `product`, skipping unpriced tiers.
#[must_use]
pub fn price_options(product: &Product) -> Vec<PriceOption> {
    tier_order(product)
        .iter()
        .filter_map(|&tier| {
            product.prices.offered(tier).map(|price| PriceOption {
                tier,
                label: tier.option_label(),
                price,
            })
        })
        .collect()
}

/// Resolves `tier` to the product's unit price, or zero when unset.
#[must_use]
pub fn unit_price(product: &Product, tier: PriceTier) -> Decimal {
    product.prices.offered(tier).unwrap_or(Decimal::ZERO)
}

/// The tier selected by default when a product is opened.
#[must_use]
pub fn default_tier(product: &Product) -> Option<PriceTier> {
    price_options(product).first().map(|o| o.tier)
}

/// The price shown on a product card. `None` means the price must be asked for.
#[must_use]
pub fn headline_price(product: &Product) -> Option<Decimal> {
    let order: &[PriceTier] = if sells_by_weight(product) {
        &WEIGHT_HEADLINE_ORDER
    } else {
        &COUNT_ORDER
    };
    order.iter().find_map(|&tier| product.prices.offered(tier))
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
