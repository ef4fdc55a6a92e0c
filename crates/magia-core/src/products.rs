use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// The closed set of ways a product can be priced.
///
/// Serialized in kebab-case (`"half-ounce"`). The Spanish names written by the
/// browser storefront (`"media_onza"`, `"gramo"`, ...) are accepted on input so
/// older persisted estimates still rehydrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceTier {
    #[serde(alias = "unidad")]
    Unit,
    #[serde(alias = "pieza")]
    Piece,
    #[serde(alias = "gramo")]
    Gram,
    #[serde(alias = "media_onza", alias = "half_ounce")]
    HalfOunce,
    #[serde(alias = "onza")]
    Ounce,
}

impl PriceTier {
    pub const ALL: [PriceTier; 5] = [
        PriceTier::Unit,
        PriceTier::Piece,
        PriceTier::Gram,
        PriceTier::HalfOunce,
        PriceTier::Ounce,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceTier::Unit => "unit",
            PriceTier::Piece => "piece",
            PriceTier::Gram => "gram",
            PriceTier::HalfOunce => "half-ounce",
            PriceTier::Ounce => "ounce",
        }
    }

    /// Quantity a single "add" action contributes for this tier.
    ///
    /// Only the gram tier honours the requested amount; every other tier is
    /// bought one bag/piece/unit at a time.
    #[must_use]
    pub fn quantity_per_add(self, requested: u32) -> u32 {
        match self {
            PriceTier::Gram => requested,
            _ => 1,
        }
    }

    /// Label shown next to a selectable price option.
    #[must_use]
    pub fn option_label(self) -> &'static str {
        match self {
            PriceTier::Unit => "Unidad",
            PriceTier::Piece => "Pieza",
            PriceTier::Gram => "Gramo",
            PriceTier::HalfOunce => "Media Onza",
            PriceTier::Ounce => "Onza",
        }
    }

    /// Label used when the tier is listed in an estimate summary.
    #[must_use]
    pub fn summary_label(self) -> &'static str {
        match self {
            PriceTier::Unit => "unidad",
            PriceTier::Piece => "pieza",
            PriceTier::Gram => "por gramo",
            PriceTier::HalfOunce => "1/2 onza",
            PriceTier::Ounce => "1 onza",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unit" | "unidad" => Ok(PriceTier::Unit),
            "piece" | "pieza" => Ok(PriceTier::Piece),
            "gram" | "gramo" => Ok(PriceTier::Gram),
            "half-ounce" | "half_ounce" | "media_onza" => Ok(PriceTier::HalfOunce),
            "ounce" | "onza" => Ok(PriceTier::Ounce),
            other => Err(CoreError::UnknownTier(other.to_string())),
        }
    }
}

/// Raw per-tier prices as they come from the catalog.
///
/// `None`, zero and negative values all mean "not offered in this tier".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TierPrices {
    #[serde(default)]
    pub unit: Option<Decimal>,
    #[serde(default)]
    pub piece: Option<Decimal>,
    #[serde(default)]
    pub gram: Option<Decimal>,
    #[serde(default)]
    pub half_ounce: Option<Decimal>,
    #[serde(default)]
    pub ounce: Option<Decimal>,
}

impl TierPrices {
    /// Returns the raw value stored for `tier`, if any.
    #[must_use]
    pub fn get(&self, tier: PriceTier) -> Option<Decimal> {
        match tier {
            PriceTier::Unit => self.unit,
            PriceTier::Piece => self.piece,
            PriceTier::Gram => self.gram,
            PriceTier::HalfOunce => self.half_ounce,
            PriceTier::Ounce => self.ounce,
        }
    }

    /// Returns the price for `tier` only when it is strictly positive.
    #[must_use]
    pub fn offered(&self, tier: PriceTier) -> Option<Decimal> {
        self.get(tier).filter(|p| p.is_sign_positive() && !p.is_zero())
    }
}

/// A catalog product. Read-only to the pricing and ledger code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub prices: TierPrices,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Units in stock as reported by the catalog, when exposed.
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl Product {
    /// Price used for catalog range filters and price sorting: the unit price,
    /// then the gram price, then zero.
    #[must_use]
    pub fn reference_price(&self) -> Decimal {
        self.prices
            .offered(PriceTier::Unit)
            .or_else(|| self.prices.offered(PriceTier::Gram))
            .unwrap_or(Decimal::ZERO)
    }
}

fn default_available() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(prices: TierPrices) -> Product {
        Product {
            id: "1".to_string(),
            name: "Gorila Rainbow".to_string(),
            category: "flores".to_string(),
            prices,
            available: true,
            stock: None,
            photo_url: None,
        }
    }

    #[test]
    fn tier_round_trips_through_str() {
        for tier in PriceTier::ALL {
            assert_eq!(tier.as_str().parse::<PriceTier>().unwrap(), tier);
        }
    }

    #[test]
    fn tier_parses_storefront_spanish_names() {
        assert_eq!("media_onza".parse::<PriceTier>().unwrap(), PriceTier::HalfOunce);
        assert_eq!("Gramo".parse::<PriceTier>().unwrap(), PriceTier::Gram);
        assert_eq!(" pieza ".parse::<PriceTier>().unwrap(), PriceTier::Piece);
    }

    #[test]
    fn tier_rejects_unknown_name() {
        let err = "kilo".parse::<PriceTier>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownTier(ref t) if t == "kilo"));
    }

    #[test]
    fn tier_serializes_kebab_case_and_accepts_aliases() {
        let json = serde_json::to_string(&PriceTier::HalfOunce).unwrap();
        assert_eq!(json, "\"half-ounce\"");
        let legacy: PriceTier = serde_json::from_str("\"media_onza\"").unwrap();
        assert_eq!(legacy, PriceTier::HalfOunce);
        let legacy: PriceTier = serde_json::from_str("\"unidad\"").unwrap();
        assert_eq!(legacy, PriceTier::Unit);
    }

    #[test]
    fn only_gram_tier_honours_requested_quantity() {
        assert_eq!(PriceTier::Gram.quantity_per_add(5), 5);
        assert_eq!(PriceTier::Ounce.quantity_per_add(5), 1);
        assert_eq!(PriceTier::HalfOunce.quantity_per_add(3), 1);
        assert_eq!(PriceTier::Unit.quantity_per_add(9), 1);
        assert_eq!(PriceTier::Piece.quantity_per_add(2), 1);
    }

    #[test]
    fn offered_filters_zero_and_negative_prices() {
        let prices = TierPrices {
            unit: Some(Decimal::ZERO),
            piece: Some(Decimal::new(-5, 0)),
            gram: Some(Decimal::new(120, 0)),
            half_ounce: None,
            ounce: Some(Decimal::new(3200, 0)),
        };
        assert_eq!(prices.offered(PriceTier::Unit), None);
        assert_eq!(prices.offered(PriceTier::Piece), None);
        assert_eq!(prices.offered(PriceTier::HalfOunce), None);
        assert_eq!(prices.offered(PriceTier::Gram), Some(Decimal::new(120, 0)));
        assert_eq!(prices.get(PriceTier::Unit), Some(Decimal::ZERO));
    }

    #[test]
    fn reference_price_prefers_unit_then_gram() {
        let with_unit = product(TierPrices {
            unit: Some(Decimal::new(80, 0)),
            gram: Some(Decimal::new(120, 0)),
            ..TierPrices::default()
        });
        assert_eq!(with_unit.reference_price(), Decimal::new(80, 0));

        let gram_only = product(TierPrices {
            gram: Some(Decimal::new(120, 0)),
            ounce: Some(Decimal::new(3200, 0)),
            ..TierPrices::default()
        });
        assert_eq!(gram_only.reference_price(), Decimal::new(120, 0));

        let ounce_only = product(TierPrices {
            ounce: Some(Decimal::new(3200, 0)),
            ..TierPrices::default()
        });
        assert_eq!(ounce_only.reference_price(), Decimal::ZERO);
    }

    #[test]
    fn product_deserializes_with_defaults() {
        let json = r#"{"id":"9","name":"Grinder","category":"parafernalia"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.available);
        assert_eq!(product.prices, TierPrices::default());
        assert!(product.stock.is_none());
    }
}
