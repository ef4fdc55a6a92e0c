//! Catalog browsing: category, search, price range and sort.
//!
//! Filters run in a fixed order: category, name search, the "suggested"
//! cut, then price range, then sort.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::str::FromStr;

use magia_core::{category_display_name, Product};
use rust_decimal::Decimal;

/// Number of products shown under the "sugeridos" pseudo-category.
pub const SUGGESTED_LIMIT: usize = 8;

/// Which slice of the catalog to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    /// The first [`SUGGESTED_LIMIT`] products of the full catalog.
    Suggested,
    Named(String),
}

impl CategoryFilter {
    /// Category to push down to the data source, if any.
    #[must_use]
    pub fn remote_category(&self) -> Option<&str> {
        match self {
            CategoryFilter::Named(name) => Some(name.as_str()),
            CategoryFilter::All | CategoryFilter::Suggested => None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            CategoryFilter::All => "Todos".to_owned(),
            CategoryFilter::Suggested => "Sugeridos".to_owned(),
            CategoryFilter::Named(name) => category_display_name(name),
        }
    }

    fn matches(&self, product: &Product) -> bool {
        match self {
            CategoryFilter::Named(name) => product.category.trim().eq_ignore_ascii_case(name),
            CategoryFilter::All | CategoryFilter::Suggested => true,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else if trimmed.eq_ignore_ascii_case("sugeridos") {
            CategoryFilter::Suggested
        } else {
            CategoryFilter::Named(trimmed.to_owned())
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Name,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOrder::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortOrder::PriceLow => a.reference_price().cmp(&b.reference_price()),
            SortOrder::PriceHigh => b.reference_price().cmp(&a.reference_price()),
        }
    }
}

/// Inclusive bounds on [`Product::reference_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::new(5000, 0),
        }
    }
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrowseQuery {
    pub category: CategoryFilter,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub price_range: PriceRange,
    pub sort: SortOrder,
}

/// Applies `query` to `products` and returns the visible list.
#[must_use]
pub fn browse(products: &[Product], query: &BrowseQuery) -> Vec<Product> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut visible: Vec<Product> = products
        .iter()
        .filter(|p| query.category.matches(p))
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|n| p.name.to_lowercase().contains(n))
        })
        .cloned()
        .collect();

    if query.category == CategoryFilter::Suggested {
        visible.truncate(SUGGESTED_LIMIT);
    }

    visible.retain(|p| query.price_range.contains(p.reference_price()));
    visible.sort_by(|a, b| query.sort.compare(a, b));
    visible
}

#[cfg(test)]
mod tests {
    use magia_core::TierPrices;

    use super::*;

    fn product(id: &str, name: &str, category: &str, unit: Option<i64>, gram: Option<i64>) -> Product {
        Product {
            id: id.to_owned(),
            name: name.to_owned(),
            category: category.to_owned(),
            prices: TierPrices {
                unit: unit.map(|v| Decimal::new(v, 0)),
                gram: gram.map(|v| Decimal::new(v, 0)),
                ..TierPrices::default()
            },
            available: true,
            stock: None,
            photo_url: None,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product("1", "White Widow", "flores", None, Some(110)),
            product("2", "grinder Glass Pro", "parafernalia", Some(80), None),
            product("3", "Gorila Rainbow", "Flores", None, Some(120)),
            product("4", "Papel Rizla Silver", "parafernalia", Some(45), None),
            product("5", "Bong Imperial", "parafernalia", Some(7200), None),
        ]
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn default_query_sorts_by_name_and_drops_out_of_range() {
        let result = browse(&sample(), &BrowseQuery::default());
        assert_eq!(ids(&result), vec!["3", "2", "4", "1"]);
    }

    #[test]
    fn named_category_is_case_insensitive() {
        let query = BrowseQuery {
            category: "FLORES".parse().unwrap(),
            ..BrowseQuery::default()
        };
        assert_eq!(ids(&browse(&sample(), &query)), vec!["3", "1"]);
    }

    #[test]
    fn search_matches_name_substring_ignoring_case() {
        let query = BrowseQuery {
            search: Some("  GRI ".to_owned()),
            ..BrowseQuery::default()
        };
        assert_eq!(ids(&browse(&sample(), &query)), vec!["2"]);
    }

    #[test]
    fn sort_by_reference_price() {
        let mut query = BrowseQuery {
            sort: SortOrder::PriceLow,
            ..BrowseQuery::default()
        };
        assert_eq!(ids(&browse(&sample(), &query)), vec!["4", "2", "1", "3"]);
        query.sort = SortOrder::PriceHigh;
        assert_eq!(ids(&browse(&sample(), &query)), vec!["3", "1", "2", "4"]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let query = BrowseQuery {
            price_range: PriceRange {
                min: Decimal::new(80, 0),
                max: Decimal::new(110, 0),
            },
            ..BrowseQuery::default()
        };
        assert_eq!(ids(&browse(&sample(), &query)), vec!["2", "1"]);
    }

    #[test]
    fn suggested_takes_first_eight_before_price_filter() {
        let mut products: Vec<Product> = (0..10)
            .map(|i| product(&i.to_string(), &format!("P{i}"), "vapes", Some(100), None))
            .collect();
        products[0].prices.unit = Some(Decimal::new(9000, 0));
        let query = BrowseQuery {
            category: CategoryFilter::Suggested,
            ..BrowseQuery::default()
        };
        let result = browse(&products, &query);
        assert_eq!(result.len(), 7);
        assert!(result.iter().all(|p| p.id != "8" && p.id != "9"));
    }

    #[test]
    fn category_filter_parsing_and_display() {
        assert_eq!("".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("All".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "sugeridos".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Suggested
        );
        assert_eq!(CategoryFilter::All.display_name(), "Todos");
        assert_eq!(CategoryFilter::Suggested.display_name(), "Sugeridos");
        assert_eq!(
            CategoryFilter::Named("vapes".to_owned()).display_name(),
            "Vapes"
        );
        assert_eq!(CategoryFilter::Suggested.remote_category(), None);
        assert_eq!(
            CategoryFilter::Named("flores".to_owned()).remote_category(),
            Some("flores")
        );
    }
}
