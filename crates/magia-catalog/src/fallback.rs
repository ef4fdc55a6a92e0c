//! Static product list served when the hosted catalog is unavailable.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use magia_core::{AppConfig, Product};
use serde::Deserialize;

use crate::error::CatalogError;
use crate::types::CategoryRow;

const EMBEDDED_CATALOG: &str = include_str!("../data/fallback_catalog.yaml");

#[derive(Debug, Deserialize)]
struct FallbackFile {
    products: Vec<Product>,
}

/// A validated, in-memory product list.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    products: Vec<Product>,
}

impl FallbackCatalog {
    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error only if the embedded YAML is broken.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    /// Loads and validates a catalog from a YAML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::FallbackIo`] if the file cannot be read, or a
    /// parse/validation error from [`Self::from_yaml`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::FallbackIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Uses `MAGIA_FALLBACK_CATALOG_PATH` when set, the embedded list otherwise.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::load`] or [`Self::embedded`].
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        match &config.fallback_catalog_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading fallback catalog from file");
                Self::load(path)
            }
            None => Self::embedded(),
        }
    }

    /// Parses and validates a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::FallbackParse`] on malformed YAML and
    /// [`CatalogError::FallbackValidation`] on empty or duplicate ids, blank
    /// names, or an empty product list.
    pub fn from_yaml(content: &str) -> Result<Self, CatalogError> {
        let file: FallbackFile = serde_yaml::from_str(content)?;
        validate_products(&file.products)?;
        Ok(Self {
            products: file.products,
        })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products in `category` (trimmed, case-insensitive), or all of them.
    #[must_use]
    pub fn by_category(&self, category: Option<&str>) -> Vec<Product> {
        match category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(wanted) => self
                .products
                .iter()
                .filter(|p| p.category.trim().eq_ignore_ascii_case(wanted))
                .cloned()
                .collect(),
            None => self.products.clone(),
        }
    }

    #[must_use]
    pub fn find(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Category rows in the shape of the hosted `v_categorias` view, ordered
    /// by category name. Only available products are counted.
    #[must_use]
    pub fn categories(&self) -> Vec<CategoryRow> {
        let mut counts: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
        for product in &self.products {
            let entry = counts.entry(product.category.as_str()).or_default();
            if product.available {
                entry.0 += 1;
            }
            entry.1 += i64::from(product.stock.unwrap_or(0));
        }
        counts
            .into_iter()
            .map(|(category, (active, stock))| CategoryRow {
                category: Some(category.to_owned()),
                active_products: Some(active),
                total_stock: Some(stock),
            })
            .collect()
    }
}

fn validate_products(products: &[Product]) -> Result<(), CatalogError> {
    if products.is_empty() {
        return Err(CatalogError::FallbackValidation(
            "fallback catalog has no products".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for product in products {
        if product.id.trim().is_empty() {
            return Err(CatalogError::FallbackValidation(format!(
                "product '{}' has an empty id",
                product.name
            )));
        }
        if product.name.trim().is_empty() {
            return Err(CatalogError::FallbackValidation(format!(
                "product '{}' has an empty name",
                product.id
            )));
        }
        if !seen_ids.insert(product.id.as_str()) {
            return Err(CatalogError::FallbackValidation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use magia_core::{price_options, PriceTier};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn embedded_catalog_is_valid() {
        let catalog = FallbackCatalog::embedded().unwrap();
        assert_eq!(catalog.products().len(), 7);
        assert!(!catalog.find("3").unwrap().available);
    }

    #[test]
    fn embedded_flower_sells_by_weight() {
        let catalog = FallbackCatalog::embedded().unwrap();
        let gorila = catalog.find("1").unwrap();
        let tiers: Vec<PriceTier> = price_options(gorila).iter().map(|o| o.tier).collect();
        assert_eq!(
            tiers,
            vec![PriceTier::Gram, PriceTier::Ounce, PriceTier::HalfOunce]
        );
        assert_eq!(gorila.prices.ounce, Some(Decimal::new(3200, 0)));
    }

    #[test]
    fn embedded_rolling_papers_offer_unit_and_piece() {
        let catalog = FallbackCatalog::embedded().unwrap();
        let rizla = catalog.find("7").unwrap();
        let tiers: Vec<PriceTier> = price_options(rizla).iter().map(|o| o.tier).collect();
        assert_eq!(tiers, vec![PriceTier::Unit, PriceTier::Piece]);
    }

    #[test]
    fn by_category_is_case_insensitive() {
        let catalog = FallbackCatalog::embedded().unwrap();
        assert_eq!(catalog.by_category(Some(" Flores ")).len(), 4);
        assert_eq!(catalog.by_category(Some("PARAFERNALIA")).len(), 2);
        assert_eq!(catalog.by_category(None).len(), 7);
        assert_eq!(catalog.by_category(Some("")).len(), 7);
        assert!(catalog.by_category(Some("vapes")).is_empty());
    }

    #[test]
    fn categories_count_available_products() {
        let catalog = FallbackCatalog::embedded().unwrap();
        let rows = catalog.categories();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.category.as_deref()).collect();
        assert_eq!(names, vec!["flores", "parafernalia", "pre-rolls"]);
        assert_eq!(rows[0].active_products, Some(3));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let yaml = "products:\n  - {id: \"1\", name: A, category: flores}\n  - {id: \"1\", name: B, category: flores}\n";
        let err = FallbackCatalog::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate product id"));
    }

    #[test]
    fn rejects_blank_name() {
        let yaml = "products:\n  - {id: \"1\", name: \"  \", category: flores}\n";
        let err = FallbackCatalog::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, CatalogError::FallbackValidation(_)));
    }

    #[test]
    fn rejects_empty_list() {
        let err = FallbackCatalog::from_yaml("products: []\n").unwrap_err();
        assert!(matches!(err, CatalogError::FallbackValidation(_)));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = FallbackCatalog::from_yaml("products: [").unwrap_err();
        assert!(matches!(err, CatalogError::FallbackParse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = FallbackCatalog::load(Path::new("/nonexistent/magia/catalog.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::FallbackIo { .. }));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = std::env::temp_dir().join(format!("magia-fallback-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.yaml");
        std::fs::write(
            &path,
            "products:\n  - id: vape-1\n    name: Vape Mango\n    category: vapes\n    prices:\n      unit: 650\n",
        )
        .unwrap();
        let catalog = FallbackCatalog::load(&path).unwrap();
        assert_eq!(
            catalog.find("vape-1").unwrap().prices.unit,
            Some(Decimal::new(650, 0))
        );
        std::fs::remove_dir_all(&dir).ok();
    }
}
