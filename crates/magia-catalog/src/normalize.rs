//! Normalization from PostgREST rows to [`magia_core::Product`].

use magia_core::{Product, TierPrices};
use rust_decimal::Decimal;

use crate::error::CatalogError;
use crate::types::ProductRow;

/// Normalizes a raw [`ProductRow`] into a [`Product`].
///
/// Zero and negative prices become `None`; a missing category becomes an
/// empty string; a `null` availability flag is read as available.
///
/// # Errors
///
/// Returns [`CatalogError::Normalization`] if the row has a blank id or name.
pub fn normalize_product(row: ProductRow) -> Result<Product, CatalogError> {
    let id = row.id.to_string();
    if id.trim().is_empty() {
        return Err(CatalogError::Normalization {
            product_id: id,
            reason: "product id is blank".into(),
        });
    }

    let name = row.name.trim().to_string();
    if name.is_empty() {
        return Err(CatalogError::Normalization {
            product_id: id,
            reason: "product name is blank".into(),
        });
    }

    Ok(Product {
        id,
        name,
        category: row.category.map(|c| c.trim().to_string()).unwrap_or_default(),
        prices: TierPrices {
            unit: positive(row.unit_price),
            piece: positive(row.piece_price),
            gram: positive(row.gram_price),
            half_ounce: positive(row.half_ounce_price),
            ounce: positive(row.ounce_price),
        },
        available: row.available.unwrap_or(true),
        stock: row.stock,
        photo_url: row.photo_url.filter(|u| !u.trim().is_empty()),
    })
}

/// Normalizes every row, logging and skipping rows that fail.
pub(crate) fn normalize_rows(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter()
        .filter_map(|row| match normalize_product(row) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, "skipping catalog row");
                None
            }
        })
        .collect()
}

fn positive(price: Option<Decimal>) -> Option<Decimal> {
    price.filter(|p| *p > Decimal::ZERO)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
