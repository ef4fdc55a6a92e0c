//! Row types for the catalog's public PostgREST views.
//!
//! ## `v_productos_publicos`
//!
//! One row per published product. Column names are Spanish and are mapped to
//! English field names here. Observed shape:
//!
//! - `id` is a UUID string on current projects but was a serial integer on
//!   older ones, so both are accepted.
//! - Price columns (`precio_unidad`, `precio_gramo`, `precio_media_onza`,
//!   `precio_onza`) are `numeric` and arrive as JSON numbers or `null`.
//!   Zero means "not sold this way", same as `null`.
//! - `precio_pieza` is not selected by the public view on every project; it
//!   defaults to `null` when absent.
//! - `disponible` may be `null` for rows that were never reviewed; treated
//!   as available.
//! - `foto_url` is `null` or blank for products without a photo.
//!
//! ## `v_categorias`
//!
//! One row per category with aggregate counts.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Columns requested from `v_productos_publicos`.
pub const PRODUCT_COLUMNS: &str = "id,nombre,categoria,precio_unidad,precio_gramo,precio_media_onza,precio_onza,cantidad_disponible,disponible,foto_url";

/// Columns requested from `v_categorias`.
pub const CATEGORY_COLUMNS: &str = "categoria,productos_activos,stock_total";

/// A product id as PostgREST returns it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Text(String),
    Number(i64),
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowId::Text(s) => f.write_str(s),
            RowId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A row of `v_productos_publicos`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: RowId,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "precio_unidad", default)]
    pub unit_price: Option<Decimal>,

    #[serde(rename = "precio_pieza", default)]
    pub piece_price: Option<Decimal>,

    #[serde(rename = "precio_gramo", default)]
    pub gram_price: Option<Decimal>,

    #[serde(rename = "precio_media_onza", default)]
    pub half_ounce_price: Option<Decimal>,

    #[serde(rename = "precio_onza", default)]
    pub ounce_price: Option<Decimal>,

    #[serde(rename = "cantidad_disponible", default)]
    pub stock: Option<i32>,

    #[serde(rename = "disponible", default)]
    pub available: Option<bool>,

    #[serde(rename = "foto_url", default)]
    pub photo_url: Option<String>,
}

/// A row of `v_categorias`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,

    #[serde(rename = "productos_activos", default)]
    pub active_products: Option<i64>,

    #[serde(rename = "stock_total", default)]
    pub total_stock: Option<i64>,
}
