//! The estimate ledger: an ordered, persisted list of priced line items.
//!
//! Lines are keyed by `"{product_id}:{tier}"`. Adding a key that already
//! exists merges into the existing line, so there is at most one line per key
//! and line order is the order keys were first added.
//!
//! Every mutation rewrites the whole ledger to its [`LedgerStore`]. Store
//! failures are logged and swallowed: the in-memory ledger stays authoritative
//! and simply stops being durable.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::products::PriceTier;
use crate::store::LedgerStore;

/// One priced line of an estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Composite key, `"{product_id}:{tier}"`.
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub category: String,
    #[serde(alias = "priceType")]
    pub tier: PriceTier,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Always `unit_price * quantity`; recomputed on load.
    #[serde(default)]
    pub total: Decimal,
}

impl LineItem {
    /// Builds the ledger key for a product/tier pair.
    #[must_use]
    pub fn key_for(product_id: &str, tier: PriceTier) -> String {
        format!("{product_id}:{tier}")
    }

    /// `unit_price * quantity`, or `None` if it does not fit in a `Decimal`.
    fn checked_total(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
        unit_price.checked_mul(Decimal::from(quantity))
    }
}

/// Sum of line totals, or `None` on overflow.
pub(crate) fn checked_sum<'a>(totals: impl IntoIterator<Item = &'a Decimal>) -> Option<Decimal> {
    totals
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(*t))
}

/// Input to [`EstimateLedger::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: String,
    pub tier: PriceTier,
    pub name: String,
    pub category: String,
    pub unit_price: Decimal,
    /// Units to add. Zero is ignored.
    pub quantity: u32,
}

/// Session-scoped estimate, persisted to `S` under one key.
#[derive(Debug)]
pub struct EstimateLedger<S> {
    store: S,
    storage_key: String,
    items: Vec<LineItem>,
}

impl<S: LedgerStore> EstimateLedger<S> {
    /// Opens the ledger stored under `storage_key`, or an empty one.
    ///
    /// A blob that cannot be read, does not parse, or violates the ledger
    /// invariants (zero quantity, negative price, duplicate key) is discarded
    /// with a warning and the ledger starts empty.
    pub fn open(store: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let items = match store.load(&storage_key) {
            Ok(Some(blob)) => match rehydrate(&blob) {
                Ok(items) => {
                    tracing::debug!(key = %storage_key, lines = items.len(), "rehydrated estimate");
                    items
                }
                Err(reason) => {
                    tracing::warn!(key = %storage_key, %reason, "discarding malformed persisted estimate");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "could not read persisted estimate; starting empty");
                Vec::new()
            }
        };

        Self {
            store,
            storage_key,
            items,
        }
    }

    /// Adds `item` to the ledger, merging into an existing line with the same
    /// product and tier. The merged line takes the incoming unit price.
    ///
    /// Returns the affected line, or `None` when `item.quantity` is zero or the
    /// estimate total would overflow.
    pub fn add(&mut self, item: NewLineItem) -> Option<&LineItem> {
        if item.quantity == 0 {
            tracing::debug!(product_id = %item.product_id, tier = %item.tier, "ignoring add with zero quantity");
            return None;
        }

        let key = LineItem::key_for(&item.product_id, item.tier);
        let existing = self.position(&key);
        let quantity = existing.map_or(item.quantity, |i| {
            self.items[i].quantity.saturating_add(item.quantity)
        });
        let Some(total) = self.checked_line_total(existing, item.unit_price, quantity) else {
            tracing::warn!(key = %key, quantity, unit_price = %item.unit_price, "estimate total would overflow; add ignored");
            return None;
        };

        let index = if let Some(index) = existing {
            let line = &mut self.items[index];
            line.quantity = quantity;
            line.unit_price = item.unit_price;
            line.total = total;
            index
        } else {
            self.items.push(LineItem {
                id: key,
                product_id: item.product_id,
                name: item.name,
                category: item.category,
                tier: item.tier,
                unit_price: item.unit_price,
                quantity,
                total,
            });
            self.items.len() - 1
        };

        self.persist();
        let line = &self.items[index];
        tracing::debug!(key = %line.id, quantity = line.quantity, total = %line.total, "estimate line added");
        Some(line)
    }

    /// Sets the quantity of line `key`. Zero or negative removes the line.
    ///
    /// Returns the updated line; `None` if it was removed or never existed.
    /// A quantity whose total would overflow leaves the line unchanged.
    pub fn update_quantity(&mut self, key: &str, quantity: i64) -> Option<&LineItem> {
        if quantity <= 0 {
            self.remove(key);
            return None;
        }

        let index = self.position(key)?;
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let unit_price = self.items[index].unit_price;
        let Some(total) = self.checked_line_total(Some(index), unit_price, quantity) else {
            tracing::warn!(key, quantity, "estimate total would overflow; quantity unchanged");
            return Some(&self.items[index]);
        };

        let line = &mut self.items[index];
        line.quantity = quantity;
        line.total = total;
        self.persist();
        Some(&self.items[index])
    }

    /// Removes line `key`, returning it. Absent keys are a no-op.
    pub fn remove(&mut self, key: &str) -> Option<LineItem> {
        let index = self.position(key)?;
        let removed = self.items.remove(index);
        self.persist();
        tracing::debug!(key, quantity = removed.quantity, "estimate line removed");
        Some(removed)
    }

    /// Empties the ledger.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    /// Sum of the quantities of every line.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of every line total.
    ///
    /// Mutations that would overflow are refused, so the sum always fits;
    /// `Decimal::MAX` is returned if that ever stops holding.
    #[must_use]
    pub fn total(&self) -> Decimal {
        checked_sum(self.items.iter().map(|l| &l.total)).unwrap_or(Decimal::MAX)
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LineItem> {
        self.items.iter().find(|l| l.id == key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Total of a line with `quantity` at `unit_price`, provided the ledger
    /// sum still fits once that line replaces line `replacing`.
    fn checked_line_total(
        &self,
        replacing: Option<usize>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Option<Decimal> {
        let total = LineItem::checked_total(unit_price, quantity)?;
        let others = self
            .items
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .map(|(_, l)| &l.total);
        checked_sum(others)?.checked_add(total)?;
        Some(total)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|l| l.id == key)
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.items) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(key = %self.storage_key, error = %e, "could not serialize estimate");
                return;
            }
        };
        if let Err(e) = self.store.save(&self.storage_key, &blob) {
            tracing::warn!(key = %self.storage_key, error = %e, "could not persist estimate; keeping it in memory only");
        }
    }
}

/// Parses and validates a persisted blob. Keys and totals are rebuilt from
/// each line's own fields, so blobs written with an older key format load.
fn rehydrate(blob: &str) -> Result<Vec<LineItem>, String> {
    let mut items: Vec<LineItem> = serde_json::from_str(blob).map_err(|e| e.to_string())?;

    let mut seen = std::collections::HashSet::new();
    for line in &mut items {
        if line.quantity == 0 {
            return Err(format!("line {} has zero quantity", line.id));
        }
        if line.unit_price.is_sign_negative() && !line.unit_price.is_zero() {
            return Err(format!("line {} has negative unit price", line.id));
        }
        line.id = LineItem::key_for(&line.product_id, line.tier);
        line.total = LineItem::checked_total(line.unit_price, line.quantity)
            .ok_or_else(|| format!("line {} total overflows", line.id))?;
        if !seen.insert(line.id.clone()) {
            return Err(format!("duplicate line {}", line.id));
        }
    }

    if checked_sum(items.iter().map(|l| &l.total)).is_none() {
        return Err("estimate total overflows".to_string());
    }

    Ok(items)
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
