//! Human-readable estimate summaries and the Telegram hand-off links.

use std::fmt::Write as _;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::ledger::{checked_sum, EstimateLedger, LineItem};
use crate::products::PriceTier;
use crate::store::LedgerStore;

const GREETING: &str = "Hola, me gustaría confirmar este pedido:";
const EMPTY_GREETING: &str = "Hola, me gustaría información sobre sus productos.";
const DISCLAIMER: &str = "Este es un precio estimado. Los precios finales pueden variar.";

/// Formats an amount the way the storefront shows MXN prices (`$1,700`,
/// `$1,700.5`): thousands separated by commas, at most two decimals, no
/// trailing zeros.
#[must_use]
pub fn format_mxn(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}

/// Display name for a catalog category label.
#[must_use]
pub fn category_display_name(category: &str) -> String {
    match category {
        "flores" => "Flores".to_string(),
        "pre-rolls" => "Pre-rolls".to_string(),
        "parafernalia" => "Parafernalia".to_string(),
        "vapes" => "Vapes".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub name: String,
    pub category: String,
    pub tier: PriceTier,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// Snapshot of an estimate ready to be shown or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateSummary {
    pub lines: Vec<SummaryLine>,
    pub item_count: u64,
    pub total: Decimal,
}

impl EstimateSummary {
    #[must_use]
    pub fn from_items(items: &[LineItem]) -> Self {
        let lines: Vec<SummaryLine> = items
            .iter()
            .map(|l| SummaryLine {
                name: l.name.clone(),
                category: l.category.clone(),
                tier: l.tier,
                quantity: l.quantity,
                unit_price: l.unit_price,
                total: l.total,
            })
            .collect();
        let item_count = lines.iter().map(|l| u64::from(l.quantity)).sum();
        let total = checked_sum(lines.iter().map(|l| &l.total)).unwrap_or(Decimal::MAX);
        Self {
            lines,
            item_count,
            total,
        }
    }

    #[must_use]
    pub fn from_ledger<S: LedgerStore>(ledger: &EstimateLedger<S>) -> Self {
        Self::from_items(ledger.items())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plain-text message handed to the messaging app.
    #[must_use]
    pub fn to_message(&self) -> String {
        if self.is_empty() {
            return EMPTY_GREETING.to_string();
        }

        let mut out = String::from(GREETING);
        out.push('\n');
        for line in &self.lines {
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "- {} x {} ({}, {}): {}",
                line.quantity,
                line.name,
                line.tier.summary_label(),
                category_display_name(&line.category),
                format_mxn(line.total),
            );
        }
        let _ = writeln!(out, "Total estimado: {}", format_mxn(self.total));
        out.push_str(DISCLAIMER);
        out
    }
}

impl std::fmt::Display for EstimateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_message())
    }
}

/// Deep links that open a chat with the shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLinks {
    /// `https://t.me/<handle>?text=...`, works with or without the app.
    pub telegram_web: String,
    /// `tg://resolve?phone=...`, only when a phone number is configured.
    pub telegram_app: Option<String>,
    /// `tel:...` fallback when Telegram is not installed.
    pub dialer: Option<String>,
}

impl ContactLinks {
    #[must_use]
    pub fn new(handle: &str, phone_e164: Option<&str>, message: &str) -> Self {
        let handle = handle.trim().trim_start_matches('@');
        let text = utf8_percent_encode(message, NON_ALPHANUMERIC);
        let telegram_web = format!("https://t.me/{handle}?text={text}");

        let phone = phone_e164
            .map(|p| p.chars().filter(|c| !c.is_whitespace()).collect::<String>())
            .filter(|p| !p.is_empty());
        let telegram_app = phone
            .as_deref()
            .map(|p| format!("tg://resolve?phone={}", p.trim_start_matches('+')));
        let dialer = phone.map(|p| format!("tel:{p}"));

        Self {
            telegram_web,
            telegram_app,
            dialer,
        }
    }

    /// Links for `summary`'s message.
    #[must_use]
    pub fn for_summary(handle: &str, phone_e164: Option<&str>, summary: &EstimateSummary) -> Self {
        Self::new(handle, phone_e164, &summary.to_message())
    }
}
