use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use tracing::warn;

use crate::models::{LineItem, Recalculation, Totals};

/// IVA rate applied when nothing else is configured.
pub fn default_tax_rate() -> Decimal {
    Decimal::new(12, 2)
}

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Tax rate and currency symbol the calculator works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxPolicy {
    pub rate: Decimal,
    pub currency_symbol: String,
}

impl TaxPolicy {
    pub fn new(rate: Decimal, currency_symbol: &str) -> Self {
        Self {
            rate,
            currency_symbol: currency_symbol.to_string(),
        }
    }

    /// Recompute every row subtotal and the aggregates.
    ///
    /// Invalid or missing numbers count as zero, so this never fails and
    /// running it twice on the same rows yields the same result. Sums past
    /// the `Decimal` range saturate at `Decimal::MAX` / `Decimal::MIN`.
    pub fn recalc(&self, items: &[LineItem]) -> Recalculation {
        let mut subtotal = Decimal::ZERO;
        let mut row_subtotals = Vec::with_capacity(items.len());

        for item in items {
            let row = row_subtotal(item);
            subtotal = subtotal.checked_add(row).unwrap_or_else(|| {
                warn!("subtotal overflow at row {:?}, saturating", item.description);
                subtotal.saturating_add(row)
            });
            row_subtotals.push(row);
        }

        let tax = round_cents(subtotal.checked_mul(self.rate).unwrap_or(Decimal::ZERO));
        let total = round_cents(subtotal.saturating_add(tax));

        Recalculation {
            row_subtotals,
            totals: Totals {
                subtotal,
                tax,
                total,
            },
        }
    }

    /// Two decimals behind the currency symbol, no grouping.
    pub fn format_currency(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, round_cents(amount))
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::new(default_tax_rate(), DEFAULT_CURRENCY_SYMBOL)
    }
}

pub fn row_subtotal(item: &LineItem) -> Decimal {
    let price = parse_price(&item.price);
    let quantity = Decimal::from(parse_quantity(&item.quantity));

    price.checked_mul(quantity).unwrap_or_else(|| {
        warn!("row subtotal overflow for {:?}, saturating", item.description);
        price.saturating_mul(quantity)
    })
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Read the longest decimal prefix of `text`: `"12.5kg"` is 12.5, `"abc"` is 0.
pub fn parse_price(text: &str) -> Decimal {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_part = &s[int_start..pos];

    let mut frac_part = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_part = &s[frac_start..frac_end];
        if !int_part.is_empty() || !frac_part.is_empty() {
            pos = frac_end;
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return Decimal::ZERO;
    }

    let mut mantissa = String::with_capacity(pos + 2);
    if negative {
        mantissa.push('-');
    }
    mantissa.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        mantissa.push('.');
        mantissa.push_str(frac_part);
    }

    let base = Decimal::from_str(&mantissa).unwrap_or(Decimal::ZERO);
    let Some(exp) = exponent_at(&s[pos..]) else {
        return base;
    };
    if base.is_zero() {
        return Decimal::ZERO;
    }

    // Results too small or too large for a Decimal read as zero
    Decimal::from_scientific(&format!("{}e{}", mantissa, exp)).unwrap_or(Decimal::ZERO)
}

// Exponent suffix such as "e3" or "E-2"; anything else is ignored.
// Exponents beyond i32 saturate, which always lands outside the Decimal range.
fn exponent_at(rest: &str) -> Option<i32> {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return None;
    }

    let mut end = 1;
    if matches!(bytes.get(1), Some(b'+' | b'-')) {
        end = 2;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    match rest[1..end].parse() {
        Ok(exp) => Some(exp),
        Err(_) if bytes[1] == b'-' => Some(i32::MIN),
        Err(_) => Some(i32::MAX),
    }
}

/// Read the longest integer prefix of `text`: `"2.5"` is 2, `"x"` is 0.
///
/// Values outside `i64` saturate at `i64::MAX` / `i64::MIN`.
pub fn parse_quantity(text: &str) -> i64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }

    match s[..end].parse() {
        Ok(quantity) => quantity,
        Err(_) if bytes[0] == b'-' => i64::MIN,
        Err(_) => i64::MAX,
    }
}
