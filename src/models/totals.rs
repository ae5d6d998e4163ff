use rust_decimal::Decimal;

/// Aggregate amounts shown under the item table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Everything a recalculation writes to the screen: one subtotal per row, in
/// row order, plus the aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Recalculation {
    pub row_subtotals: Vec<Decimal>,
    pub totals: Totals,
}
