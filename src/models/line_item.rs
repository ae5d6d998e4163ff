/// One row of the proforma as the user typed it.
///
/// Every field keeps the raw text so the submitted form carries exactly what
/// was entered; numeric interpretation happens in the calculator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineItem {
    pub description: String,
    pub price: String,
    pub quantity: String,
}

impl LineItem {
    pub fn new(description: &str, price: &str, quantity: Option<&str>) -> Self {
        let quantity = match quantity {
            Some(q) if !q.is_empty() => q.to_string(),
            _ => "1".to_string(),
        };

        Self {
            description: description.to_string(),
            price: price.to_string(),
            quantity,
        }
    }

    pub fn blank() -> Self {
        Self::new("", "", None)
    }

    pub fn field(&self, column: ItemColumn) -> &str {
        match column {
            ItemColumn::Description => &self.description,
            ItemColumn::Price => &self.price,
            ItemColumn::Quantity => &self.quantity,
        }
    }

    pub fn field_mut(&mut self, column: ItemColumn) -> &mut String {
        match column {
            ItemColumn::Description => &mut self.description,
            ItemColumn::Price => &mut self.price,
            ItemColumn::Quantity => &mut self.quantity,
        }
    }
}

// Editable columns of a row; the subtotal cell is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemColumn {
    Description,
    Price,
    Quantity,
}

impl ItemColumn {
    pub fn next(self) -> Self {
        match self {
            ItemColumn::Description => ItemColumn::Price,
            ItemColumn::Price => ItemColumn::Quantity,
            ItemColumn::Quantity => ItemColumn::Description,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            ItemColumn::Description => ItemColumn::Quantity,
            ItemColumn::Price => ItemColumn::Description,
            ItemColumn::Quantity => ItemColumn::Price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_quantity_defaults_to_one() {
        assert_eq!(LineItem::new("Widget", "10", None).quantity, "1");
        assert_eq!(LineItem::new("Widget", "10", Some("")).quantity, "1");
    }

    #[test]
    fn explicit_quantity_is_kept_verbatim() {
        assert_eq!(LineItem::new("Widget", "10", Some("0")).quantity, "0");
        assert_eq!(LineItem::new("Widget", "10", Some("3x")).quantity, "3x");
    }

    #[test]
    fn blank_row_has_quantity_one() {
        let item = LineItem::blank();
        assert!(item.description.is_empty());
        assert!(item.price.is_empty());
        assert_eq!(item.quantity, "1");
    }

    #[test]
    fn columns_cycle_both_ways() {
        let mut column = ItemColumn::Description;
        for _ in 0..3 {
            column = column.next();
        }
        assert_eq!(column, ItemColumn::Description);
        assert_eq!(ItemColumn::Description.previous(), ItemColumn::Quantity);
    }
}
