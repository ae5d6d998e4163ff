use tracing::{debug, info, warn};

use crate::calculator::TaxPolicy;
use crate::error::FormError;
use crate::models::{ItemColumn, LineItem, Patient, Recalculation};
use crate::submission::{self, FormSubmission, HiddenField, SubmissionGate};

/// The "new item" inputs above the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub description: String,
    pub price: String,
    pub quantity: String,
}

impl Default for EntryFields {
    fn default() -> Self {
        Self {
            description: String::new(),
            price: String::new(),
            quantity: "1".to_string(),
        }
    }
}

/// In-memory proforma being composed.
///
/// The rows are the source of truth; every mutation recalculates before
/// returning, so `recalculation()` always matches `items()`.
pub struct ProformaForm {
    policy: TaxPolicy,
    items: Vec<LineItem>,
    entry: EntryFields,
    pub patient: Patient,
    pub remarks: String,
    pub show_prices: bool,
    recalculation: Recalculation,
    hidden_fields: Vec<HiddenField>,
}

impl ProformaForm {
    /// A form with one blank row, so it never starts empty
    pub fn new(policy: TaxPolicy) -> Self {
        let mut form = Self {
            policy,
            items: Vec::new(),
            entry: EntryFields::default(),
            patient: Patient::default(),
            remarks: String::new(),
            show_prices: true,
            recalculation: Recalculation::default(),
            hidden_fields: Vec::new(),
        };
        form.add_row("", "", None);
        form
    }

    pub fn policy(&self) -> &TaxPolicy {
        &self.policy
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn entry(&self) -> &EntryFields {
        &self.entry
    }

    pub fn entry_mut(&mut self) -> &mut EntryFields {
        &mut self.entry
    }

    pub fn recalculation(&self) -> &Recalculation {
        &self.recalculation
    }

    /// Fields generated by the last submit; empty after a rejected one
    pub fn hidden_fields(&self) -> &[HiddenField] {
        &self.hidden_fields
    }

    /// Append a row and return its index. An empty quantity becomes 1.
    pub fn add_row(&mut self, description: &str, price: &str, quantity: Option<&str>) -> usize {
        self.items.push(LineItem::new(description, price, quantity));
        debug!(rows = self.items.len(), "row added");
        self.recalc();
        self.items.len() - 1
    }

    /// Add the row typed in the entry fields, then reset them.
    pub fn add_from_entry(&mut self) -> Result<usize, FormError> {
        let description = self.entry.description.trim().to_string();
        if description.is_empty() || self.entry.price.is_empty() {
            warn!("add rejected: description or price missing");
            return Err(FormError::MissingDescriptionOrPrice);
        }

        let price = self.entry.price.clone();
        let quantity = self.entry.quantity.clone();
        let index = self.add_row(&description, &price, Some(&quantity));
        self.entry = EntryFields::default();

        Ok(index)
    }

    pub fn delete_row(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }

        let removed = self.items.remove(index);
        debug!(index, rows = self.items.len(), "row deleted");
        self.recalc();
        Some(removed)
    }

    /// Replace one cell of a row; returns false for an unknown row
    pub fn set_cell(&mut self, index: usize, column: ItemColumn, value: &str) -> bool {
        self.update_cell(index, column, |text| {
            text.clear();
            text.push_str(value);
        })
    }

    pub fn update_cell<F>(&mut self, index: usize, column: ItemColumn, edit: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        match self.items.get_mut(index) {
            Some(item) => {
                edit(item.field_mut(column));
                self.recalc();
                true
            }
            None => false,
        }
    }

    pub fn recalc(&mut self) -> &Recalculation {
        self.recalculation = self.policy.recalc(&self.items);
        &self.recalculation
    }

    pub fn row_subtotal_display(&self, index: usize) -> String {
        self.recalculation
            .row_subtotals
            .get(index)
            .map(|amount| self.policy.format_currency(*amount))
            .unwrap_or_default()
    }

    pub fn subtotal_display(&self) -> String {
        self.policy.format_currency(self.recalculation.totals.subtotal)
    }

    pub fn tax_display(&self) -> String {
        self.policy.format_currency(self.recalculation.totals.tax)
    }

    pub fn total_display(&self) -> String {
        self.policy.format_currency(self.recalculation.totals.total)
    }

    /// Regenerate the form fields from the current rows.
    ///
    /// Previously generated fields are always discarded first.
    pub fn submit(&mut self) -> Result<FormSubmission, FormError> {
        self.hidden_fields.clear();

        match submission::validate(&self.items) {
            SubmissionGate::Empty => {
                warn!("submit rejected: no items");
                Err(FormError::NoItems)
            }
            SubmissionGate::Ready { rows } => {
                self.hidden_fields =
                    submission::header_fields(&self.patient, &self.remarks, self.show_prices);
                self.hidden_fields.extend(submission::item_fields(&self.items));
                info!(rows, fields = self.hidden_fields.len(), "proforma submitted");
                Ok(FormSubmission::new(self.hidden_fields.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{parse_price, parse_quantity};
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn form() -> ProformaForm {
        ProformaForm::new(TaxPolicy::default())
    }

    fn type_entry(form: &mut ProformaForm, description: &str, price: &str, quantity: &str) {
        let entry = form.entry_mut();
        entry.description = description.to_string();
        entry.price = price.to_string();
        entry.quantity = quantity.to_string();
    }

    #[test]
    fn starts_with_one_blank_row() {
        let form = form();

        assert_eq!(form.items(), &[LineItem::blank()]);
        assert_eq!(form.row_subtotal_display(0), "$0.00");
        assert_eq!(form.total_display(), "$0.00");
        assert_eq!(form.entry(), &EntryFields::default());
    }

    #[test]
    fn widget_as_only_row() {
        let mut form = form();
        form.delete_row(0);
        type_entry(&mut form, "Widget", "10.00", "3");

        let index = form.add_from_entry().unwrap();

        assert_eq!(index, 0);
        assert_eq!(form.row_subtotal_display(0), "$30.00");
        assert_eq!(form.subtotal_display(), "$30.00");
        assert_eq!(form.tax_display(), "$3.60");
        assert_eq!(form.total_display(), "$33.60");
    }

    #[test]
    fn successful_add_clears_entry() {
        let mut form = form();
        type_entry(&mut form, "  Consulta  ", "25", "2");

        form.add_from_entry().unwrap();

        assert_eq!(form.items()[1], LineItem::new("Consulta", "25", Some("2")));
        assert_eq!(form.entry(), &EntryFields::default());
    }

    #[test]
    fn add_with_empty_entry_quantity_uses_one() {
        let mut form = form();
        type_entry(&mut form, "Consulta", "25", "");

        form.add_from_entry().unwrap();

        assert_eq!(form.items()[1].quantity, "1");
    }

    #[test]
    fn add_without_description_is_rejected() {
        let mut form = form();
        type_entry(&mut form, "   ", "5", "2");

        let err = form.add_from_entry().unwrap_err();

        assert_eq!(err, FormError::MissingDescriptionOrPrice);
        assert_eq!(err.to_string(), "Ingresa descripción y precio");
        assert_eq!(form.items().len(), 1);
        assert_eq!(form.entry().description, "   ");
        assert_eq!(form.entry().price, "5");
        assert_eq!(form.entry().quantity, "2");
    }

    #[test]
    fn add_without_price_is_rejected() {
        let mut form = form();
        type_entry(&mut form, "Consulta", "", "1");

        assert_eq!(form.add_from_entry(), Err(FormError::MissingDescriptionOrPrice));
        assert_eq!(form.items().len(), 1);
    }

    #[test]
    fn editing_a_cell_recalculates() {
        let mut form = form();
        assert!(form.set_cell(0, ItemColumn::Price, "4.50"));
        assert!(form.set_cell(0, ItemColumn::Quantity, "2"));

        assert_eq!(form.subtotal_display(), "$9.00");
        assert_eq!(form.tax_display(), "$1.08");
        assert_eq!(form.total_display(), "$10.08");

        assert!(form.update_cell(0, ItemColumn::Quantity, |q| {
            q.pop();
        }));
        assert_eq!(form.total_display(), "$0.00");

        assert!(!form.set_cell(7, ItemColumn::Price, "1"));
    }

    #[test]
    fn deleting_updates_totals() {
        let mut form = form();
        form.add_row("A", "1.00", Some("2"));
        form.add_row("B", "2.50", Some("1"));
        assert_eq!(form.subtotal_display(), "$4.50");

        let removed = form.delete_row(1).unwrap();
        assert_eq!(removed.description, "A");
        assert_eq!(form.subtotal_display(), "$2.50");

        assert!(form.delete_row(5).is_none());
    }

    #[test]
    fn submit_with_no_rows_is_rejected() {
        let mut form = form();
        form.add_row("A", "1", None);
        form.submit().unwrap();
        assert!(!form.hidden_fields().is_empty());

        form.delete_row(1);
        form.delete_row(0);
        let err = form.submit().unwrap_err();

        assert_eq!(err, FormError::NoItems);
        assert_eq!(err.to_string(), "Agrega al menos un ítem");
        assert!(form.hidden_fields().is_empty());
    }

    #[test]
    fn submit_produces_aligned_arrays() {
        let mut form = form();
        form.delete_row(0);
        form.add_row("A", "1.00", Some("2"));
        form.add_row("B", "2.50", Some("1"));

        let submission = form.submit().unwrap();

        assert_eq!(submission.descriptions(), vec!["A", "B"]);
        assert_eq!(submission.prices(), vec!["1.00", "2.50"]);
        assert_eq!(submission.quantities(), vec!["2", "1"]);
        assert_eq!(form.hidden_fields(), submission.fields());
    }

    #[test]
    fn resubmitting_does_not_duplicate_fields() {
        let mut form = form();
        form.set_cell(0, ItemColumn::Description, "A");

        let first = form.submit().unwrap();
        let second = form.submit().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.item_count(), 1);
    }

    #[test]
    fn submit_carries_patient_header() {
        let mut form = form();
        form.patient.id_number = "0102030405".to_string();
        form.patient.name = "Ana Pérez".to_string();
        form.remarks = "En ayunas".to_string();
        form.show_prices = false;

        let submission = form.submit().unwrap();

        assert_eq!(submission.values("cedula"), vec!["0102030405"]);
        assert_eq!(submission.values("nombre"), vec!["Ana Pérez"]);
        assert_eq!(submission.values("observaciones"), vec!["En ayunas"]);
        assert!(submission.values("mostrar_precios").is_empty());
        assert_eq!(submission.descriptions(), vec![""]);
        assert_eq!(submission.quantities(), vec!["1"]);
    }

    #[test]
    fn recalc_twice_is_stable() {
        let mut form = form();
        form.add_row("A", "3.333", Some("3"));
        let first = form.recalc().clone();
        let second = form.recalc().clone();
        assert_eq!(first, second);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(String, String, String),
        Edit(usize, u8, String),
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        let text = "[0-9a-df-z.]{0,5}";
        prop_oneof![
            (text, text, text).prop_map(|(d, p, q)| Op::Add(d, p, q)),
            (0usize..8, 0u8..3, text).prop_map(|(i, c, v)| Op::Edit(i, c, v)),
            (0usize..8).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn totals_always_match_rows(ops in prop::collection::vec(op(), 0..30)) {
            let mut form = form();

            for op in ops {
                match op {
                    Op::Add(d, p, q) => {
                        form.add_row(&d, &p, Some(&q));
                    }
                    Op::Edit(i, c, v) => {
                        let column = match c {
                            0 => ItemColumn::Description,
                            1 => ItemColumn::Price,
                            _ => ItemColumn::Quantity,
                        };
                        form.set_cell(i, column, &v);
                    }
                    Op::Delete(i) => {
                        form.delete_row(i);
                    }
                }

                let expected: Decimal = form
                    .items()
                    .iter()
                    .map(|item| parse_price(&item.price) * Decimal::from(parse_quantity(&item.quantity)))
                    .sum();
                let totals = form.recalculation().totals;
                prop_assert_eq!(totals.subtotal, expected);
                prop_assert_eq!(form.recalculation().row_subtotals.len(), form.items().len());
            }
        }
    }
}
