pub mod sink;

use tracing::debug;
use url::form_urlencoded;

use crate::models::{LineItem, Patient};

pub const FIELD_DESCRIPTION: &str = "item_descripcion[]";
pub const FIELD_PRICE: &str = "item_precio[]";
pub const FIELD_QUANTITY: &str = "item_cantidad[]";
pub const FIELD_SHOW_PRICES: &str = "mostrar_precios";

/// A generated form field, the terminal counterpart of a hidden input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenField {
    pub name: &'static str,
    pub value: String,
}

impl HiddenField {
    fn new(name: &'static str, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

/// Whether the current rows may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionGate {
    Empty,
    Ready { rows: usize },
}

pub fn validate(items: &[LineItem]) -> SubmissionGate {
    if items.is_empty() {
        SubmissionGate::Empty
    } else {
        SubmissionGate::Ready { rows: items.len() }
    }
}

/// Patient and remarks fields, emitted ahead of the items.
///
/// `mostrar_precios` follows checkbox semantics: present as `on` when checked,
/// absent otherwise.
pub fn header_fields(patient: &Patient, remarks: &str, show_prices: bool) -> Vec<HiddenField> {
    let mut fields = vec![
        HiddenField::new("cedula", &patient.id_number),
        HiddenField::new("nombre", &patient.name),
        HiddenField::new("email", &patient.email),
        HiddenField::new("celular", &patient.phone),
        HiddenField::new("direccion", &patient.address),
        HiddenField::new("observaciones", remarks),
    ];
    if show_prices {
        fields.push(HiddenField::new(FIELD_SHOW_PRICES, "on"));
    }
    fields
}

/// Three fields per row, in row order: trimmed description, then price and
/// quantity exactly as typed.
pub fn item_fields(items: &[LineItem]) -> Vec<HiddenField> {
    let mut fields = Vec::with_capacity(items.len() * 3);
    for item in items {
        fields.push(HiddenField::new(FIELD_DESCRIPTION, item.description.trim()));
        fields.push(HiddenField::new(FIELD_PRICE, &item.price));
        fields.push(HiddenField::new(FIELD_QUANTITY, &item.quantity));
    }
    debug!("serialized {} rows into {} fields", items.len(), fields.len());
    fields
}

/// The full set of fields produced by one successful submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    fields: Vec<HiddenField>,
}

impl FormSubmission {
    pub fn new(fields: Vec<HiddenField>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[HiddenField] {
        &self.fields
    }

    /// All values posted under `name`, in order
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .map(|f| f.value.as_str())
            .collect()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.values(FIELD_DESCRIPTION)
    }

    pub fn prices(&self) -> Vec<&str> {
        self.values(FIELD_PRICE)
    }

    pub fn quantities(&self) -> Vec<&str> {
        self.values(FIELD_QUANTITY)
    }

    pub fn item_count(&self) -> usize {
        self.descriptions().len()
    }

    /// `application/x-www-form-urlencoded` body
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for field in &self.fields {
            serializer.append_pair(field.name, &field.value);
        }
        serializer.finish()
    }
}
