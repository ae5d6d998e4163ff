pub mod components;
pub mod proforma_form;
