use proforma_editor::calculator::TaxPolicy;
use proforma_editor::error::FormError;
use proforma_editor::form::ProformaForm;
use proforma_editor::models::ItemColumn;
use proforma_editor::submission::sink::{FileSink, SubmissionSink};

#[test]
fn compose_edit_and_submit_a_proforma() {
    let mut form = ProformaForm::new(TaxPolicy::default());
    assert_eq!(form.items().len(), 1);

    // fill the blank row in place, then add a second one from the entry fields
    form.set_cell(0, ItemColumn::Description, "A");
    form.set_cell(0, ItemColumn::Price, "1.00");
    form.set_cell(0, ItemColumn::Quantity, "2");

    let entry = form.entry_mut();
    entry.description = "B".to_string();
    entry.price = "2.50".to_string();
    form.add_from_entry().unwrap();

    assert_eq!(form.subtotal_display(), "$4.50");
    assert_eq!(form.tax_display(), "$0.54");
    assert_eq!(form.total_display(), "$5.04");

    let submission = form.submit().unwrap();
    assert_eq!(submission.descriptions(), vec!["A", "B"]);
    assert_eq!(submission.prices(), vec!["1.00", "2.50"]);
    assert_eq!(submission.quantities(), vec!["2", "1"]);

    let path = std::env::temp_dir().join(format!("proforma-flow-{}.form", std::process::id()));
    FileSink::new(&path).deliver(&submission).unwrap();
    let body = std::fs::read_to_string(&path).unwrap();
    assert!(body.starts_with("cedula=&nombre=&email=&celular=&direccion=&observaciones=&mostrar_precios=on&"));
    assert!(body.trim_end().ends_with("item_descripcion%5B%5D=B&item_precio%5B%5D=2.50&item_cantidad%5B%5D=1"));
    std::fs::remove_file(&path).ok();
}

#[test]
fn emptied_form_cannot_be_submitted() {
    let mut form = ProformaForm::new(TaxPolicy::default());
    form.delete_row(0);

    assert_eq!(form.submit().unwrap_err(), FormError::NoItems);
    assert!(form.hidden_fields().is_empty());
}
