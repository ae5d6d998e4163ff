/// Validation failures shown to the user as an alert.
///
/// The messages are the exact alert texts of the proforma form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Ingresa descripción y precio")]
    MissingDescriptionOrPrice,
    #[error("Agrega al menos un ítem")]
    NoItems,
}
