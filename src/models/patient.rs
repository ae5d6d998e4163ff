/// Patient block printed at the top of the proforma.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Patient {
    /// National identity number (cédula)
    pub id_number: String,
    pub name: String,
    pub email: String,
    /// Mobile phone
    pub phone: String,
    pub address: String,
}
