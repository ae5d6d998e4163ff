mod line_item;
mod patient;
mod totals;

pub use line_item::{ItemColumn, LineItem};
pub use patient::Patient;
pub use totals::{Recalculation, Totals};
