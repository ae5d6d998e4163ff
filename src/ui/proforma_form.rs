use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rust_decimal::Decimal;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::debug;

use crate::calculator::TaxPolicy;
use crate::form::ProformaForm;
use crate::models::ItemColumn;
use crate::submission::FormSubmission;
use crate::ui::components::text_input::{self, InputKind};

// Focusable parts of the screen, in Tab order
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FormField {
    IdNumber,
    Name,
    Email,
    Phone,
    Address,
    NewDescription,
    NewPrice,
    NewQuantity,
    Items,
    Remarks,
    ShowPrices,
}

const FIELD_ORDER: [FormField; 11] = [
    FormField::IdNumber,
    FormField::Name,
    FormField::Email,
    FormField::Phone,
    FormField::Address,
    FormField::NewDescription,
    FormField::NewPrice,
    FormField::NewQuantity,
    FormField::Items,
    FormField::Remarks,
    FormField::ShowPrices,
];

fn column_kind(column: ItemColumn) -> InputKind {
    match column {
        ItemColumn::Description => InputKind::Text,
        ItemColumn::Price => InputKind::Decimal,
        ItemColumn::Quantity => InputKind::Integer,
    }
}

pub enum ProformaFormAction {
    Cancel,
    Submit(FormSubmission),
}

// Screen state wrapped around the proforma model
pub struct ProformaFormState {
    form: ProformaForm,
    current_field: FormField,
    items_table_state: TableState,
    item_column: ItemColumn,
    show_error: Option<String>,
    date: NaiveDate,
}

impl ProformaFormState {
    pub fn new(policy: TaxPolicy) -> Self {
        let mut items_table_state = TableState::default();
        items_table_state.select(Some(0));

        Self {
            form: ProformaForm::new(policy),
            current_field: FormField::IdNumber,
            items_table_state,
            item_column: ItemColumn::Description,
            show_error: None,
            date: Local::now().date_naive(),
        }
    }

    pub fn form(&self) -> &ProformaForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProformaForm {
        &mut self.form
    }

    pub fn current_field(&self) -> FormField {
        self.current_field
    }

    pub fn focus(&mut self, field: FormField) {
        self.current_field = field;
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.items_table_state.selected()
    }

    pub fn item_column(&self) -> ItemColumn {
        self.item_column
    }

    pub fn error(&self) -> Option<&str> {
        self.show_error.as_deref()
    }

    pub fn show_error(&mut self, message: String) {
        self.show_error = Some(message);
    }

    pub fn next_field(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()];
    }

    pub fn previous_field(&mut self) {
        let idx = FIELD_ORDER.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()];
    }

    pub fn next_row(&mut self) {
        let len = self.form.items().len();
        if len == 0 {
            return;
        }

        let i = match self.items_table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.items_table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.form.items().len();
        if len == 0 {
            return;
        }

        let i = match self.items_table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.items_table_state.select(Some(i));
    }

    pub fn delete_selected_row(&mut self) {
        let Some(selected) = self.items_table_state.selected() else {
            return;
        };
        if self.form.delete_row(selected).is_none() {
            return;
        }

        let len = self.form.items().len();
        if len == 0 {
            self.items_table_state.select(None);
        } else if selected >= len {
            self.items_table_state.select(Some(len - 1));
        }
    }

    fn add_from_entry(&mut self) {
        match self.form.add_from_entry() {
            Ok(index) => {
                self.items_table_state.select(Some(index));
                self.current_field = FormField::NewDescription;
            }
            Err(err) => self.show_error = Some(err.to_string()),
        }
    }

    fn edit_selected_cell(&mut self, key: KeyCode) {
        let Some(selected) = self.items_table_state.selected() else {
            return;
        };
        let column = self.item_column;
        self.form.update_cell(selected, column, |text| {
            text_input::apply_key(column_kind(column), text, key);
        });
    }

    fn edit_text_field(&mut self, key: KeyCode) {
        let (kind, value) = match self.current_field {
            FormField::IdNumber => (InputKind::Text, &mut self.form.patient.id_number),
            FormField::Name => (InputKind::Text, &mut self.form.patient.name),
            FormField::Email => (InputKind::Text, &mut self.form.patient.email),
            FormField::Phone => (InputKind::Text, &mut self.form.patient.phone),
            FormField::Address => (InputKind::Text, &mut self.form.patient.address),
            FormField::Remarks => (InputKind::Text, &mut self.form.remarks),
            FormField::NewDescription => (InputKind::Text, &mut self.form.entry_mut().description),
            FormField::NewPrice => (InputKind::Decimal, &mut self.form.entry_mut().price),
            FormField::NewQuantity => (InputKind::Integer, &mut self.form.entry_mut().quantity),
            FormField::Items | FormField::ShowPrices => return,
        };
        text_input::apply_key(kind, value, key);
    }

    /// Translate one key press into a form operation.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ProformaFormAction> {
        // Any key dismisses the alert popup
        if self.show_error.take().is_some() {
            return None;
        }

        let submit = key.code == KeyCode::F(2)
            || (key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL));
        if submit {
            return match self.form.submit() {
                Ok(submission) => Some(ProformaFormAction::Submit(submission)),
                Err(err) => {
                    self.show_error = Some(err.to_string());
                    None
                }
            };
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match key.code {
            KeyCode::Esc => return Some(ProformaFormAction::Cancel),
            KeyCode::Tab => self.next_field(),
            KeyCode::BackTab => self.previous_field(),
            _ => match self.current_field {
                FormField::Items => match key.code {
                    KeyCode::Up => self.previous_row(),
                    KeyCode::Down => self.next_row(),
                    KeyCode::Left => self.item_column = self.item_column.previous(),
                    KeyCode::Right | KeyCode::Enter => self.item_column = self.item_column.next(),
                    KeyCode::Delete => self.delete_selected_row(),
                    code => self.edit_selected_cell(code),
                },
                FormField::ShowPrices => match key.code {
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        self.form.show_prices = !self.form.show_prices;
                    }
                    KeyCode::Up => self.previous_field(),
                    KeyCode::Down => self.next_field(),
                    _ => {}
                },
                FormField::NewDescription | FormField::NewPrice | FormField::NewQuantity => {
                    match key.code {
                        KeyCode::Enter => self.add_from_entry(),
                        KeyCode::Up => self.previous_field(),
                        KeyCode::Down => self.next_field(),
                        code => self.edit_text_field(code),
                    }
                }
                _ => match key.code {
                    KeyCode::Enter | KeyCode::Down => self.next_field(),
                    KeyCode::Up => self.previous_field(),
                    code => self.edit_text_field(code),
                },
            },
        }

        None
    }
}

pub fn render_proforma_form<B: Backend>(frame: &mut Frame<B>, state: &mut ProformaFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3), // Title
                Constraint::Length(3), // Patient
                Constraint::Length(3), // New item
                Constraint::Min(6),    // Items
                Constraint::Length(3), // Totals
                Constraint::Length(3), // Remarks
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(frame.size());

    let title = Paragraph::new(Spans::from(vec![
        Span::styled("Nueva proforma", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("   Fecha: {}", state.date.format("%d/%m/%Y"))),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_patient(frame, state, chunks[1]);
    render_entry(frame, state, chunks[2]);
    render_items(frame, state, chunks[3]);
    render_totals(frame, state, chunks[4]);
    render_remarks(frame, state, chunks[5]);

    let help_text = match state.current_field {
        FormField::Items => {
            "Up/Down - Row | Left/Right - Column | Del - Delete row | Tab - Next | F2 - Submit | Esc - Quit"
        }
        FormField::NewDescription | FormField::NewPrice | FormField::NewQuantity => {
            "Enter - Add item | Tab - Next | F2 - Submit | Esc - Quit"
        }
        FormField::ShowPrices => "Space - Toggle | Tab - Next | F2 - Submit | Esc - Quit",
        _ => "Tab/Shift-Tab - Navigate fields | F2 - Submit | Esc - Quit",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[6]);

    if let Some(error) = &state.show_error {
        let size = frame.size();
        render_error(frame, size, error);
    }
}

fn render_patient<B: Backend>(frame: &mut Frame<B>, state: &ProformaFormState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(16),
                Constraint::Percentage(24),
                Constraint::Percentage(22),
                Constraint::Percentage(14),
                Constraint::Percentage(24),
            ]
            .as_ref(),
        )
        .split(area);

    let patient = &state.form.patient;
    let fields = [
        (FormField::IdNumber, "Cédula", &patient.id_number),
        (FormField::Name, "Nombre", &patient.name),
        (FormField::Email, "Correo", &patient.email),
        (FormField::Phone, "Celular", &patient.phone),
        (FormField::Address, "Dirección", &patient.address),
    ];
    for (i, (field, label, value)) in fields.iter().enumerate() {
        text_input::render_input(frame, cols[i], label, value, state.current_field == *field);
    }
}

fn render_entry<B: Backend>(frame: &mut Frame<B>, state: &ProformaFormState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(60),
                Constraint::Percentage(25),
                Constraint::Percentage(15),
            ]
            .as_ref(),
        )
        .split(area);

    let entry = state.form.entry();
    let focus = state.current_field;
    text_input::render_input(frame, cols[0], "Descripción", &entry.description, focus == FormField::NewDescription);
    text_input::render_input(frame, cols[1], "Precio", &entry.price, focus == FormField::NewPrice);
    text_input::render_input(frame, cols[2], "Cant.", &entry.quantity, focus == FormField::NewQuantity);
}

fn render_items<B: Backend>(frame: &mut Frame<B>, state: &mut ProformaFormState, area: Rect) {
    let focused = state.current_field == FormField::Items;
    let selected = state.items_table_state.selected();
    let column = state.item_column;

    let rows: Vec<Row> = state
        .form
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let cell = |col: ItemColumn| {
                let editing = focused && selected == Some(i) && column == col;
                let value = text_input::display_value(item.field(col), editing);
                if editing {
                    Cell::from(value).style(Style::default().add_modifier(Modifier::UNDERLINED))
                } else {
                    Cell::from(value)
                }
            };
            Row::new(vec![
                cell(ItemColumn::Description),
                cell(ItemColumn::Price),
                cell(ItemColumn::Quantity),
                Cell::from(state.form.row_subtotal_display(i))
                    .style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Descripción", "Precio", "Cant.", "Subtotal"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let widths = [
        Constraint::Percentage(50),
        Constraint::Percentage(18),
        Constraint::Percentage(12),
        Constraint::Percentage(20),
    ];

    let table = Table::new(rows)
        .header(header)
        .block(
            Block::default()
                .title(if focused { "Ítems (selected)" } else { "Ítems" })
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                }),
        )
        .widths(&widths)
        .highlight_style(if focused {
            Style::default().bg(Color::Blue).fg(Color::White)
        } else {
            Style::default()
        });

    frame.render_stateful_widget(table, area, &mut state.items_table_state);
}

fn render_totals<B: Backend>(frame: &mut Frame<B>, state: &ProformaFormState, area: Rect) {
    let rate = (state.form.policy().rate * Decimal::ONE_HUNDRED).normalize();
    let totals = Paragraph::new(Spans::from(vec![
        Span::raw(format!("Subtotal: {}", state.form.subtotal_display())),
        Span::raw(format!("   IVA ({}%): {}", rate, state.form.tax_display())),
        Span::raw("   Total: "),
        Span::styled(state.form.total_display(), Style::default().add_modifier(Modifier::BOLD)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(totals, area);
}

fn render_remarks<B: Backend>(frame: &mut Frame<B>, state: &ProformaFormState, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)].as_ref())
        .split(area);

    text_input::render_input(
        frame,
        cols[0],
        "Observaciones",
        &state.form.remarks,
        state.current_field == FormField::Remarks,
    );

    let focused = state.current_field == FormField::ShowPrices;
    let mark = if state.form.show_prices { "[x]" } else { "[ ]" };
    let checkbox = Paragraph::new(format!("{} Mostrar precios", mark))
        .style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(checkbox, cols[1]);
}

fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str) {
    let popup_area = centered_rect(60, 20, size);

    let error_msg = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(error),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Aviso").borders(Borders::ALL))
    .style(Style::default().fg(Color::Red));

    frame.render_widget(tui::widgets::Clear, popup_area);
    frame.render_widget(error_msg, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(state: &mut ProformaFormState) -> Result<Option<ProformaFormAction>> {
    if let Event::Key(key) = event::read()? {
        if key.kind == KeyEventKind::Press {
            debug!(code = ?key.code, field = ?state.current_field, "key");
            return Ok(state.handle_key(key));
        }
    }

    Ok(None)
}
