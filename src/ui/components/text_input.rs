use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// What a single-line input accepts from the keyboard
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputKind {
    Text,
    Decimal,
    Integer,
}

impl InputKind {
    pub fn accepts(self, c: char) -> bool {
        match self {
            InputKind::Text => !c.is_control(),
            InputKind::Decimal => c.is_ascii_digit() || c == '.',
            InputKind::Integer => c.is_ascii_digit(),
        }
    }
}

/// Apply a key press to `value`. Returns true when the text changed.
pub fn apply_key(kind: InputKind, value: &mut String, key: KeyCode) -> bool {
    match key {
        KeyCode::Char(c) if kind.accepts(c) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => value.pop().is_some(),
        _ => false,
    }
}

/// Text shown inside an input, with a cursor bar while focused
pub fn display_value(value: &str, focused: bool) -> String {
    if focused {
        format!("{}|", value)
    } else {
        value.to_string()
    }
}

pub fn render_input<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
) {
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(Spans::from(vec![Span::raw(display_value(value, focused))]))
        .block(
            Block::default()
                .title(Span::styled(label.to_string(), label_style))
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(paragraph, area);
}
