//! On-screen key layout.
//!
//! The table's 25 notes sit on two rows of the computer keyboard plus one
//! extra key for the top Bb:
//!
//!   low octave   z s x d c v g b h n j m   Bb .. A
//!   high octave  w 3 e 4 r t 6 y 7 u 8 i   Bb2 .. A2
//!   top          o                         Bb3

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use toneboard::notes;

const LOW_ROW: &str = "zsxdcvgbhnjm";
const HIGH_ROW: &str = "w3e4rt6y7u8io";

/// Computer key bound to each table note, in table order.
fn key_map() -> impl Iterator<Item = char> {
    LOW_ROW.chars().chain(HIGH_ROW.chars())
}

pub fn note_for_key(key: char) -> Option<&'static str> {
    let key = key.to_ascii_lowercase();
    key_map()
        .position(|k| k == key)
        .and_then(|index| notes::all().get(index))
        .map(|note| note.name)
}

/// Render both key rows; `is_active` decides highlighting.
pub fn render_keys(frame: &mut Frame, area: Rect, is_active: impl Fn(&str) -> bool) {
    let key_span = |key: char, name: &'static str| {
        let style = if is_active(name) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        Span::styled(format!(" {key}:{name:<3} "), style)
    };

    let bindings: Vec<(char, &'static str)> = key_map()
        .zip(notes::all().iter().map(|note| note.name))
        .collect();
    let (low, high) = bindings.split_at(LOW_ROW.len().min(bindings.len()));

    let lines = vec![
        Line::from(low.iter().map(|&(k, n)| key_span(k, n)).collect::<Vec<_>>()),
        Line::from(""),
        Line::from(high.iter().map(|&(k, n)| key_span(k, n)).collect::<Vec<_>>()),
    ];

    let keys = Paragraph::new(lines).block(Block::default().title(" Keys ").borders(Borders::ALL));
    frame.render_widget(keys, area);
}
