// Status Bar rendering module
//
// Renders the bottom status bar with keyboard shortcuts, toggle indicators
// and the latest capture error or status message.

use crate::app::AppState;
use crate::theme::{ACCENT, ALERT_RED, LIVE_GREEN, TEXT_MUTED};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
    color: Color,
}

const HINTS: [Hint; 8] = [
    Hint { priority: 1, key: "Q:", desc: "Quit | ", color: Color::Red },
    Hint { priority: 1, key: "C:", desc: "Capture | ", color: ACCENT },
    Hint { priority: 1, key: "D:", desc: "Device | ", color: ACCENT },
    Hint { priority: 1, key: "↑↓:", desc: "Select | ", color: ACCENT },
    Hint { priority: 2, key: "N:", desc: "Domains | ", color: ACCENT },
    Hint { priority: 2, key: "X:", desc: "Clear | ", color: ACCENT },
    Hint { priority: 3, key: "+/-:", desc: "Speed | ", color: ACCENT },
    Hint { priority: 3, key: "G:", desc: "Rescan | ", color: ACCENT },
];

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let available_width = area.width.saturating_sub(4) as usize;

    let mut spans = vec![Span::styled(" ◈ ", Style::default().fg(ACCENT))];
    let mut current_length = 3;

    // Process hints by priority until we run out of space
    for priority in 1..=3 {
        for hint in HINTS.iter().filter(|h| h.priority == priority) {
            let hint_length = hint.key.chars().count() + hint.desc.len();
            if current_length + hint_length <= available_width {
                spans.push(Span::styled(
                    hint.key,
                    Style::default().fg(hint.color).add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(hint.desc));
                current_length += hint_length;
            }
        }
    }

    spans.push(Span::raw(" "));
    spans.extend(build_toggle_indicators(app));

    if let Some(error) = &app.capture_error {
        spans.push(Span::styled(
            format!(" ✗ {}", error),
            Style::default().fg(ALERT_RED).add_modifier(Modifier::BOLD),
        ));
    } else if let Some(message) = &app.status_message {
        spans.push(Span::styled(format!(" {}", message), Style::default().fg(TEXT_MUTED)));
    }

    let status_bar = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(ACCENT)),
        )
        .alignment(Alignment::Left);

    f.render_widget(status_bar, area);
}

fn toggle_spans(key: &'static str, on: bool) -> [Span<'static>; 3] {
    let (state, color) = if on { ("ON", LIVE_GREEN) } else { ("OFF", TEXT_MUTED) };
    [
        Span::styled(key, Style::default().fg(TEXT_MUTED)),
        Span::styled(state, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("] ", Style::default().fg(TEXT_MUTED)),
    ]
}

/// Toggle indicators: [A:ON/OFF] [t:ON/OFF] [n:ON/OFF]
pub fn build_toggle_indicators(app: &AppState) -> Vec<Span<'static>> {
    let settings = &app.map_settings;
    let mut spans = Vec::with_capacity(9);
    spans.extend(toggle_spans("[A:", settings.animations_enabled));
    spans.extend(toggle_spans("[t:", settings.address_labels_enabled));
    spans.extend(toggle_spans("[n:", settings.domain_labels_enabled));
    spans
}
