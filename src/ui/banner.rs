// Banner rendering module
//
// Renders the top banner with the logo and session stats.

use crate::app::AppState;
use crate::theme::{ACCENT, ALERT_RED, LIVE_GREEN, TEXT_MUTED};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn render_banner(f: &mut Frame, area: Rect, app: &AppState) {
    let (capture_text, capture_color) = if app.capturing {
        ("● LIVE", LIVE_GREEN)
    } else {
        ("○ IDLE", TEXT_MUTED)
    };
    let stats_text = format!(
        "   [Hosts: {}] [Edges: {}] [Domains resolved: {}]",
        app.topology.node_count(),
        app.topology.edge_count(),
        app.topology.domains().resolved_count()
    );

    let banner_text = vec![
        Line::from(vec![Span::styled(
            "  _                                    ",
            Style::default().fg(Color::Rgb(92, 132, 217)).add_modifier(Modifier::BOLD),
        )]),
        Line::from(vec![
            Span::styled(
                " | |__   ___  _ __  _ __ ___   __ _ _ __  ",
                Style::default().fg(Color::Rgb(102, 142, 227)),
            ),
            Span::styled(
                format!("   >>> hopmap v{} <<<", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::Rgb(255, 140, 0)).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                " | '_ \\ / _ \\| '_ \\| '_ ` _ \\ / _` | '_ \\ ",
                Style::default().fg(Color::Rgb(112, 152, 237)),
            ),
            Span::styled(
                "   \"Every packet leaves a trace.\"",
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                " | | | | (_) | |_) | | | | | | (_| | |_) |",
                Style::default().fg(Color::Rgb(122, 162, 247)),
            ),
            Span::styled(
                format!("   {}", capture_text),
                Style::default().fg(capture_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                " |_| |_|\\___/| .__/|_| |_| |_|\\__,_| .__/ ",
                Style::default().fg(Color::Rgb(132, 172, 255)),
            ),
            Span::styled(stats_text, Style::default().fg(ALERT_RED)),
        ]),
        Line::from(vec![Span::styled(
            "              |_|                   |_|    ",
            Style::default().fg(Color::Rgb(142, 182, 255)),
        )]),
    ];

    let banner = Paragraph::new(banner_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(ACCENT)),
        )
        .alignment(Alignment::Left);

    f.render_widget(banner, area);
}
