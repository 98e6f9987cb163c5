// Packet log rendering module
//
// Renders the most recent packets, newest at the bottom, colored by the
// class of their destination.

use crate::app::AppState;
use crate::net::{Address, Packet};
use crate::theme::{ALERT_RED, BROADCAST_ORANGE, MULTICAST_MAGENTA, TEXT_MUTED};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

/// Destination class color; malformed packets are flagged red
pub fn packet_color(packet: &Packet) -> Color {
    match (Address::parse(&packet.src), Address::parse(&packet.dst)) {
        (Ok(_), Ok(dst)) if dst.is_multicast() => MULTICAST_MAGENTA,
        (Ok(_), Ok(dst)) if dst.is_broadcast() => BROADCAST_ORANGE,
        (Ok(_), Ok(_)) => TEXT_MUTED,
        _ => ALERT_RED,
    }
}

pub fn render_packet_log(f: &mut Frame, area: Rect, app: &AppState) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = app.packet_log.len().saturating_sub(visible);
    let first_number = app.total_packets.saturating_sub(app.packet_log.len() as u64) + skip as u64;

    let items: Vec<ListItem> = app
        .packet_log
        .iter()
        .skip(skip)
        .enumerate()
        .map(|(i, packet)| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:>5}.", first_number + i as u64 + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!(" {}", packet.summary()), Style::default().fg(packet_color(packet))),
            ]))
        })
        .collect();

    let title = format!(
        "━ Packets ({} seen, {} dropped) ",
        app.total_packets, app.dropped_packets
    );

    let list = List::new(items).block(
        Block::default()
            .title(vec![
                Span::styled(
                    title,
                    Style::default().fg(BROADCAST_ORANGE).add_modifier(Modifier::BOLD),
                ),
                Span::styled("━━━━━━━", Style::default().fg(BROADCAST_ORANGE)),
            ])
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BROADCAST_ORANGE)),
    );

    f.render_widget(list, area);
}
