// UI rendering module
//
// This module contains all UI rendering components for hopmap.
// The main draw() function orchestrates rendering of all UI panels.

mod banner;
mod inspector;
mod map;
mod packet_log;
mod status_bar;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use banner::render_banner;
use inspector::render_node_inspector;
use map::render_network_map;
use packet_log::render_packet_log;
use status_bar::render_status_bar;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let size = f.area();

    // Main layout: banner, body, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Banner
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Status bar
        ])
        .split(size);

    render_banner(f, chunks[0], app);

    // Body: network map + right panels
    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(65), // Network map
            Constraint::Percentage(35), // Right panels
        ])
        .split(chunks[1]);

    render_network_map(f, body_chunks[0], app);

    // Right side: inspector + packet log
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(60), // Inspector
            Constraint::Percentage(40), // Packet log
        ])
        .split(body_chunks[1]);

    render_node_inspector(f, right_chunks[0], app);
    render_packet_log(f, right_chunks[1], app);

    render_status_bar(f, chunks[2], app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, device, packet, FakeCollaborator};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_draw_full_frame() {
        let (_rt, mut app, _) = app_with(FakeCollaborator {
            devices: vec![device("eth0", "10.0.0.5")],
            script: vec![packet("10.0.0.5", "8.8.8.8"), packet("10.0.0.5", "10.0.0.255")],
            ..Default::default()
        });
        app.select_device("eth0").unwrap();
        app.start_capture();
        app.tick_at(Instant::now());
        app.select_next_node();

        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Network Map"));
        assert!(text.contains("Inspector"));
        assert!(text.contains("Packets (2 seen, 0 dropped)"));
        assert!(text.contains("NODE:"));
    }

    #[test]
    fn test_draw_empty_session() {
        let (_rt, mut app, _) = app_with(FakeCollaborator::default());
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("No capture device selected"));
    }
}
