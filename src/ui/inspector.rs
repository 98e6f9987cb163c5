// Node inspector rendering module
//
// Renders the detail panel for the selected node, the traffic sparkline,
// and the capture device's configured addresses.

use crate::app::AppState;
use crate::net::Device;
use crate::theme::{kind_glyph, kind_name, refresh_color, ACCENT, BROADCAST_ORANGE, LIVE_GREEN, TEXT_MUTED};
use crate::topology::NodeKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Sparkline},
    Frame,
};
use std::time::Instant;

// ============================================================================
// Inspector View Model
// ============================================================================

/// Everything the inspector shows, extracted from AppState
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInspectorView {
    pub has_selection: bool,
    pub address: String,
    pub kind: Option<NodeKind>,
    pub color_hex: String,
    pub rgb: (u8, u8, u8),
    /// Position as canvas percentages
    pub position: (f64, f64),
    pub domain: Option<String>,
    pub tags: Vec<&'static str>,
    /// Live edges with this node at either end
    pub edge_count: usize,
}

impl Default for NodeInspectorView {
    fn default() -> Self {
        Self {
            has_selection: false,
            address: "No node selected".to_string(),
            kind: None,
            color_hex: String::new(),
            rgb: (169, 177, 214),
            position: (0.0, 0.0),
            domain: None,
            tags: Vec::new(),
            edge_count: 0,
        }
    }
}

pub fn build_node_inspector_view(app: &AppState) -> NodeInspectorView {
    let Some(node) = app.topology.selected().and_then(|a| app.topology.node(&a)) else {
        return NodeInspectorView::default();
    };

    NodeInspectorView {
        has_selection: true,
        address: node.address.to_string(),
        kind: Some(node.kind),
        color_hex: node.color.hex(),
        rgb: node.color.as_tuple(),
        position: node.position.as_percent(),
        domain: node.domain.clone(),
        tags: node.tags(),
        edge_count: app.topology.edges_touching(&node.address),
    }
}

fn device_lines(device: Option<&Device>) -> Vec<Line<'static>> {
    let Some(device) = device else {
        return vec![Line::from(Span::styled(
            "  (no device)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))];
    };

    let flags = device.flags.if_flags;
    let mut state = Vec::new();
    if flags.up {
        state.push("up");
    }
    if flags.running {
        state.push("running");
    }
    if flags.loopback {
        state.push("loopback");
    }
    if flags.wireless {
        state.push("wireless");
    }

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("  {}", device.name), Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" [{}]", state.join(" ")), Style::default().fg(TEXT_MUTED)),
    ])];

    for entry in &device.addresses {
        let mut spans = vec![
            Span::raw("  > "),
            Span::styled(entry.addr.to_string(), Style::default().fg(Color::Cyan)),
        ];
        if let Some(broadcast) = entry.broadcast_addr {
            spans.push(Span::styled(
                format!(" bcast {}", broadcast),
                Style::default().fg(BROADCAST_ORANGE),
            ));
        }
        lines.push(Line::from(spans));
    }
    lines
}

pub fn render_node_inspector(f: &mut Frame, area: Rect, app: &AppState) {
    let view = build_node_inspector_view(app);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Node details
            Constraint::Length(5),  // Sparkline
            Constraint::Min(0),     // Device addresses
        ])
        .split(area);

    let recently_changed = app.refresh_config.recently_changed(Instant::now());
    let refresh_fg = refresh_color(app.refresh_config.refresh_ms, 200, recently_changed);
    let refresh_style = if recently_changed {
        Style::default().fg(refresh_fg).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(refresh_fg)
    };

    let (r, g, b) = view.rgb;
    let glyph = view.kind.map(kind_glyph).unwrap_or("○");
    let mut content = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  NODE: "),
            Span::styled(format!("{} ", glyph), Style::default().fg(Color::Rgb(r, g, b))),
            Span::styled(
                view.address.clone(),
                Style::default().fg(BROADCAST_ORANGE).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    if view.has_selection {
        content.push(Line::from(vec![
            Span::raw("  Domain: "),
            Span::styled(
                view.domain.clone().unwrap_or_else(|| "-".to_string()),
                Style::default().fg(Color::Cyan),
            ),
        ]));
        content.push(Line::from(vec![
            Span::raw("  Class: "),
            Span::styled(
                view.kind.map(kind_name).unwrap_or("-"),
                Style::default().fg(LIVE_GREEN),
            ),
            Span::styled(
                format!("  [{}]", view.tags.join("] [")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        content.push(Line::from(vec![
            Span::raw("  Color: "),
            Span::styled(view.color_hex.clone(), Style::default().fg(Color::Rgb(r, g, b))),
            Span::raw(format!("  Pos: {:.1}%, {:.1}%", view.position.0, view.position.1)),
        ]));
        content.push(Line::from(vec![
            Span::raw("  Edges: "),
            Span::styled(view.edge_count.to_string(), Style::default().fg(Color::Cyan)),
        ]));
    } else {
        content.push(Line::from(Span::styled(
            "  ↑/↓ to select a host",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    content.push(Line::from(vec![
        Span::raw("  ⚡ Refresh: "),
        Span::styled(format!("{}ms", app.refresh_config.refresh_ms), refresh_style),
    ]));

    let details = Paragraph::new(content).block(
        Block::default()
            .title(Span::styled(
                "━ Inspector ━",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT)),
    );
    f.render_widget(details, chunks[0]);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Packets / tick ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT)),
        )
        .data(&app.traffic_history)
        .style(Style::default().fg(LIVE_GREEN));
    f.render_widget(sparkline, chunks[1]);

    let device = Paragraph::new(device_lines(app.current_device())).block(
        Block::default()
            .title(Span::styled(
                format!(" Devices ({}) ", app.devices.len()),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT)),
    );
    f.render_widget(device, chunks[2]);
}
