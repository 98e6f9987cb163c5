// Network map rendering module
//
// Draws the topology session on a Braille canvas: edges first, faded by
// remaining TTL, then particles, then node glyphs and labels on top.
// Canvas space is [0, 100] on both axes with y pointing up, so map
// percentages (y pointing down) are flipped on the way in.

use crate::app::AppState;
use crate::theme::{edge_color, kind_glyph, ACCENT, TEXT_MUTED};
use crate::topology::{NodeView, Viewport};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};
use std::time::Instant;

/// Symbol for particles travelling along edges
pub const PARTICLE_SYMBOL: &str = "•";

/// Particle offsets along an edge
const PARTICLE_OFFSETS: [f32; 2] = [0.0, 0.5];

/// Above this many edges only one particle is drawn per edge
const PARTICLE_REDUCTION_THRESHOLD: usize = 40;

/// Map percentages → canvas coordinates
pub fn to_canvas(percent: (f64, f64)) -> (f64, f64) {
    (percent.0, 100.0 - percent.1)
}

/// Position of a particle along an edge at the current animation phase
pub fn particle_position(start: (f64, f64), end: (f64, f64), pulse_phase: f32, offset: f32) -> (f64, f64) {
    let t = ((pulse_phase + offset) % 1.0) as f64;
    (
        start.0 + (end.0 - start.0) * t,
        start.1 + (end.1 - start.1) * t,
    )
}

/// Text drawn beside a node, if any
///
/// A resolved domain label is always shown; the bare address only while
/// address labels are on.
pub fn node_label(node: &NodeView, address_labels: bool) -> Option<String> {
    match &node.label {
        Some(label) => Some(label.clone()),
        None if address_labels => Some(node.address.to_string()),
        None => None,
    }
}

pub fn render_network_map(f: &mut Frame, area: Rect, app: &mut AppState) {
    // Split: summary line + canvas
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(area);

    // Jitter is bounded by glyph size relative to the drawable area
    app.topology.set_viewport(Viewport {
        node_width: 1.0,
        node_height: 1.0,
        canvas_width: f64::from(chunks[1].width.saturating_sub(2)),
        canvas_height: f64::from(chunks[1].height.saturating_sub(1)),
    });

    let now = Instant::now();
    let nodes = app.topology.node_views();
    let edges = app.topology.edge_views(now);
    let device_name = app
        .current_device()
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "none".to_string());

    let summary = Paragraph::new(Line::from(vec![
        Span::styled(" ◈ ", Style::default().fg(ACCENT)),
        Span::styled(
            format!(
                "Hosts: {} | Edges: {} | Device: {}",
                nodes.len(),
                edges.len(),
                device_name
            ),
            Style::default().fg(TEXT_MUTED),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(ACCENT))
            .title(Span::styled(
                "━ Network Map ━",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(summary, chunks[0]);

    let animations_enabled = app.map_settings.animations_enabled;
    let address_labels = app.map_settings.address_labels_enabled;
    let pulse_phase = app.pulse_phase;
    let empty_message = if app.current_device().is_none() {
        "No capture device selected (press d)"
    } else if app.capturing {
        "Waiting for packets..."
    } else {
        "Capture stopped (press c)"
    };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT)),
        )
        .marker(Marker::Braille)
        .x_bounds([0.0, 100.0])
        .y_bounds([0.0, 100.0])
        .paint(move |ctx| {
            for edge in &edges {
                let (x1, y1) = to_canvas(edge.from_percent);
                let (x2, y2) = to_canvas(edge.to_percent);
                ctx.draw(&CanvasLine {
                    x1,
                    y1,
                    x2,
                    y2,
                    color: edge_color(edge),
                });
            }

            if animations_enabled {
                let offsets: &[f32] = if edges.len() > PARTICLE_REDUCTION_THRESHOLD {
                    &PARTICLE_OFFSETS[..1]
                } else {
                    &PARTICLE_OFFSETS
                };
                for edge in &edges {
                    let start = to_canvas(edge.from_percent);
                    let end = to_canvas(edge.to_percent);
                    for &offset in offsets {
                        let (px, py) = particle_position(start, end, pulse_phase, offset);
                        ctx.print(
                            px,
                            py,
                            Span::styled(PARTICLE_SYMBOL, Style::default().fg(edge_color(edge))),
                        );
                    }
                }
            }

            // Nodes on a separate layer so lines never overdraw them
            ctx.layer();
            for node in &nodes {
                let (x, y) = to_canvas((node.x_percent, node.y_percent));
                let (r, g, b) = node.rgb;
                let mut style = Style::default().fg(Color::Rgb(r, g, b));
                if node.selected {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(x, y, Span::styled(kind_glyph(node.kind), style));

                if let Some(label) = node_label(node, address_labels) {
                    ctx.print(x + 1.5, y, Span::styled(label, Style::default().fg(TEXT_MUTED)));
                }
            }

            if nodes.is_empty() {
                let offset = (empty_message.len() as f64 / 2.0) * 1.2;
                ctx.print(
                    50.0 - offset,
                    50.0,
                    Span::styled(
                        empty_message,
                        Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
                    ),
                );
            }
        });

    f.render_widget(canvas, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Address;
    use crate::topology::NodeKind;

    fn view(label: Option<&str>) -> NodeView {
        NodeView {
            address: Address::parse("93.184.216.34").unwrap(),
            x_percent: 10.0,
            y_percent: 20.0,
            rgb: (1, 2, 3),
            kind: NodeKind::PublicV4,
            tags: vec!["wan"],
            label: label.map(str::to_string),
            selected: false,
        }
    }

    #[test]
    fn test_to_canvas_flips_y() {
        assert_eq!(to_canvas((10.0, 20.0)), (10.0, 80.0));
        assert_eq!(to_canvas((0.0, 0.0)), (0.0, 100.0));
    }

    #[test]
    fn test_particle_position() {
        assert_eq!(particle_position((0.0, 0.0), (10.0, 20.0), 0.0, 0.0), (0.0, 0.0));
        assert_eq!(particle_position((0.0, 0.0), (10.0, 20.0), 0.25, 0.25), (5.0, 10.0));
        // wraps past the end
        assert_eq!(particle_position((0.0, 0.0), (10.0, 20.0), 0.75, 0.5), (2.5, 5.0));
    }

    #[test]
    fn test_node_label_choice() {
        assert_eq!(
            node_label(&view(Some("example.com (93.184.216.34)")), false).as_deref(),
            Some("example.com (93.184.216.34)")
        );
        assert_eq!(node_label(&view(None), true).as_deref(), Some("93.184.216.34"));
        assert_eq!(node_label(&view(None), false), None);
    }
}
