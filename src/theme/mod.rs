// Theme module - color palette and classification styling
//
// Node fill colors come from the address itself (see topology::color); the
// palette here covers chrome, edge classes and status indicators.

use crate::topology::{EdgeView, NodeKind};
use ratatui::style::Color;

/// Primary accent color - borders, titles
pub const ACCENT: Color = Color::Rgb(122, 162, 247);

/// Broadcast edges, warnings
pub const BROADCAST_RGB: (u8, u8, u8) = (255, 158, 100);
pub const BROADCAST_ORANGE: Color = Color::Rgb(BROADCAST_RGB.0, BROADCAST_RGB.1, BROADCAST_RGB.2);

/// Multicast edges
pub const MULTICAST_RGB: (u8, u8, u8) = (187, 154, 247);
pub const MULTICAST_MAGENTA: Color = Color::Rgb(MULTICAST_RGB.0, MULTICAST_RGB.1, MULTICAST_RGB.2);

/// Errors
pub const ALERT_RED: Color = Color::Rgb(247, 118, 142);

/// Live capture, ON indicators
pub const LIVE_GREEN: Color = Color::Rgb(158, 206, 106);

/// General text, inactive indicators
pub const TEXT_MUTED: Color = Color::Rgb(169, 177, 214);

/// Plain unknown-intermediates edges
pub const EDGE_DEFAULT: (u8, u8, u8) = (125, 207, 255);

/// Map background, edges fade toward it
pub const BACKGROUND: (u8, u8, u8) = (26, 27, 38);

/// Selection highlight background
pub const SELECTION_BG: Color = Color::Rgb(47, 51, 77);

/// Interpolate between two RGB colors based on a ratio (0.0 ~ 1.0)
pub fn interpolate_color(color1: (u8, u8, u8), color2: (u8, u8, u8), ratio: f32) -> Color {
    let ratio = ratio.clamp(0.0, 1.0);
    let r = (color1.0 as f32 + (color2.0 as f32 - color1.0 as f32) * ratio) as u8;
    let g = (color1.1 as f32 + (color2.1 as f32 - color1.1 as f32) * ratio) as u8;
    let b = (color1.2 as f32 + (color2.2 as f32 - color1.2 as f32) * ratio) as u8;
    Color::Rgb(r, g, b)
}

/// Base color for an edge's classification; broadcast wins over multicast
pub fn edge_base_color(edge: &EdgeView) -> (u8, u8, u8) {
    if edge.is_broadcast {
        BROADCAST_RGB
    } else if edge.is_multicast {
        MULTICAST_RGB
    } else {
        EDGE_DEFAULT
    }
}

/// Edge color faded toward the background as its TTL runs out
pub fn edge_color(edge: &EdgeView) -> Color {
    interpolate_color(
        edge_base_color(edge),
        BACKGROUND,
        1.0 - edge.remaining as f32,
    )
}

/// Marker drawn for a node
pub fn kind_glyph(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Local => "◉",
        NodeKind::Private => "●",
        NodeKind::PublicV4 => "◆",
        NodeKind::PublicV6 => "◇",
    }
}

/// Human readable classification
pub fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Local => "This device",
        NodeKind::Private => "LAN",
        NodeKind::PublicV4 => "WAN",
        NodeKind::PublicV6 => "WAN (IPv6)",
    }
}

/// Get color for refresh interval based on its value relative to default
///
/// Green at or above the default, orange when faster, red when more than
/// twice as fast. A recent change brightens the color by 20%.
pub fn refresh_color(interval_ms: u64, default_ms: u64, recently_changed: bool) -> Color {
    let base_color = if interval_ms >= default_ms {
        LIVE_GREEN
    } else if (default_ms - interval_ms) as f32 / default_ms as f32 > 0.5 {
        ALERT_RED
    } else {
        BROADCAST_ORANGE
    };

    if !recently_changed {
        return base_color;
    }
    match base_color {
        Color::Rgb(r, g, b) => Color::Rgb(
            ((r as f32 * 1.2).min(255.0)) as u8,
            ((g as f32 * 1.2).min(255.0)) as u8,
            ((b as f32 * 1.2).min(255.0)) as u8,
        ),
        _ => base_color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::Address;
    use crate::topology::EdgeId;
    use std::time::Duration;

    fn edge(is_broadcast: bool, is_multicast: bool, remaining: f64) -> EdgeView {
        let a = Address::parse("10.0.0.5").unwrap();
        EdgeView {
            id: EdgeId(0),
            from: a,
            to: a,
            from_percent: (0.0, 0.0),
            to_percent: (0.0, 0.0),
            tags: Vec::new(),
            ttl: Duration::from_secs(10),
            remaining,
            is_broadcast,
            is_multicast,
        }
    }

    #[test]
    fn test_interpolate_color_endpoints() {
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 0.0), Color::Rgb(0, 0, 0));
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 1.0), Color::Rgb(200, 100, 50));
        assert_eq!(interpolate_color((0, 0, 0), (200, 100, 50), 2.0), Color::Rgb(200, 100, 50));
    }

    #[test]
    fn test_edge_color_by_class() {
        assert_eq!(edge_base_color(&edge(true, true, 1.0)), BROADCAST_RGB);
        assert_eq!(edge_base_color(&edge(false, true, 1.0)), MULTICAST_RGB);
        assert_eq!(edge_base_color(&edge(false, false, 1.0)), EDGE_DEFAULT);
    }

    #[test]
    fn test_edge_palette_matches_chrome_colors() {
        let (r, g, b) = edge_base_color(&edge(true, false, 1.0));
        assert_eq!(Color::Rgb(r, g, b), BROADCAST_ORANGE);
        let (r, g, b) = edge_base_color(&edge(false, true, 1.0));
        assert_eq!(Color::Rgb(r, g, b), MULTICAST_MAGENTA);
    }

    #[test]
    fn test_edge_fades_to_background() {
        let (r, g, b) = EDGE_DEFAULT;
        assert_eq!(edge_color(&edge(false, false, 1.0)), Color::Rgb(r, g, b));
        let (r, g, b) = BACKGROUND;
        assert_eq!(edge_color(&edge(false, false, 0.0)), Color::Rgb(r, g, b));
    }

    #[test]
    fn test_refresh_color() {
        assert_eq!(refresh_color(200, 200, false), LIVE_GREEN);
        assert_eq!(refresh_color(500, 200, false), LIVE_GREEN);
        assert_eq!(refresh_color(150, 200, false), BROADCAST_ORANGE);
        assert_eq!(refresh_color(50, 200, false), ALERT_RED);
        assert_ne!(refresh_color(200, 200, true), LIVE_GREEN);
    }
}
