// Per-host colors derived from address bytes

use crate::net::Address;
use std::net::IpAddr;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn as_tuple(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Deterministic color for an address
///
/// IPv4: hue (o0+o1)/512, saturation o3/512+0.5, value o2/512+0.5.
/// IPv6: bytes 0-4, 5-9 and 10-15 averaged and normalized into H, S, V.
pub fn address_color(address: &Address) -> Rgb {
    match address.ip() {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            hsv_to_rgb(
                (f64::from(o[0]) + f64::from(o[1])) / 512.0,
                f64::from(o[3]) / 512.0 + 0.5,
                f64::from(o[2]) / 512.0 + 0.5,
            )
        }
        IpAddr::V6(v6) => {
            let o = v6.octets();
            hsv_to_rgb(
                normalized_mean(&o[0..5]),
                normalized_mean(&o[5..10]),
                normalized_mean(&o[10..16]),
            )
        }
    }
}

fn normalized_mean(bytes: &[u8]) -> f64 {
    let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
    f64::from(sum) / (256.0 * bytes.len() as f64)
}

/// Sector-based HSV → RGB, all inputs in [0, 1]
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb {
        r: to_channel(r),
        g: to_channel(g),
        b: to_channel(b),
    }
}

fn to_channel(component: f64) -> u8 {
    (component * 255.0).round().clamp(0.0, 255.0) as u8
}
