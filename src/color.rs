//! Color values for the render material.

use serde::{Deserialize, Serialize};

/// HSL color, every component in `[0, 1]` (hue is a fraction of a turn).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// RGB color, every component in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: h.rem_euclid(1.0),
            s: s.clamp(0.0, 1.0),
            l: l.clamp(0.0, 1.0),
        }
    }

    /// Convert to RGB.
    pub fn to_rgb(&self) -> Rgb {
        if self.s == 0.0 {
            return Rgb::gray(self.l);
        }

        let q = if self.l <= 0.5 {
            self.l * (1.0 + self.s)
        } else {
            self.l + self.s - self.l * self.s
        };
        let p = 2.0 * self.l - q;

        Rgb {
            r: hue_channel(p, q, self.h + 1.0 / 3.0),
            g: hue_channel(p, q, self.h),
            b: hue_channel(p, q, self.h - 1.0 / 3.0),
        }
    }
}

fn hue_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

impl Rgb {
    pub fn gray(v: f64) -> Self {
        let v = v.clamp(0.0, 1.0);
        Self { r: v, g: v, b: v }
    }

    /// `#rrggbb` hex string.
    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_primaries() {
        assert_eq!(Hsl::new(0.0, 1.0, 0.5).to_rgb().to_hex(), "#ff0000");
        assert_eq!(Hsl::new(1.0 / 3.0, 1.0, 0.5).to_rgb().to_hex(), "#00ff00");
        assert_eq!(Hsl::new(2.0 / 3.0, 1.0, 0.5).to_rgb().to_hex(), "#0000ff");
    }

    #[test]
    fn test_grayscale() {
        let rgb = Hsl::new(0.4, 0.0, 0.25).to_rgb();
        assert_eq!(rgb, Rgb::gray(0.25));
    }

    #[test]
    fn test_hue_wraps() {
        let a = Hsl::new(1.25, 0.8, 0.5).to_rgb();
        let b = Hsl::new(0.25, 0.8, 0.5).to_rgb();
        assert_abs_diff_eq!(a.r, b.r, epsilon = 1e-12);
        assert_abs_diff_eq!(a.g, b.g, epsilon = 1e-12);
        assert_abs_diff_eq!(a.b, b.b, epsilon = 1e-12);
    }

    #[test]
    fn test_components_bounded() {
        for i in 0..=20 {
            let h = i as f64 / 20.0;
            let rgb = Hsl::new(h, 0.8, 0.65).to_rgb();
            for c in [rgb.r, rgb.g, rgb.b] {
                assert!((0.0..=1.0).contains(&c), "{c} out of range at hue {h}");
            }
        }
    }
}
