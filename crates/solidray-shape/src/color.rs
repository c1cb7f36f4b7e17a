//! Surface color capability.
//!
//! Shapes are generic over an opaque color tag `C`; the renderer only needs
//! to turn it into linear RGB when shading a hit.

use serde::{Deserialize, Serialize};

/// Linear RGB color with components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    /// Create a color from components.
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Componentwise scale.
    pub fn scale(self, s: f64) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    /// Componentwise product.
    pub fn modulate(self, o: Rgb) -> Self {
        Self::new(self.r * o.r, self.g * o.g, self.b * o.b)
    }

    /// Componentwise sum.
    pub fn add(self, o: Rgb) -> Self {
        Self::new(self.r + o.r, self.g + o.g, self.b + o.b)
    }

    /// Clamp every component to `[0, 1]`; NaN becomes 0.
    pub fn clamped(self) -> Self {
        let c = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(c(self.r), c(self.g), c(self.b))
    }

    /// Quantize to 8-bit channels.
    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        let q = |v: f64| (v * 255.0 + 0.5) as u8;
        [q(c.r), q(c.g), q(c.b)]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Anything that can be rendered as a surface color.
pub trait Color {
    /// Linear RGB of this color.
    fn convert(&self) -> Rgb;
}

impl Color for Rgb {
    fn convert(&self) -> Rgb {
        *self
    }
}

impl Color for [f64; 3] {
    fn convert(&self) -> Rgb {
        Rgb::new(self[0], self[1], self[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(Rgb::WHITE.to_rgb8(), [255, 255, 255]);
        assert_eq!(Rgb::new(-1.0, 0.5, f64::NAN).to_rgb8(), [0, 128, 0]);
    }

    #[test]
    fn test_array_color() {
        assert_eq!([0.1, 0.2, 0.3].convert(), Rgb::new(0.1, 0.2, 0.3));
    }
}
