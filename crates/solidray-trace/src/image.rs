//! RGBA raster output.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// One RGBA pixel.
pub type Rgba = [u8; 4];

/// Largest accepted pixel count.
const MAX_PIXELS: usize = 1 << 28;

/// A `width × height` RGBA image stored row by row from the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Transparent black image.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        match width.checked_mul(height) {
            Some(n) if n > 0 && n <= MAX_PIXELS => Ok(Self {
                width,
                height,
                pixels: vec![[0; 4]; n],
            }),
            _ => Err(TraceError::ImageSize { width, height }),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at column `i`, row `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<Rgba> {
        (i < self.width && j < self.height).then(|| self.pixels[j * self.width + i])
    }

    /// Overwrite one pixel; out-of-range writes are ignored.
    pub fn set(&mut self, i: usize, j: usize, color: Rgba) {
        if i < self.width && j < self.height {
            self.pixels[j * self.width + i] = color;
        }
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Copy a rendered tile into place, clipping to the image.
    pub fn blit(&mut self, tile: &Tile) {
        for (dj, row) in tile.pixels.chunks(tile.width.max(1)).enumerate() {
            for (di, &px) in row.iter().enumerate() {
                self.set(tile.i0 + di, tile.j0 + dj, px);
            }
        }
    }

    /// Number of pixels that differ from `other`; images of different size
    /// differ everywhere.
    pub fn diff_count(&self, other: &Image) -> usize {
        if self.width != other.width || self.height != other.height {
            return self.pixels.len().max(other.pixels.len());
        }
        self.pixels.iter().zip(&other.pixels).filter(|(a, b)| a != b).count()
    }

    /// Binary PPM (P6) encoding, dropping alpha.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.pixels.len() * 3);
        for p in &self.pixels {
            out.extend_from_slice(&p[..3]);
        }
        out
    }
}

/// A rectangle of rendered pixels, produced by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    /// Left column.
    pub i0: usize,
    /// Top row.
    pub j0: usize,
    /// Width in pixels.
    pub width: usize,
    /// Row-major pixels, `width` per row.
    pub pixels: Vec<Rgba>,
}

impl Tile {
    /// Empty tile anchored at `(i0, j0)`.
    pub fn new(i0: usize, j0: usize, width: usize, height: usize) -> Self {
        Self {
            i0,
            j0,
            width,
            pixels: Vec::with_capacity(width * height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_sizes() {
        assert!(Image::new(0, 5).is_err());
        assert!(Image::new(usize::MAX, 2).is_err());
        let img = Image::new(3, 2).unwrap();
        assert_eq!(img.pixels().len(), 6);
        assert_eq!(img.get(2, 1), Some([0; 4]));
        assert_eq!(img.get(3, 0), None);
    }

    #[test]
    fn test_blit_clips() {
        let mut img = Image::new(4, 3).unwrap();
        let mut tile = Tile::new(2, 1, 3, 2);
        tile.pixels.extend((0..6u8).map(|k| [k, 0, 0, 255]));
        img.blit(&tile);
        assert_eq!(img.get(2, 1), Some([0, 0, 0, 255]));
        assert_eq!(img.get(3, 1), Some([1, 0, 0, 255]));
        assert_eq!(img.get(3, 2), Some([4, 0, 0, 255]));
        assert_eq!(img.get(1, 1), Some([0; 4]));
    }

    #[test]
    fn test_diff_and_ppm() {
        let a = Image::new(2, 2).unwrap();
        let mut b = a.clone();
        b.set(1, 1, [9, 9, 9, 255]);
        assert_eq!(a.diff_count(&b), 1);
        assert_eq!(a.diff_count(&Image::new(1, 1).unwrap()), 4);

        let ppm = b.to_ppm();
        assert!(ppm.starts_with(b"P6\n2 2\n255\n"));
        assert_eq!(&ppm[ppm.len() - 3..], &[9, 9, 9]);
    }
}
