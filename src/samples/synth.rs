//! Synthetic placeholder images for when no stock images are available.

use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use rand::RngCore;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelKind {
    Rgb,
    Gray,
}

/// A solid block painted over the noise. Ranges are (row, column) pixel spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rect {
    pub rows: Range<u32>,
    pub cols: Range<u32>,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub size: u32,
    pub kind: PixelKind,
    pub rect: Option<Rect>,
}

impl Placeholder {
    pub const fn rgb(size: u32) -> Self {
        Self {
            size,
            kind: PixelKind::Rgb,
            rect: None,
        }
    }

    pub const fn gray(size: u32) -> Self {
        Self {
            size,
            kind: PixelKind::Gray,
            rect: None,
        }
    }

    pub const fn with_rect(mut self, rows: Range<u32>, cols: Range<u32>, color: [u8; 3]) -> Self {
        self.rect = Some(Rect { rows, cols, color });
        self
    }

    /// Uniform noise of `size`×`size`, with the rectangle painted on top.
    pub fn render<R: RngCore + ?Sized>(&self, rng: &mut R) -> DynamicImage {
        let n = self.size as usize;
        match self.kind {
            PixelKind::Gray => {
                let mut px = vec![0u8; n * n];
                rng.fill_bytes(&mut px);
                let mut img = GrayImage::from_raw(self.size, self.size, px)
                    .unwrap_or_else(|| GrayImage::new(self.size, self.size));
                if let Some(rect) = &self.rect {
                    let luma = rect.color.iter().map(|&c| c as u32).sum::<u32>() / 3;
                    for (x, y) in rect_pixels(rect, self.size) {
                        img.put_pixel(x, y, image::Luma([luma as u8]));
                    }
                }
                DynamicImage::ImageLuma8(img)
            }
            PixelKind::Rgb => {
                let mut px = vec![0u8; n * n * 3];
                rng.fill_bytes(&mut px);
                let mut img = RgbImage::from_raw(self.size, self.size, px)
                    .unwrap_or_else(|| RgbImage::new(self.size, self.size));
                if let Some(rect) = &self.rect {
                    for (x, y) in rect_pixels(rect, self.size) {
                        img.put_pixel(x, y, Rgb(rect.color));
                    }
                }
                DynamicImage::ImageRgb8(img)
            }
        }
    }
}

/// (x, y) coordinates covered by `rect`, clipped to a `size`×`size` image.
fn rect_pixels(rect: &Rect, size: u32) -> impl Iterator<Item = (u32, u32)> {
    let rows = rect.rows.start.min(size)..rect.rows.end.min(size);
    let cols = rect.cols.start.min(size)..rect.cols.end.min(size);
    rows.flat_map(move |y| cols.clone().map(move |x| (x, y)))
}
