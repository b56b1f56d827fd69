//! Monochrome bitmaps thresholded from glyph images.

use std::path::Path;

use image::{DynamicImage, LumaA};

use crate::error::{Error, Result};

/// Alpha below which a pixel counts as transparent.
const ALPHA_CUTOFF: u8 = 128;

/// A one-bit raster in image coordinates (origin top-left, y down).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl Bitmap {
    /// A blank bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, ink: vec![false; width as usize * height as usize] }
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut ink = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                ink.push(f(x, y));
            }
        }
        Self { width, height, ink }
    }

    /// Threshold a decoded image.
    ///
    /// A pixel is ink when it is opaque enough and darker than `threshold`.
    pub fn from_image(image: &DynamicImage, threshold: u8) -> Self {
        let gray = image.to_luma_alpha8();
        Self::from_fn(gray.width(), gray.height(), |x, y| {
            let LumaA([luma, alpha]) = *gray.get_pixel(x, y);
            alpha >= ALPHA_CUTOFF && luma < threshold
        })
    }

    /// Open and threshold an image file.
    pub fn open(path: &Path, threshold: u8) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| Error::LoadImage { path: path.to_path_buf(), source: e })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyImage {
                path: path.to_path_buf(),
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self::from_image(&image, threshold))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at `(x, y)` is ink. Anything outside the bitmap is blank.
    pub fn ink_at(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.ink[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if x < self.width && y < self.height {
            self.ink[y as usize * self.width as usize + x as usize] = ink;
        }
    }

    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&ink| ink).count()
    }

    pub fn is_blank(&self) -> bool {
        !self.ink.contains(&true)
    }
}
