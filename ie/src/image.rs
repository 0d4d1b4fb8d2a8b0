//! Image primitives and utilities.
//!
//! Screen captures are held in a lightweight owned RGB image (`OwnedImage`).
//! Pipeline stages borrow views (`Image<'a>`) into it instead of copying
//! pixels, and produce a fresh owned buffer as their output, so the captured
//! frame is never mutated by later stages and can still be written out as a
//! debug artifact after the scan.

use anyhow::{Context, Result};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Build an `OwnedImage` from RGBA bytes (alpha is discarded).
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: usize, bytes: &[u8]) -> Self {
        let height = bytes.len() / width.max(1) / 4;
        let data = bytes
            .chunks_exact(4)
            .take(width * height)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Self {
            width: width as u32,
            height: height as u32,
            data,
        }
    }

    /// A `width` x `height` image where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color; (width * height) as usize],
        }
    }

    /// Paint an axis-aligned rectangle, clipped to the image bounds.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color) {
        let x2 = x.saturating_add(width).min(self.width);
        let y2 = y.saturating_add(height).min(self.height);
        for py in y.min(y2)..y2 {
            let row = (py * self.width) as usize;
            for px in x.min(x2)..x2 {
                self.data[row + px as usize] = color;
            }
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize this image to the given height (preserving aspect ratio).
    ///
    /// Uses `fast_image_resize` (SIMD-optimized) and keeps output in `Vec<Color>`.
    pub fn resize_h(&mut self, height: u32) -> Result<()> {
        if self.height == height || self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let height = height.max(1);
        let width = ((self.width as u64 * height as u64 / self.height as u64) as u32).max(1);

        // SAFETY: `Color` is `#[repr(C)]` with 3 x `u8`, so it is layout-compatible
        // with `fast_image_resize::pixels::U8x3` (alignment 1).
        let src_pixels = unsafe {
            std::slice::from_raw_parts(
                self.data.as_ptr() as *const fast_image_resize::pixels::U8x3,
                self.data.len(),
            )
        };

        let src = fast_image_resize::images::ImageRef::from_pixels(self.width, self.height, src_pixels)
            .context("wrap source pixels for resize")?;
        let mut dst = fast_image_resize::images::Image::new(width, height, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );
        resizer
            .resize(&src, &mut dst, &Some(options))
            .context("resize image")?;

        self.data = dst
            .into_vec()
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
            .collect();
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image(&self) -> Image<'_> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Create an RGB `OwnedImage` from a grayscale image (each pixel repeated into RGB).
    #[cfg(test)]
    pub(crate) fn from_gray_as_rgb(gray: &image::GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        let data = gray
            .pixels()
            .map(|p| Color::new(p.0[0], p.0[0], p.0[0]))
            .collect();
        Self { width, height, data }
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Pixel at view-relative coordinates.
    #[inline(always)]
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.data[(self.x1 + x + (self.y1 + y) * self.true_width) as usize]
    }

    /// Row `y` of the view as a contiguous slice.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [Color] {
        let start = (self.x1 + (self.y1 + y) * self.true_width) as usize;
        &self.data[start..start + self.width() as usize]
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in 0..self.height() {
            for x in 0..self.width() {
                data.push(self.get(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    /// Tightly packed RGB bytes of the view.
    pub fn get_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width() * self.height() * 3) as usize);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let clr = self.get(x, y);
                bytes.extend_from_slice(&[clr.r, clr.g, clr.b]);
            }
        }
        bytes
    }

    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let img = image::RgbImage::from_raw(self.width(), self.height(), self.get_bytes())
            .context("RgbImage::from_raw failed")?;
        img.save_with_format(path, image::ImageFormat::Png)
            .context("save png")?;
        Ok(())
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width(), self.height(), |x, y| {
            image::Luma([self.get(x, y).luma()])
        })
    }

    /// Gets a subimage with the same width and provided height aligned to the top with the bottom side trimmed.
    pub fn trimmed_top(&self, height: u32) -> Self {
        let size = height.min(self.height());

        Self {
            y2: self.y1 + size,
            ..*self
        }
    }

    /// Gets a subimage with the same height, `amount` pixels removed from both the left and right edge.
    pub fn trimmed_sides(&self, amount: u32) -> Self {
        let amount = amount.min(self.width() / 2);

        Self {
            x1: self.x1 + amount,
            x2: self.x2 - amount,
            ..*self
        }
    }

    /// Create an arbitrary subimage (relative coordinates), clamped to this view.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            ..*self
        }
    }

    pub fn average_color(&self) -> Color {
        let count = (self.width() * self.height()) as u64;
        if count == 0 {
            return Color::BLACK;
        }

        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let clr = self.get(x, y);
                r += clr.r as u64;
                g += clr.g as u64;
                b += clr.b as u64;
            }
        }

        Color::new((r / count) as u8, (g / count) as u8, (b / count) as u8)
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// True if every channel differs from `other` by at most `tolerance`.
    #[inline]
    pub fn within(&self, other: Color, tolerance: u8) -> bool {
        self.r.abs_diff(other.r) <= tolerance
            && self.g.abs_diff(other.g) <= tolerance
            && self.b.abs_diff(other.b) <= tolerance
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}
