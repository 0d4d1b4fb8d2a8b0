//! Tooltip region detection.
//!
//! The tooltip is the largest connected patch of pixels matching the target
//! background color. Labelling is done with `imageproc::region_labelling` on
//! a half-resolution binary mask, then one pass over the label image collects
//! pixel counts and bounding boxes per component.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};

use crate::{ColorTarget, Image};

/// Detector constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct RegionConfig {
	/// Components with fewer pixels than this are treated as noise.
	pub min_area: u32,
	/// Margin added on every side of the winning component's bounding box.
	pub padding: u32,
}

impl Default for RegionConfig {
	fn default() -> Self {
		Self {
			min_area: 50,
			padding: 5,
		}
	}
}

/// Bounding box of the detected tooltip, in frame coordinates.
///
/// `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DetectedBlob {
	pub x1: u32,
	pub y1: u32,
	pub x2: u32,
	pub y2: u32,
}

impl DetectedBlob {
	pub fn width(&self) -> u32 {
		self.x2 - self.x1
	}

	pub fn height(&self) -> u32 {
		self.y2 - self.y1
	}

	/// View of `image` restricted to this box.
	pub fn crop<'a>(&self, image: Image<'a>) -> Image<'a> {
		image.sub_image(self.x1, self.y1, self.width(), self.height())
	}
}

#[derive(Debug, Clone, Copy)]
struct Component {
	area: u64,
	min_x: u32,
	min_y: u32,
	max_x: u32,
	max_y: u32,
}

impl Component {
	const EMPTY: Self = Self {
		area: 0,
		min_x: u32::MAX,
		min_y: u32::MAX,
		max_x: 0,
		max_y: 0,
	};

	#[inline]
	fn add(&mut self, x: u32, y: u32) {
		self.area += 1;
		self.min_x = self.min_x.min(x);
		self.min_y = self.min_y.min(y);
		self.max_x = self.max_x.max(x);
		self.max_y = self.max_y.max(y);
	}
}

/// Binary mask of pixels within tolerance of `target` (255 = on).
pub fn color_mask(image: Image, target: ColorTarget) -> GrayImage {
	let (w, h) = (image.width(), image.height());
	let mut mask = GrayImage::new(w, h);
	if w == 0 || h == 0 {
		return mask;
	}

	for (y, out) in mask.chunks_exact_mut(w as usize).enumerate() {
		for (px, &color) in out.iter_mut().zip(image.row(y as u32)) {
			*px = if target.matches(color) { 255 } else { 0 };
		}
	}
	mask
}

/// Halve `mask` in both directions. A cell is on only when all four of its pixels are.
fn pool(mask: &GrayImage) -> GrayImage {
	let (w, h) = (mask.width() / 2, mask.height() / 2);
	let stride = mask.width() as usize;
	let raw = mask.as_raw();

	let mut out = GrayImage::new(w, h);
	for (y, row) in out.chunks_exact_mut(w as usize).enumerate() {
		let top = &raw[2 * y * stride..];
		let bottom = &raw[(2 * y + 1) * stride..];
		for (x, px) in row.iter_mut().enumerate() {
			*px = top[2 * x] & top[2 * x + 1] & bottom[2 * x] & bottom[2 * x + 1];
		}
	}
	out
}

/// Exact full-resolution bounds of a component found on the pooled mask.
///
/// A pooled cell covers pixels `2c..=2c+1`, so the true edge lies at most one
/// pixel outside the scaled box.
fn refine(mask: &GrayImage, coarse: &Component) -> Component {
	let stride = mask.width() as usize;
	let raw = mask.as_raw();
	let x_lo = (coarse.min_x * 2).saturating_sub(1) as usize;
	let x_hi = (coarse.max_x * 2 + 2).min(mask.width() - 1) as usize;
	let y_lo = (coarse.min_y * 2).saturating_sub(1);
	let y_hi = (coarse.max_y * 2 + 2).min(mask.height() - 1);

	let mut out = Component::EMPTY;
	for y in y_lo..=y_hi {
		let row = &raw[y as usize * stride + x_lo..=y as usize * stride + x_hi];
		let Some(first) = row.iter().position(|&v| v != 0) else {
			continue;
		};
		let last = row.iter().rposition(|&v| v != 0).unwrap_or(first);
		out.add((x_lo + first) as u32, y);
		out.add((x_lo + last) as u32, y);
	}
	out
}

/// Find the largest 4-connected region matching `target`.
///
/// Labelling runs on a 2x pooled mask, so components thinner than two pixels
/// are dropped and `config.min_area` is compared at quarter scale. The winning
/// box is then refined against the full-resolution mask.
///
/// Returns `None` when no component reaches `config.min_area`. When two
/// components have the same size, the one labelled first (raster order) wins.
pub fn find_blob(image: Image, target: ColorTarget, config: &RegionConfig) -> Option<DetectedBlob> {
	let (w, h) = (image.width(), image.height());
	if w < 2 || h < 2 {
		return None;
	}

	let mask = color_mask(image, target);
	let on = mask.as_raw().iter().filter(|&&v| v != 0).count();
	if on < config.min_area as usize {
		tracing::trace!(on, "too few tooltip-colored pixels");
		return None;
	}

	let pooled = pool(&mask);
	let labels = connected_components(&pooled, Connectivity::Four, Luma([0u8]));

	let mut components: Vec<Component> = Vec::new();
	for (x, y, label) in labels.enumerate_pixels() {
		let label = label.0[0] as usize;
		if label == 0 {
			continue;
		}
		if label > components.len() {
			components.resize(label, Component::EMPTY);
		}
		components[label - 1].add(x, y);
	}

	let min_area = config.min_area.div_ceil(4) as u64;
	let best = components
		.iter()
		.filter(|c| c.area >= min_area)
		.fold(None::<&Component>, |best, c| match best {
			Some(b) if b.area >= c.area => Some(b),
			_ => Some(c),
		})?;

	tracing::trace!(area = best.area, components = components.len(), "tooltip component selected");

	let best = refine(&mask, best);
	let pad = config.padding;
	Some(DetectedBlob {
		x1: best.min_x.saturating_sub(pad),
		y1: best.min_y.saturating_sub(pad),
		x2: (best.max_x + 1).saturating_add(pad).min(w),
		y2: (best.max_y + 1).saturating_add(pad).min(h),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Color, OwnedImage};

	const BG: Color = Color::new(20, 20, 30);

	fn frame_with_block(w: u32, h: u32, x: u32, y: u32, bw: u32, bh: u32) -> OwnedImage {
		let mut img = OwnedImage::filled(w, h, BG);
		img.fill_rect(x, y, bw, bh, ColorTarget::TOOLTIP.color);
		img
	}

	#[test]
	fn uniform_block_is_padded() {
		let img = frame_with_block(800, 600, 100, 100, 300, 150);
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()).unwrap();
		assert_eq!(blob, DetectedBlob { x1: 95, y1: 95, x2: 405, y2: 255 });
	}

	#[test]
	fn padding_is_clamped_to_frame() {
		let img = frame_with_block(200, 100, 0, 2, 198, 98);
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()).unwrap();
		assert_eq!(blob, DetectedBlob { x1: 0, y1: 0, x2: 200, y2: 100 });
	}

	#[test]
	fn no_matching_pixels() {
		let img = OwnedImage::filled(120, 80, BG);
		assert_eq!(find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()), None);
	}

	#[test]
	fn specks_below_area_floor_are_ignored() {
		// 7x7 = 49 pixels, one short of the floor.
		let img = frame_with_block(100, 100, 10, 10, 7, 7);
		assert_eq!(find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()), None);
	}

	#[test]
	fn largest_component_wins() {
		let mut img = frame_with_block(400, 300, 10, 10, 40, 40);
		img.fill_rect(200, 100, 120, 90, ColorTarget::TOOLTIP.color);
		let config = RegionConfig { min_area: 50, padding: 0 };
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &config).unwrap();
		assert_eq!(blob, DetectedBlob { x1: 200, y1: 100, x2: 320, y2: 190 });
	}

	#[test]
	fn text_inside_block_does_not_split_it() {
		let mut img = frame_with_block(800, 600, 100, 100, 300, 150);
		img.fill_rect(120, 120, 100, 20, Color::BLACK);
		img.fill_rect(120, 150, 120, 20, Color::BLACK);
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()).unwrap();
		assert_eq!(blob, DetectedBlob { x1: 95, y1: 95, x2: 405, y2: 255 });
	}

	#[test]
	fn odd_offsets_keep_exact_bounds() {
		let img = frame_with_block(301, 203, 37, 51, 121, 77);
		let config = RegionConfig { min_area: 50, padding: 0 };
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &config).unwrap();
		assert_eq!(blob, DetectedBlob { x1: 37, y1: 51, x2: 158, y2: 128 });
	}

	#[test]
	fn one_pixel_lines_are_not_tooltips() {
		let mut img = OwnedImage::filled(300, 200, BG);
		img.fill_rect(10, 100, 280, 1, ColorTarget::TOOLTIP.color);
		img.fill_rect(150, 5, 1, 190, ColorTarget::TOOLTIP.color);
		assert_eq!(find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()), None);
	}

	#[test]
	fn mask_follows_sub_image_rows() {
		let img = frame_with_block(20, 20, 5, 5, 4, 2);
		let mask = color_mask(img.as_image().sub_image(4, 4, 6, 4), ColorTarget::TOOLTIP);
		assert_eq!(mask.dimensions(), (6, 4));
		assert_eq!(mask.get_pixel(0, 1).0[0], 0);
		assert_eq!(mask.get_pixel(1, 1).0[0], 255);
		assert_eq!(mask.get_pixel(4, 2).0[0], 255);
		assert_eq!(mask.get_pixel(5, 2).0[0], 0);
		assert_eq!(mask.get_pixel(1, 3).0[0], 0);
	}

	#[test]
	fn large_search_window_is_fast() {
		let mut img = frame_with_block(1200, 1200, 300, 200, 400, 600);
		for i in 0..2000u32 {
			let (x, y) = ((i * 7919) % 1200, (i * 104_729) % 1200);
			if (290..710).contains(&x) && (190..810).contains(&y) {
				continue;
			}
			img.fill_rect(x, y, 2, 2, ColorTarget::TOOLTIP.color);
		}
		let budget = if cfg!(debug_assertions) {
			std::time::Duration::from_secs(2)
		} else {
			std::time::Duration::from_millis(25)
		};

		let start = std::time::Instant::now();
		let blob = find_blob(img.as_image(), ColorTarget::TOOLTIP, &RegionConfig::default()).unwrap();
		let elapsed = start.elapsed();

		assert_eq!(blob, DetectedBlob { x1: 295, y1: 195, x2: 705, y2: 805 });
		assert!(elapsed < budget, "took {elapsed:?}");
	}

	#[test]
	fn diagonal_neighbours_are_separate() {
		let mut img = OwnedImage::filled(40, 40, BG);
		for i in 0..40 {
			img.fill_rect(i, i, 1, 1, ColorTarget::TOOLTIP.color);
		}
		let config = RegionConfig { min_area: 2, padding: 0 };
		assert_eq!(find_blob(img.as_image(), ColorTarget::TOOLTIP, &config), None);
	}
}
