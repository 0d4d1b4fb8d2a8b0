//! OCR input preparation.
//!
//! The item name always sits at the top of a tooltip, so only a header strip
//! is handed to OCR. Every tuning constant lives in [`PreprocessConfig`].

use anyhow::Result;
use image::GrayImage;

use crate::{DetectedBlob, Image};

#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct PreprocessConfig {
	/// Frames taller than this keep `tall_fraction` of their height.
	pub tall_height: u32,
	pub tall_fraction: f32,
	/// Frames up to `tall_height` keep `short_fraction` of their height.
	pub short_fraction: f32,
	/// Lower bound for the header strip. Frames not taller than this are left uncropped.
	pub min_header_height: u32,
	/// Frames wider than this lose `wide_trim` pixels on each side, narrower ones `narrow_trim`.
	pub wide_width: u32,
	pub wide_trim: u32,
	pub narrow_trim: u32,
	/// Deviation from mid-gray is multiplied by this factor.
	pub contrast: f32,
	/// Header strips shorter than this are upscaled before OCR.
	pub min_ocr_height: u32,
}

impl Default for PreprocessConfig {
	fn default() -> Self {
		Self {
			tall_height: 400,
			tall_fraction: 0.30,
			short_fraction: 0.50,
			min_header_height: 100,
			wide_width: 100,
			wide_trim: 10,
			narrow_trim: 5,
			contrast: 2.0,
			min_ocr_height: 48,
		}
	}
}

impl PreprocessConfig {
	/// Height of the header strip kept from a frame of height `h`.
	pub fn header_height(&self, h: u32) -> u32 {
		if h <= self.min_header_height {
			return h;
		}

		let fraction = if h > self.tall_height {
			self.tall_fraction
		} else {
			self.short_fraction
		};
		((h as f32 * fraction) as u32).max(self.min_header_height).min(h)
	}

	/// Pixels removed from each side of a `w` x `h` strip.
	pub fn edge_trim(&self, w: u32, h: u32) -> u32 {
		let trim = if w > self.wide_width {
			self.wide_trim
		} else {
			self.narrow_trim
		};

		if w > trim * 2 && h > trim * 2 { trim } else { 0 }
	}
}

/// Produce the grayscale header image handed to OCR.
///
/// Steps: crop to `blob` (or keep the whole frame), keep the header strip,
/// trim the side edges, upscale short strips, convert to luma and boost
/// contrast. The input frame is left untouched.
pub fn preprocess(frame: Image, blob: Option<DetectedBlob>, config: &PreprocessConfig) -> Result<GrayImage> {
	let region = match blob {
		Some(blob) => blob.crop(frame),
		None => frame,
	};

	let header = region.trimmed_top(config.header_height(region.height()));
	let header = header.trimmed_sides(config.edge_trim(header.width(), header.height()));

	let mut gray = if header.height() > 0 && header.height() < config.min_ocr_height {
		let mut owned = header.to_owned_image();
		owned.resize_h(config.min_ocr_height)?;
		owned.as_image().to_gray_image()
	} else {
		header.to_gray_image()
	};

	enhance_contrast(&mut gray, config.contrast);
	Ok(gray)
}

/// Push every pixel away from mid-gray by `factor`, saturating at 0/255.
pub fn enhance_contrast(gray: &mut GrayImage, factor: f32) {
	let mut lut = [0u8; 256];
	for (v, out) in lut.iter_mut().enumerate() {
		*out = (128.0 + (v as f32 - 128.0) * factor).round().clamp(0.0, 255.0) as u8;
	}

	for p in gray.pixels_mut() {
		p.0[0] = lut[p.0[0] as usize];
	}
}
