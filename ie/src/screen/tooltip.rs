//! Item tooltip reader.
//!
//! A tooltip is located by its background color. If no tooltip-colored
//! region survives the noise floor the whole capture is used instead, so a
//! scan never fails just because the background color drifted.

use anyhow::Result;
use image::GrayImage;

use crate::{ColorTarget, DetectedBlob, Image, PreprocessConfig, RegionConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct TooltipConfig {
	pub target: ColorTarget,
	pub region: RegionConfig,
	pub preprocess: PreprocessConfig,
}

/// A located tooltip and the header image prepared for OCR.
#[derive(Debug, Clone)]
pub struct Tooltip {
	/// `None` when the background color was not found and the full frame was used.
	pub blob: Option<DetectedBlob>,
	pub header: GrayImage,
}

pub fn locate(image: Image, config: &TooltipConfig) -> Result<Tooltip> {
	let blob = crate::find_blob(image, config.target, &config.region);
	match blob {
		Some(b) => tracing::debug!(x1 = b.x1, y1 = b.y1, x2 = b.x2, y2 = b.y2, "tooltip region found"),
		None => tracing::debug!("no tooltip region; using the full capture"),
	}

	let header = crate::preprocess(image, blob, &config.preprocess)?;
	Ok(Tooltip { blob, header })
}
