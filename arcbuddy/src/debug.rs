//! Debug snapshots of a scan: the raw capture, the tooltip crop and the
//! exact image handed to OCR. Written only, never read back.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ie::{DetectedBlob, Image};

#[derive(Debug, Clone)]
pub struct DebugSink {
	dir: PathBuf,
}

impl DebugSink {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	/// Write `<timestamp>_raw.png`, `<timestamp>_tooltip.png` (if a tooltip
	/// was found) and `<timestamp>_header.png`. Returns the paths written.
	pub fn save(&self, raw: Image, blob: Option<DetectedBlob>, header: &image::GrayImage) -> Result<Vec<PathBuf>> {
		std::fs::create_dir_all(&self.dir).with_context(|| format!("create {:?}", self.dir))?;
		let prefix = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
		let path = |suffix: &str| self.dir.join(format!("{prefix}_{suffix}.png"));

		let mut written = Vec::with_capacity(3);

		let raw_path = path("raw");
		raw.save_png(&raw_path)?;
		written.push(raw_path);

		if let Some(blob) = blob {
			let tooltip_path = path("tooltip");
			blob.crop(raw).save_png(&tooltip_path)?;
			written.push(tooltip_path);
		}

		let header_path = path("header");
		header
			.save_with_format(&header_path, image::ImageFormat::Png)
			.with_context(|| format!("save {:?}", header_path))?;
		written.push(header_path);

		tracing::debug!(dir = %self.dir.display(), prefix = %prefix, "debug images saved");
		Ok(written)
	}
}

#[cfg(test)]
mod tests {
	use ie::{Color, OwnedImage};

	use super::*;

	#[test]
	fn writes_all_stages() {
		let dir = tempfile::tempdir().unwrap();
		let sink = DebugSink::new(dir.path().join("debug"));

		let frame = OwnedImage::filled(40, 30, Color::WHITE);
		let blob = DetectedBlob { x1: 5, y1: 5, x2: 25, y2: 20 };
		let header = image::GrayImage::new(20, 8);

		let written = sink.save(frame.as_image(), Some(blob), &header).unwrap();
		assert_eq!(written.len(), 3);
		assert!(written.iter().all(|p| p.is_file()));
		assert!(written[1].to_string_lossy().ends_with("_tooltip.png"));

		let tooltip = image::open(&written[1]).unwrap();
		assert_eq!((tooltip.width(), tooltip.height()), (20, 15));
	}

	#[test]
	fn no_tooltip_crop_without_blob() {
		let dir = tempfile::tempdir().unwrap();
		let sink = DebugSink::new(dir.path());
		let frame = OwnedImage::filled(10, 10, Color::BLACK);
		let written = sink.save(frame.as_image(), None, &image::GrayImage::new(4, 4)).unwrap();
		assert_eq!(written.len(), 2);
	}
}
