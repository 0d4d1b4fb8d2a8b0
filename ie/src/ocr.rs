//! OCR wrapper.
//!
//! The project relies on `ocr-rs` (Rust PaddleOCR bindings) behind the
//! [`TextRecognizer`] trait, so the rest of the pipeline can run against a
//! stub recognizer. The engine returns one box per detected text run; boxes
//! are grouped into lines here and emitted top to bottom.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::GrayImage;

/// Characters the recognizer may emit for Latin-script item names.
pub const LATIN_WHITELIST: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-.() ";

/// A single line of recognized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrLine {
	/// Position in extraction order (0 = top).
	pub index: usize,
	pub text: String,
}

/// A text run as reported by the engine, in image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
	pub text: String,
	pub x: i32,
	pub y: i32,
	pub width: u32,
	pub height: u32,
}

impl TextBox {
	fn center_y(&self) -> i32 {
		self.y + self.height as i32 / 2
	}
}

/// Per-call recognizer tuning.
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrHints<'a> {
	/// When set, characters outside this set are dropped from the output.
	pub whitelist: Option<&'a str>,
}

pub trait TextRecognizer: Send + Sync {
	fn recognize(&self, image: &GrayImage) -> Result<Vec<TextBox>>;
}

pub struct Ocr {
	engine: ocr_rs::OcrEngine,
}

impl Ocr {
	/// Initialize the OCR engine with the given model paths.
	pub fn try_new(
		detection: impl AsRef<Path>,
		recognition: impl AsRef<Path>,
		charset: impl AsRef<Path>,
	) -> Result<Self> {
		let thread_count = std::thread::available_parallelism()
			.map(|n| n.get())
			.unwrap_or(1);

		let engine = ocr_rs::OcrEngine::new(
			detection,
			recognition,
			charset,
			Some(ocr_rs::OcrEngineConfig {
				backend: ocr_rs::Backend::CPU,
				thread_count,
				// Item names are short and set in a stylized font; High trades
				// CPU for noticeably fewer misreads there.
				precision_mode: ocr_rs::PrecisionMode::High,
				enable_parallel: thread_count > 1,
				min_result_confidence: 0.5,
				..Default::default()
			}),
		)
		.context("failed to initialize OCR engine")?;

		Ok(Self { engine })
	}
}

impl TextRecognizer for Ocr {
	fn recognize(&self, image: &GrayImage) -> Result<Vec<TextBox>> {
		let rgb = image::DynamicImage::ImageLuma8(image.clone()).to_rgb8();
		let input = image::DynamicImage::ImageRgb8(rgb);

		let results = self
			.engine
			.recognize(&input)
			.map_err(|e| anyhow!("OCR recognition failed: {e}"))?;

		Ok(results
			.into_iter()
			.map(|r| TextBox {
				x: r.bbox.rect.left() as i32,
				y: r.bbox.rect.top() as i32,
				width: r.bbox.rect.width() as u32,
				height: r.bbox.rect.height() as u32,
				text: r.text,
			})
			.collect())
	}
}

/// Run `recognizer` on `image` and return its text line by line.
///
/// An image without text yields an empty list, not an error.
pub fn extract(recognizer: &dyn TextRecognizer, image: &GrayImage, hints: OcrHints) -> Result<Vec<OcrLine>> {
	if image.width() == 0 || image.height() == 0 {
		return Ok(Vec::new());
	}

	let boxes = recognizer.recognize(image)?;
	let lines = group_lines(boxes)
		.into_iter()
		.map(|text| match hints.whitelist {
			Some(allowed) => text.chars().filter(|c| allowed.contains(*c)).collect::<String>(),
			None => text,
		})
		.map(|text| text.trim().to_string())
		.filter(|text| !text.is_empty())
		.enumerate()
		.map(|(index, text)| OcrLine { index, text })
		.collect();

	Ok(lines)
}

/// Merge text boxes that share a baseline into lines, ordered top to bottom
/// and left to right within a line.
pub fn group_lines(mut boxes: Vec<TextBox>) -> Vec<String> {
	boxes.retain(|b| !b.text.trim().is_empty());
	boxes.sort_by_key(|b| (b.center_y(), b.x));

	let mut lines: Vec<Vec<TextBox>> = Vec::new();
	for b in boxes {
		let same_line = lines.last().and_then(|line| line.first()).is_some_and(|first| {
			let tolerance = (first.height.max(b.height) / 2) as i32;
			(b.center_y() - first.center_y()).abs() <= tolerance
		});

		match lines.last_mut() {
			Some(line) if same_line => line.push(b),
			_ => lines.push(vec![b]),
		}
	}

	lines
		.into_iter()
		.map(|mut line| {
			line.sort_by_key(|b| b.x);
			line.iter()
				.map(|b| b.text.trim())
				.collect::<Vec<_>>()
				.join(" ")
		})
		.collect()
}
