mod image;
pub use self::image::*;
mod ocr;
pub use ocr::{LATIN_WHITELIST, Ocr, OcrHints, OcrLine, TextBox, TextRecognizer};
mod preprocess;
pub use preprocess::{PreprocessConfig, enhance_contrast, preprocess};
mod region;
pub use region::{DetectedBlob, RegionConfig, color_mask, find_blob};
mod target;
pub use target::*;
pub mod text;

pub mod screen;

/// Image engine: owns the OCR recognizer and runs the tooltip pipeline stages.
pub struct Ie {
	ocr: Box<dyn TextRecognizer>,
}

impl Ie {
	pub fn try_new(
		ocr_detection: impl AsRef<std::path::Path>,
		ocr_recognition: impl AsRef<std::path::Path>,
		ocr_charset: impl AsRef<std::path::Path>,
	) -> anyhow::Result<Self> {
		Ok(Self::with_recognizer(Ocr::try_new(ocr_detection, ocr_recognition, ocr_charset)?))
	}

	/// Build an engine around any recognizer (tests use canned output).
	pub fn with_recognizer(ocr: impl TextRecognizer + 'static) -> Self {
		Self { ocr: Box::new(ocr) }
	}

	pub fn tooltip_locate(&self, image: Image, config: &screen::tooltip::TooltipConfig) -> anyhow::Result<screen::tooltip::Tooltip> {
		screen::tooltip::locate(image, config)
	}

	pub fn read_lines(&self, header: &::image::GrayImage, hints: OcrHints) -> anyhow::Result<Vec<OcrLine>> {
		ocr::extract(self.ocr.as_ref(), header, hints)
	}
}
