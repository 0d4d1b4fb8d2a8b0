//! One scan: capture, locate the tooltip, read it, match it, report it.

use std::{
	sync::{Arc, PoisonError, RwLock},
	time::Duration,
};

use data::{CatalogIndex, matcher::MatcherKind, progress::ItemProgress};
use ie::{DetectedBlob, Image, OcrHints, screen::tooltip::TooltipConfig};

use crate::{
	capture::ScreenSampler,
	debug::DebugSink,
	report::{self, ItemReport},
};

/// Everything a single scan needs, fixed for its duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
	pub tooltip: TooltipConfig,
	pub full_screen: bool,
	pub search_box: u32,
	pub min_confidence: f64,
	pub matcher: MatcherKind,
	/// Restrict recognized text to [`ie::LATIN_WHITELIST`].
	pub restrict_charset: bool,
	pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
	#[error("screen capture failed: {0:#}")]
	Capture(anyhow::Error),
	#[error("OCR failed: {0:#}")]
	Ocr(anyhow::Error),
	#[error("scan did not finish within {0:?}")]
	Timeout(Duration),
	#[error("a scan is already running")]
	Busy,
	#[error("failed to start scan worker")]
	Spawn(#[from] std::io::Error),
	#[error("scan worker stopped without a result")]
	WorkerLost,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
	Identified(Box<ItemReport>),
	/// Nothing scored above the confidence floor.
	NoMatch {
		tooltip: Option<DetectedBlob>,
		candidates: Vec<String>,
	},
}

/// OCR engine and name index for one language. Replaced as a unit.
pub struct ScanState {
	pub ie: ie::Ie,
	pub index: CatalogIndex,
}

pub struct Scanner {
	screen: Box<dyn ScreenSampler>,
	state: RwLock<Arc<ScanState>>,
	progress: Box<dyn ItemProgress>,
	debug: Option<DebugSink>,
}

impl Scanner {
	pub fn new(screen: impl ScreenSampler + 'static, state: ScanState, progress: Box<dyn ItemProgress>) -> Self {
		Self {
			screen: Box::new(screen),
			state: RwLock::new(Arc::new(state)),
			progress,
			debug: None,
		}
	}

	pub fn with_debug(mut self, sink: DebugSink) -> Self {
		self.debug = Some(sink);
		self
	}

	/// Install a new engine/index pair. Scans already running keep the old one.
	pub fn swap(&self, state: ScanState) {
		tracing::info!(language = ?state.index.language(), entries = state.index.len(), "scan state replaced");
		*self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(state);
	}

	pub fn snapshot(&self) -> Arc<ScanState> {
		self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
	}

	/// Capture the screen and identify the item in it.
	pub fn scan(&self, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
		let region = self
			.screen
			.region(config.full_screen, config.search_box)
			.map_err(ScanError::Capture)?;
		tracing::debug!(?region, "capturing");

		let frame = self.screen.capture(region).map_err(ScanError::Capture)?;
		self.identify(frame.as_image(), config)
	}

	/// Identify the item in an already captured frame.
	pub fn identify(&self, frame: Image, config: &ScanConfig) -> Result<ScanOutcome, ScanError> {
		let state = self.snapshot();

		let tooltip = state
			.ie
			.tooltip_locate(frame, &config.tooltip)
			.map_err(|err| ScanError::Ocr(err.context("prepare OCR input")))?;

		if let Some(sink) = &self.debug
			&& let Err(err) = sink.save(frame, tooltip.blob, &tooltip.header)
		{
			tracing::warn!(error = %format!("{err:#}"), "failed to save debug images");
		}

		let hints = OcrHints {
			whitelist: config.restrict_charset.then_some(ie::LATIN_WHITELIST),
		};
		let lines = state.ie.read_lines(&tooltip.header, hints).map_err(ScanError::Ocr)?;
		let read = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>();
		tracing::debug!(lines = ?read, "ocr");

		let candidates = ie::text::generate(&lines);
		let texts = candidates.iter().map(|c| c.text.as_str()).collect::<Vec<_>>();
		tracing::debug!(candidates = ?texts, "match candidates");

		let matched = data::matcher::best_match(&texts, &state.index, config.matcher.matcher(), config.min_confidence);
		let Some(matched) = matched else {
			tracing::info!(candidates = texts.len(), "no item identified");
			return Ok(ScanOutcome::NoMatch {
				tooltip: tooltip.blob,
				candidates: texts.into_iter().map(String::from).collect(),
			});
		};

		tracing::info!(item = %matched.entry.name, score = matched.score, strategy = ?matched.strategy, "item identified");
		let report = report::aggregate(&matched, self.progress.as_ref(), tooltip.blob);
		Ok(ScanOutcome::Identified(Box::new(report)))
	}
}
