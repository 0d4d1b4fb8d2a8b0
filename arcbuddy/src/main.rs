//! ArcBuddy: identify the item under the pointer from its tooltip.
//!
//! The binary wires the screen sampler, OCR engine and item catalog into a
//! [`scan::Scanner`] and drives it from the command line.

use std::{
	io::BufRead,
	path::{Path, PathBuf},
	sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use data::{
	Catalog, Language,
	progress::{ItemProgress, NoProgress, ProgressSnapshot},
};

mod assets;
mod capture;
mod config;
mod debug;
mod report;
mod scan;
mod worker;

use capture::{CaptureRegion, ScreenSampler, XcapSampler};
use config::Config;
use scan::{ScanState, Scanner};
use worker::{ScanResult, ScanWorker};

/// Identify the item under the pointer from its in-game tooltip.
#[derive(Debug, Parser)]
#[command(name = "arcbuddy", version)]
struct Cli {
	/// Config file to use instead of the one in the platform config directory.
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Scan once and print the result as JSON.
	Scan {
		/// Read the whole monitor instead of a box around the pointer.
		#[arg(long)]
		full_screen: bool,
		/// Item and OCR language (catalog code like `de` or a name like `German`).
		#[arg(long)]
		language: Option<Language>,
	},
	/// Scan once for every line on stdin. `lang <code>` switches language, `quit` exits.
	Watch {
		#[arg(long)]
		language: Option<Language>,
	},
	/// Store the color under the pointer as the tooltip background.
	Calibrate {
		/// Per-channel tolerance to store with the sampled color.
		#[arg(long, default_value_t = ie::ColorTarget::TOOLTIP.tolerance)]
		tolerance: u8,
	},
}

fn main() -> Result<()> {
	// Structured logging. Use `RUST_LOG=debug` to see candidates and top matches.
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let mut config = match &cli.config {
		Some(path) => Config::load_from(path)?,
		None => Config::load_or_default(),
	};

	match cli.command {
		Command::Scan { full_screen, language } => {
			config.full_screen |= full_screen;
			if let Some(language) = language {
				config.language = language;
			}
			let catalog = load_catalog(&config)?;
			let worker = ScanWorker::new(Arc::new(build_scanner(&config, &catalog)?));
			let result = worker.request(config.scan_config()).and_then(|ticket| ticket.wait());
			print_result(&result)
		}
		Command::Watch { language } => {
			if let Some(language) = language {
				config.language = language;
			}
			watch(config)
		}
		Command::Calibrate { tolerance } => {
			config.target = calibrate(&XcapSampler, tolerance)?;
			match &cli.config {
				Some(path) => config.save_to(path)?,
				None => config.save()?,
			}
			println!("{}", serde_json::to_string_pretty(&config.target)?);
			Ok(())
		}
	}
}

/// Load the OCR engine and name index for `language`.
fn load_state(config: &Config, catalog: &Catalog, language: Language) -> Result<ScanState> {
	let assets = assets::resolve_ocr_assets(language.ocr_code(), config.assets_dir.as_deref())?;
	let ie = ie::Ie::try_new(&assets.detection, &assets.recognition, &assets.charset)?;
	Ok(ScanState {
		ie,
		index: catalog.index(language),
	})
}

fn load_catalog(config: &Config) -> Result<Catalog> {
	let dir = config.items_dir()?;
	Catalog::load_dir(&dir)
		.with_context(|| format!("load item catalog from {}", dir.display()))
		.inspect_err(|err| tracing::error!(error = %format!("{err:#}"), "startup failed"))
}

fn load_progress(path: Option<&Path>) -> Box<dyn ItemProgress> {
	let Some(path) = path else {
		return Box::new(NoProgress);
	};
	match ProgressSnapshot::load(path) {
		Ok(progress) => Box::new(progress),
		Err(err) => {
			tracing::warn!(error = %format!("{err:#}"), "failed to load progress; requirements will be empty");
			Box::new(NoProgress)
		}
	}
}

/// Startup failures are logged once here; scans never retry them.
fn build_scanner(config: &Config, catalog: &Catalog) -> Result<Scanner> {
	let state = load_state(config, catalog, config.language).inspect_err(|err| tracing::error!(error = %format!("{err:#}"), "startup failed"))?;

	let mut scanner = Scanner::new(XcapSampler, state, load_progress(config.progress_file.as_deref()));
	if config.save_debug_images {
		scanner = scanner.with_debug(debug::DebugSink::new(config.debug_images_dir()?));
	}
	Ok(scanner)
}

fn print_result(result: &ScanResult) -> Result<()> {
	match result {
		Ok(outcome) => println!("{}", serde_json::to_string_pretty(outcome)?),
		Err(err) => println!("{}", serde_json::json!({ "status": "error", "error": err.to_string() })),
	}
	Ok(())
}

fn watch(mut config: Config) -> Result<()> {
	let catalog = load_catalog(&config)?;
	let worker = ScanWorker::new(Arc::new(build_scanner(&config, &catalog)?));

	eprintln!("press enter to scan, `lang <code>` to switch language, `quit` to exit");
	for line in std::io::stdin().lock().lines() {
		let line = line.context("read stdin")?;
		let line = line.trim();

		if line == "quit" {
			break;
		}

		if let Some(code) = line.strip_prefix("lang ") {
			let language = match code.parse::<Language>() {
				Ok(language) => language,
				Err(err) => {
					tracing::warn!(error = %err, "ignoring language switch");
					continue;
				}
			};
			// Built beside the live state, then swapped in whole.
			match load_state(&config, &catalog, language) {
				Ok(state) => {
					worker.scanner().swap(state);
					config.language = language;
				}
				Err(err) => tracing::warn!(error = %format!("{err:#}"), "language switch failed"),
			}
			continue;
		}

		match worker.request(config.scan_config()) {
			Ok(ticket) => {
				std::thread::spawn(move || {
					let result = ticket.wait();
					if let Err(err) = print_result(&result) {
						tracing::warn!(error = %err, "failed to print scan result");
					}
				});
			}
			Err(err) => tracing::info!(error = %err, "scan skipped"),
		}
	}

	Ok(())
}

/// Sample the tooltip background under the pointer.
fn calibrate(screen: &dyn ScreenSampler, tolerance: u8) -> Result<ie::ColorTarget> {
	let (x, y) = screen.pointer().context("pointer position unavailable")?;
	let frame = screen.capture(CaptureRegion::centered(x, y, 9))?;
	let target = ie::ColorTarget::sample(frame.as_image(), frame.width() / 2, frame.height() / 2, tolerance);
	tracing::info!(color = ?target.color, tolerance, "tooltip color calibrated");
	Ok(target)
}
