use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

#[derive(Debug, Clone)]
pub struct OcrAssets {
	pub detection: PathBuf,
	pub recognition: PathBuf,
	pub charset: PathBuf,
}

fn normalize_ocr_dir(dir: PathBuf) -> PathBuf {
	// Accept either the folder containing `ocr/` or the `ocr/` folder itself.
	if dir.join("detection.mnn").is_file() {
		dir
	} else {
		dir.join("ocr")
	}
}

fn search_dirs(assets_dir: Option<&Path>) -> Vec<PathBuf> {
	let mut candidates: Vec<PathBuf> = Vec::new();
	if let Some(dir) = assets_dir {
		candidates.push(dir.to_path_buf());
	}
	if let Ok(exe) = std::env::current_exe()
		&& let Some(dir) = exe.parent()
	{
		candidates.push(dir.to_path_buf());
	}
	if let Ok(cwd) = std::env::current_dir() {
		candidates.push(cwd);
	}
	// Workspace root, for `cargo run` from another directory.
	#[cfg(debug_assertions)]
	candidates.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".."));
	candidates
}

/// Find the detection model plus the recognition model and charset of the
/// `family` model family (`latin`, `cyrillic`, ...).
///
/// `assets_dir` is searched first, then the executable's directory, then the cwd.
pub fn resolve_ocr_assets(family: &str, assets_dir: Option<&Path>) -> Result<OcrAssets> {
	let recognition_name = format!("{family}_recognition.mnn");
	let charset_name = format!("{family}_charset.txt");

	let mut tried = Vec::new();
	for base in search_dirs(assets_dir) {
		let ocr_dir = normalize_ocr_dir(base);
		let detection = ocr_dir.join("detection.mnn");
		let recognition = ocr_dir.join(&recognition_name);
		let charset = ocr_dir.join(&charset_name);

		if detection.is_file() && recognition.is_file() && charset.is_file() {
			return Ok(OcrAssets { detection, recognition, charset });
		}

		tried.push(ocr_dir);
	}

	bail!(
		"OCR model files not found. Expected these files:\n  - ocr/detection.mnn\n  - ocr/{recognition_name}\n  - ocr/{charset_name}\n\nSearched in:\n{}\n\nFix: copy the 'ocr/' folder next to the executable (or set `assets_dir` in the config).",
		tried
			.into_iter()
			.map(|p| format!("  - {}", p.display()))
			.collect::<Vec<_>>()
			.join("\n")
	)
}
