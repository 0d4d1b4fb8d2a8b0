//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use data::{Language, matcher::MatcherKind};
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language of the item names and of the OCR model.
    pub language: Language,

    /// Tooltip background color (see `arcbuddy calibrate`).
    pub target: ie::ColorTarget,

    /// Capture the whole monitor instead of a box around the pointer.
    pub full_screen: bool,

    /// Side length of the pointer-centered capture box, in pixels.
    pub search_box: u32,

    /// Write the raw capture, tooltip crop and OCR input of every scan to `debug_dir`.
    pub save_debug_images: bool,

    /// Matches scoring below this (0-100) are reported as "no match".
    pub min_confidence: f64,

    pub matcher: MatcherKind,

    pub region: ie::RegionConfig,

    pub preprocess: ie::PreprocessConfig,

    /// Upper bound for a single scan, capture to match.
    pub scan_timeout_s: f32,

    /// Directory of item JSON files. Defaults to `<config dir>/arcbuddy/data/items`.
    pub data_dir: Option<PathBuf>,

    /// Directory containing `ocr/`. Defaults to searching next to the executable and the cwd.
    pub assets_dir: Option<PathBuf>,

    /// Optional progress export used to fill requirement fields in reports.
    pub progress_file: Option<PathBuf>,

    /// Where debug images go. Defaults to `<config dir>/arcbuddy/debug`.
    pub debug_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::English,
            target: ie::ColorTarget::TOOLTIP,
            full_screen: false,
            search_box: 1200,
            save_debug_images: false,
            min_confidence: data::matcher::DEFAULT_MIN_SCORE,
            matcher: MatcherKind::Precise,
            region: ie::RegionConfig::default(),
            preprocess: ie::PreprocessConfig::default(),
            scan_timeout_s: 5.0,
            data_dir: None,
            assets_dir: None,
            progress_file: None,
            debug_dir: None,
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("arcbuddy.json"))
    }

    fn app_dir() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("arcbuddy"))
    }

    /// Load configuration from disk, falling back to defaults on missing file.
    pub fn load_or_default() -> Self {
        match Self::try_load() {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load config; using defaults");
                Self::default()
            }
        }
    }

    /// Try to load configuration from disk.
    pub fn try_load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    pub fn items_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::app_dir()?.join("data").join("items")),
        }
    }

    pub fn debug_images_dir(&self) -> Result<PathBuf> {
        match &self.debug_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::app_dir()?.join("debug")),
        }
    }

    /// The per-scan settings derived from this configuration.
    pub fn scan_config(&self) -> crate::scan::ScanConfig {
        crate::scan::ScanConfig {
            tooltip: ie::screen::tooltip::TooltipConfig {
                target: self.target,
                region: self.region,
                preprocess: self.preprocess,
            },
            full_screen: self.full_screen,
            search_box: self.search_box,
            min_confidence: self.min_confidence,
            matcher: self.matcher,
            restrict_charset: self.language.restricts_ocr_charset(),
            timeout: Duration::from_secs_f32(self.scan_timeout_s.max(0.1)),
        }
    }
}
