use std::{fmt, str::FromStr};

/// Languages the item catalog carries names for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize, serde::Serialize)]
pub enum Language {
	#[default]
	English,
	German,
	French,
	Spanish,
	Portuguese,
	Polish,
	Russian,
	Italian,
	Japanese,
	ChineseSimplified,
	ChineseTraditional,
	Korean,
	Turkish,
	Ukrainian,
}

impl Language {
	pub const ALL: [Language; 14] = [
		Self::English,
		Self::German,
		Self::French,
		Self::Spanish,
		Self::Portuguese,
		Self::Polish,
		Self::Russian,
		Self::Italian,
		Self::Japanese,
		Self::ChineseSimplified,
		Self::ChineseTraditional,
		Self::Korean,
		Self::Turkish,
		Self::Ukrainian,
	];

	/// Key used for this language in the item data files.
	pub fn catalog_code(&self) -> &'static str {
		match self {
			Self::English => "en",
			Self::German => "de",
			Self::French => "fr",
			Self::Spanish => "es",
			Self::Portuguese => "pt",
			Self::Polish => "pl",
			Self::Russian => "ru",
			Self::Italian => "it",
			Self::Japanese => "ja",
			Self::ChineseSimplified => "zh-CN",
			Self::ChineseTraditional => "zh-TW",
			Self::Korean => "kr",
			Self::Turkish => "tr",
			Self::Ukrainian => "uk",
		}
	}

	/// Recognition model family able to read this language.
	pub fn ocr_code(&self) -> &'static str {
		match self {
			Self::Russian | Self::Ukrainian => "cyrillic",
			Self::Japanese => "japan",
			Self::ChineseSimplified | Self::ChineseTraditional => "chinese",
			Self::Korean => "korean",
			_ => "latin",
		}
	}

	/// Whether recognized text is restricted to ASCII letters, digits and `-.() `.
	///
	/// Only English item names are restricted; every other language keeps the full charset.
	pub fn restricts_ocr_charset(&self) -> bool {
		matches!(self, Self::English)
	}

	pub fn display_name(&self) -> &'static str {
		match self {
			Self::English => "English",
			Self::German => "Deutsch",
			Self::French => "Français",
			Self::Spanish => "Español",
			Self::Portuguese => "Português",
			Self::Polish => "Polski",
			Self::Russian => "Русский",
			Self::Italian => "Italiano",
			Self::Japanese => "日本語",
			Self::ChineseSimplified => "简体中文",
			Self::ChineseTraditional => "繁體中文",
			Self::Korean => "한국어",
			Self::Turkish => "Türkçe",
			Self::Ukrainian => "Українська",
		}
	}

	pub fn from_catalog_code(code: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|lang| lang.catalog_code().eq_ignore_ascii_case(code))
	}
}

impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.display_name())
	}
}

impl FromStr for Language {
	type Err = anyhow::Error;

	/// Accepts a catalog code (`de`, `zh-CN`) or the variant name (`German`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		Self::from_catalog_code(s)
			.or_else(|| Self::ALL.into_iter().find(|lang| format!("{lang:?}").eq_ignore_ascii_case(s)))
			.ok_or_else(|| anyhow::anyhow!("unknown language {s:?}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn codes_round_trip() {
		for lang in Language::ALL {
			assert_eq!(Language::from_catalog_code(lang.catalog_code()), Some(lang));
		}
	}

	#[test]
	fn parse_accepts_codes_and_names() {
		assert_eq!("de".parse::<Language>().unwrap(), Language::German);
		assert_eq!("zh-cn".parse::<Language>().unwrap(), Language::ChineseSimplified);
		assert_eq!("korean".parse::<Language>().unwrap(), Language::Korean);
		assert!("klingon".parse::<Language>().is_err());
	}

	#[test]
	fn only_english_is_whitelisted() {
		assert!(Language::English.restricts_ocr_charset());
		assert!(!Language::Japanese.restricts_ocr_charset());
		assert_eq!(Language::Ukrainian.ocr_code(), "cyrillic");
	}
}
