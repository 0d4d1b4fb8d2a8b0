//! OCR line cleanup and match-candidate generation.

use std::sync::LazyLock;

use regex::Regex;

use crate::OcrLine;

/// Lines and candidates shorter than this (in characters) are dropped.
pub const MIN_TEXT_LEN: usize = 3;

/// A cleaned string considered for catalog matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
	pub text: String,
	/// Index of the (first) OCR line this candidate was built from.
	pub line: usize,
	/// True if the candidate joins `line` with the line below it.
	pub joined: bool,
}

static DISALLOWED: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s.()\-]").expect("regex"));

// Word-boundary anchored on both sides so words like "Hill" are left alone.
// Longer patterns run first so "Ill" is not half-rewritten by the two-letter rule.
// Three-letter runs need an uppercase `I`, which keeps "ill" and "Lil" intact.
static ROMAN_THREE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[Il]{3}\b").expect("regex"));
static ROMAN_TWO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:[IL]l|l[IL])\b").expect("regex"));
static ROMAN_FOUR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[lI][vV]\b").expect("regex"));

/// Strip characters outside the allow-list and collapse whitespace.
pub fn clean_line(raw: &str) -> String {
	DISALLOWED
		.replace_all(raw, "")
		.split_whitespace()
		.collect::<Vec<_>>()
		.join(" ")
}

/// Repair Roman numerals OCR reads with a lowercase `l` (`Il` -> `II`, `Ill` -> `III`, `lV` -> `IV`).
///
/// Idempotent: the canonical forms do not match any rewrite pattern.
pub fn fix_roman_numerals(text: &str) -> String {
	let text = ROMAN_THREE.replace_all(text, |caps: &regex::Captures| {
		if caps[0].contains('I') { "III".to_string() } else { caps[0].to_string() }
	});
	let text = ROMAN_TWO.replace_all(&text, "II");
	ROMAN_FOUR.replace_all(&text, "IV").into_owned()
}

/// Build match candidates from OCR lines (top to bottom).
///
/// Produces every usable cleaned line, then every adjacent pair joined by a
/// space (names that wrap onto a second line), with Roman numerals repaired.
/// Duplicates keep their first position.
pub fn generate(lines: &[OcrLine]) -> Vec<MatchCandidate> {
	let cleaned = lines
		.iter()
		.filter(|l| l.text.trim().chars().count() >= MIN_TEXT_LEN)
		.map(|l| (l.index, clean_line(&l.text)))
		.filter(|(_, text)| !text.is_empty())
		.collect::<Vec<_>>();

	let singles = cleaned.iter().map(|(line, text)| MatchCandidate {
		text: text.clone(),
		line: *line,
		joined: false,
	});
	let pairs = cleaned.windows(2).map(|pair| MatchCandidate {
		text: format!("{} {}", pair[0].1, pair[1].1),
		line: pair[0].0,
		joined: true,
	});

	let mut out: Vec<MatchCandidate> = Vec::new();
	for mut candidate in singles.chain(pairs) {
		candidate.text = fix_roman_numerals(&candidate.text);
		if candidate.text.chars().count() < MIN_TEXT_LEN {
			continue;
		}
		if out.iter().any(|c| c.text == candidate.text) {
			continue;
		}
		out.push(candidate);
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lines(texts: &[&str]) -> Vec<OcrLine> {
		texts
			.iter()
			.enumerate()
			.map(|(index, text)| OcrLine { index, text: text.to_string() })
			.collect()
	}

	fn texts(candidates: &[MatchCandidate]) -> Vec<&str> {
		candidates.iter().map(|c| c.text.as_str()).collect()
	}

	#[test]
	fn roman_numerals_at_word_boundary() {
		assert_eq!(fix_roman_numerals("Il"), "II");
		assert_eq!(fix_roman_numerals("lI"), "II");
		assert_eq!(fix_roman_numerals("Ill"), "III");
		assert_eq!(fix_roman_numerals("IIl"), "III");
		assert_eq!(fix_roman_numerals("Stitcher Il"), "Stitcher II");
		assert_eq!(fix_roman_numerals("Kettle lV"), "Kettle IV");
		assert_eq!(fix_roman_numerals("Anvil Iv Blueprint"), "Anvil IV Blueprint");
	}

	#[test]
	fn roman_numerals_leave_words_alone() {
		assert_eq!(fix_roman_numerals("Hill"), "Hill");
		assert_eq!(fix_roman_numerals("Still Life"), "Still Life");
		assert_eq!(fix_roman_numerals("Level"), "Level");
		assert_eq!(fix_roman_numerals("ill"), "ill");
		assert_eq!(fix_roman_numerals("Lil Bomb"), "Lil Bomb");
		assert_eq!(fix_roman_numerals("lll"), "lll");
	}

	#[test]
	fn roman_numeral_repair_is_idempotent() {
		for input in ["Il", "lI", "Ill", "IIl", "Hill", "Tempest lV", "Venator IIl Mk. Il", "ll", "ill", "Lil"] {
			let once = fix_roman_numerals(input);
			assert_eq!(fix_roman_numerals(&once), once, "{input}");
		}
	}

	#[test]
	fn cleaning_keeps_allow_list() {
		assert_eq!(clean_line("  Tactical  Mk. 2 (Blue)*  "), "Tactical Mk. 2 (Blue)");
		assert_eq!(clean_line("Zip-Line | #"), "Zip-Line");
		assert_eq!(clean_line("Аптечка!"), "Аптечка");
	}

	#[test]
	fn adjacent_lines_are_joined() {
		let out = generate(&lines(&["Vital", "Spray"]));
		assert_eq!(texts(&out), ["Vital", "Spray", "Vital Spray"]);
		assert!(out[2].joined);
		assert_eq!(out[2].line, 0);
	}

	#[test]
	fn short_lines_are_dropped_before_joining() {
		let out = generate(&lines(&["Vita", "x", "Spray", "!!!"]));
		assert_eq!(texts(&out), ["Vita", "Spray", "Vita Spray"]);
		assert_eq!(out[1].line, 2);
	}

	#[test]
	fn candidates_are_repaired_and_deduplicated() {
		let out = generate(&lines(&["Stitcher Il", "Stitcher II"]));
		assert_eq!(texts(&out), ["Stitcher II", "Stitcher II Stitcher II"]);
	}

	#[test]
	fn no_lines_no_candidates() {
		assert!(generate(&[]).is_empty());
		assert!(generate(&lines(&["ab", "  "])).is_empty());
	}
}
