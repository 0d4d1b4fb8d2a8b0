//! Fuzzy matching of OCR candidates against a [`CatalogIndex`].
//!
//! A [`Matcher`] reports the best entry per strategy for one candidate.
//! [`best_match`] pools those hits over all candidates and keeps the highest
//! score; ties go to the earlier candidate, then to the earlier strategy.

use crate::{CatalogEntry, CatalogIndex, index::SearchKeys};

mod fallback;
pub mod fuzz;
mod precise;

pub use fallback::FallbackMatcher;
pub use precise::PreciseMatcher;

/// Scores below this are never reported as a match.
pub const DEFAULT_MIN_SCORE: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Strategy {
	/// Weighted ratio over lowercased names.
	WeightedRatio,
	/// Plain ratio over names stripped of spaces and punctuation, with a length bonus.
	Normalized,
	/// Ratio over lowercased, token-sorted names.
	TokenSort,
	/// Edit-distance ratio with a fixed cutoff.
	EditDistance,
}

/// Which matcher a scan uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherKind {
	#[default]
	Precise,
	Fallback,
}

impl MatcherKind {
	pub fn matcher(&self) -> &'static dyn Matcher {
		match self {
			Self::Precise => &PreciseMatcher,
			Self::Fallback => &FallbackMatcher,
		}
	}
}

/// Best entry found by one strategy for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
	/// Position in [`CatalogIndex::entries`].
	pub entry: usize,
	pub score: f64,
	pub strategy: Strategy,
}

pub trait Matcher: Send + Sync {
	/// Hits for `candidate`, in strategy order. Strategies that find nothing are omitted.
	fn hits(&self, candidate: &str, index: &CatalogIndex) -> Vec<Hit>;
}

#[derive(Debug, Clone)]
pub struct MatchResult {
	pub entry: CatalogEntry,
	pub score: f64,
	pub strategy: Strategy,
	/// Candidate text that produced the match.
	pub candidate: String,
}

/// All hits for all candidates, highest score first.
///
/// The sort is stable, so equal scores keep candidate order, then strategy order.
pub fn rank(candidates: &[&str], index: &CatalogIndex, matcher: &dyn Matcher) -> Vec<(usize, Hit)> {
	let mut hits = candidates
		.iter()
		.enumerate()
		.filter(|(_, c)| c.chars().count() >= 3)
		.flat_map(|(i, c)| matcher.hits(c, index).into_iter().map(move |hit| (i, hit)))
		.collect::<Vec<_>>();
	hits.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));
	hits
}

/// Best pooled hit over `candidates`, if it scores at least `min_score`.
///
/// With no candidates or an empty index the result is `None`.
pub fn best_match(candidates: &[&str], index: &CatalogIndex, matcher: &dyn Matcher, min_score: f64) -> Option<MatchResult> {
	if candidates.is_empty() || index.is_empty() {
		return None;
	}

	let ranked = rank(candidates, index, matcher);
	for (n, (candidate, hit)) in ranked.iter().take(3).enumerate() {
		let name = index.entry(hit.entry).map(|e| e.name.as_str()).unwrap_or_default();
		tracing::debug!(rank = n + 1, item = name, score = hit.score, strategy = ?hit.strategy, candidate = candidates[*candidate], "match");
	}

	let (candidate, hit) = ranked.into_iter().next()?;
	if hit.score < min_score {
		tracing::debug!(score = hit.score, min_score, "best match below threshold");
		return None;
	}

	Some(MatchResult {
		entry: index.entry(hit.entry)?.clone(),
		score: hit.score,
		strategy: hit.strategy,
		candidate: candidates[candidate].to_string(),
	})
}

/// Best entry under `score`, skipping zero scores. The first of equal scores wins.
pub(crate) fn extract_one(index: &CatalogIndex, mut score: impl FnMut(&SearchKeys) -> f64) -> Option<(usize, f64)> {
	let mut best: Option<(usize, f64)> = None;
	for (i, keys) in index.keys().iter().enumerate() {
		let s = score(keys);
		if s > 0.0 && best.is_none_or(|(_, b)| s > b) {
			best = Some((i, s));
		}
	}
	best
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Catalog, ItemRecord, Language};

	fn index() -> CatalogIndex {
		let mut medkit = ItemRecord::new("medkit", "Medkit");
		medkit.names.insert("ja".into(), "メディキット".into());
		Catalog::from_items([
			ItemRecord::new("tactical_mk2", "Tactical Mk. 2"),
			ItemRecord::new("vita_spray", "Vita Spray"),
			ItemRecord::new("vita_shot", "Vita Shot"),
			medkit,
			ItemRecord::new("rope", "Rope"),
		])
		.index(Language::English)
	}

	#[test]
	fn squashed_name_matches() {
		let index = index();
		let m = best_match(&["TACTICALMK.2"], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).unwrap();
		assert_eq!(m.entry.name, "Tactical Mk. 2");
		assert!(m.score >= 65.0);
	}

	#[test]
	fn joined_lines_beat_fragments() {
		let index = index();
		let m = best_match(&["Vita", "Spray", "Vita Spray"], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).unwrap();
		assert_eq!(m.entry.name, "Vita Spray");
		assert_eq!(m.score, 100.0);
		assert_eq!(m.candidate, "Vita Spray");
	}

	#[test]
	fn unrelated_text_is_rejected() {
		let index = index();
		assert!(best_match(&["qqqqzzzzxxxx"], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).is_none());
		assert!(best_match(&[], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).is_none());
	}

	#[test]
	fn unrelated_catalog_has_no_match() {
		let index = Catalog::from_items([
			ItemRecord::new("medkit", "Medkit"),
			ItemRecord::new("rope", "Rope"),
			ItemRecord::new("bandage", "Bandage"),
			ItemRecord::new("vita_spray", "Vita Spray"),
			ItemRecord::new("wolfpack", "Wolfpack"),
		])
		.index(Language::English);
		assert!(best_match(&["TACTICALMK.2"], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).is_none());
		assert!(best_match(&["TACTICALMK.2"], &index, &FallbackMatcher, DEFAULT_MIN_SCORE).is_none());
	}

	#[test]
	fn only_the_index_language_is_searched() {
		let index = index();
		assert!(best_match(&["メディキット"], &index, &PreciseMatcher, DEFAULT_MIN_SCORE).is_none());

		let ja = Catalog::from_items([{
			let mut medkit = ItemRecord::new("medkit", "Medkit");
			medkit.names.insert("ja".into(), "メディキット".into());
			medkit
		}])
		.index(Language::Japanese);
		let m = best_match(&["メディキット"], &ja, &PreciseMatcher, DEFAULT_MIN_SCORE).unwrap();
		assert_eq!(m.entry.item.id, "medkit");
	}

	#[test]
	fn ties_keep_candidate_order() {
		let index = index();
		let ranked = rank(&["Rope", "rope"], &index, &PreciseMatcher);
		assert_eq!(ranked[0].0, 0);
		assert_eq!(ranked[0].1.strategy, Strategy::WeightedRatio);
		assert!(ranked.windows(2).all(|w| w[0].1.score >= w[1].1.score));
	}

	#[test]
	fn short_candidates_are_skipped() {
		assert!(rank(&["Ro"], &index(), &PreciseMatcher).is_empty());
	}

	#[test]
	fn fallback_matcher() {
		let index = index();
		let m = best_match(&["Vita Sprey"], &index, MatcherKind::Fallback.matcher(), 50.0).unwrap();
		assert_eq!(m.entry.name, "Vita Spray");
		assert_eq!(m.strategy, Strategy::EditDistance);
	}
}
