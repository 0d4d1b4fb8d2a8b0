use super::{Hit, Matcher, Strategy, extract_one};
use crate::CatalogIndex;

/// Single edit-distance strategy for when the precise scorers are unwanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMatcher;

/// Close matches must keep at least this share of characters (0..=100).
const CUTOFF: f64 = 50.0;

impl Matcher for FallbackMatcher {
	fn hits(&self, candidate: &str, index: &CatalogIndex) -> Vec<Hit> {
		let lower = candidate.to_lowercase();
		let len = lower.chars().count();

		extract_one(index, |k| {
			let longest = len.max(k.lower.chars().count());
			if longest == 0 {
				return 0.0;
			}
			let distance = levenshtein::levenshtein(&lower, &k.lower);
			(1.0 - distance as f64 / longest as f64) * 100.0
		})
		.filter(|(_, score)| *score >= CUTOFF)
		.map(|(entry, score)| Hit { entry, score, strategy: Strategy::EditDistance })
		.into_iter()
		.collect()
	}
}
