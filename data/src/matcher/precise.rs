use super::{Hit, Matcher, Strategy, extract_one, fuzz};
use crate::CatalogIndex;

/// Three strategies per candidate: weighted ratio, compacted ratio with a
/// length bonus, and token-sorted ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreciseMatcher;

/// Up to this many bonus points for compacted names of equal length, 2 fewer per character of difference.
const LENGTH_BONUS: f64 = 10.0;

impl Matcher for PreciseMatcher {
	fn hits(&self, candidate: &str, index: &CatalogIndex) -> Vec<Hit> {
		let lower = candidate.to_lowercase();
		let compact = fuzz::compact(&lower);
		let sorted = fuzz::sorted_tokens(&lower);
		let mut hits = Vec::with_capacity(3);

		if let Some((entry, score)) = extract_one(index, |k| fuzz::weighted_ratio(&lower, &k.lower)) {
			hits.push(Hit { entry, score, strategy: Strategy::WeightedRatio });
		}

		if let Some((entry, score)) = extract_one(index, |k| fuzz::ratio(&compact, &k.compact)) {
			let target = index.keys()[entry].compact.chars().count();
			let diff = compact.chars().count().abs_diff(target) as f64;
			let bonus = (LENGTH_BONUS - diff * 2.0).max(0.0);
			hits.push(Hit {
				entry,
				score: (score + bonus).min(100.0),
				strategy: Strategy::Normalized,
			});
		}

		if let Some((entry, score)) = extract_one(index, |k| fuzz::ratio(&sorted, &k.sorted)) {
			hits.push(Hit { entry, score, strategy: Strategy::TokenSort });
		}

		hits
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Catalog, ItemRecord, Language};

	#[test]
	fn every_strategy_reports() {
		let index = Catalog::from_items([ItemRecord::new("a", "Tactical Mk. 2"), ItemRecord::new("b", "Rope")]).index(Language::English);
		let hits = PreciseMatcher.hits("Mk. 2 Tactical", &index);
		let strategies = hits.iter().map(|h| h.strategy).collect::<Vec<_>>();
		assert_eq!(strategies, [Strategy::WeightedRatio, Strategy::Normalized, Strategy::TokenSort]);
		assert!(hits.iter().all(|h| h.entry == 0));
		assert_eq!(hits[2].score, 100.0);
	}

	#[test]
	fn length_bonus_is_capped() {
		let index = Catalog::from_items([ItemRecord::new("a", "Tactical Mk. 3")]).index(Language::English);
		let normalized = |candidate: &str| {
			PreciseMatcher
				.hits(candidate, &index)
				.into_iter()
				.find(|h| h.strategy == Strategy::Normalized)
				.unwrap()
				.score
		};
		// One substitution in 11 characters plus the full bonus overflows.
		assert_eq!(normalized("TACTICALMK.2"), 100.0);
		// Two edits in 12 characters, one character longer: bonus of 8.
		let expected = (1.0 - 2.0 / 12.0) * 100.0 + 8.0;
		assert!((normalized("TACTICALMK.22") - expected).abs() < 1e-9);
	}
}
