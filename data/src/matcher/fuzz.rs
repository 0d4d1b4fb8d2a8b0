//! String similarity scores on a 0..=100 scale.
//!
//! Edit distances come from `strsim`; the composite scores follow the usual
//! fuzzy-matching recipes (token sorting, token sets, best partial window).
//! Callers are expected to lowercase both sides first.

use std::collections::BTreeSet;

/// Normalized Levenshtein similarity. Empty input on either side scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}
	strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best [`ratio`] of the shorter string against every equally long window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
	let (short, long) = if a.chars().count() <= b.chars().count() { (a, b) } else { (b, a) };
	let short_len = short.chars().count();
	if short_len == 0 {
		return 0.0;
	}

	let long = long.chars().collect::<Vec<_>>();
	if short_len == long.len() {
		return ratio(short, &long.iter().collect::<String>());
	}

	let mut best = 0.0f64;
	for window in long.windows(short_len) {
		best = best.max(ratio(short, &window.iter().collect::<String>()));
		if best >= 100.0 {
			break;
		}
	}
	best
}

/// Whitespace tokens, sorted and rejoined with single spaces.
pub fn sorted_tokens(s: &str) -> String {
	let mut tokens = s.split_whitespace().collect::<Vec<_>>();
	tokens.sort_unstable();
	tokens.join(" ")
}

/// Lowercased with whitespace, `.`, `-` and parentheses removed.
pub fn compact(s: &str) -> String {
	s.chars()
		.filter(|c| !c.is_whitespace() && !matches!(c, '.' | '-' | '(' | ')'))
		.flat_map(char::to_lowercase)
		.collect()
}

pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
	ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn token_set_ratio(a: &str, b: &str) -> f64 {
	token_set_with(a, b, ratio)
}

fn token_set_with(a: &str, b: &str, score: fn(&str, &str) -> f64) -> f64 {
	let a = a.split_whitespace().collect::<BTreeSet<_>>();
	let b = b.split_whitespace().collect::<BTreeSet<_>>();
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let join = |tokens: Vec<&str>| tokens.join(" ");
	let common = join(a.intersection(&b).copied().collect());
	let only_a = join(a.difference(&b).copied().collect());
	let only_b = join(b.difference(&a).copied().collect());

	let with_a = format!("{common} {only_a}").trim().to_string();
	let with_b = format!("{common} {only_b}").trim().to_string();

	score(&common, &with_a)
		.max(score(&common, &with_b))
		.max(score(&with_a, &with_b))
}

/// Weighted combination of the scores above, tolerant of length differences
/// and partial names.
pub fn weighted_ratio(a: &str, b: &str) -> f64 {
	const UNBASE_SCALE: f64 = 0.95;

	let (len_a, len_b) = (a.chars().count(), b.chars().count());
	if len_a == 0 || len_b == 0 {
		return 0.0;
	}

	let base = ratio(a, b);
	let len_ratio = len_a.max(len_b) as f64 / len_a.min(len_b) as f64;

	if len_ratio < 1.5 {
		let token_sort = token_sort_ratio(a, b) * UNBASE_SCALE;
		let token_set = token_set_ratio(a, b) * UNBASE_SCALE;
		return base.max(token_sort).max(token_set);
	}

	let partial_scale = if len_ratio < 8.0 { 0.9 } else { 0.6 };
	let partial = partial_ratio(a, b) * partial_scale;
	let partial_sort = partial_ratio(&sorted_tokens(a), &sorted_tokens(b)) * UNBASE_SCALE * partial_scale;
	let partial_set = token_set_with(a, b, partial_ratio) * UNBASE_SCALE * partial_scale;
	base.max(partial).max(partial_sort).max(partial_set)
}
