use std::collections::HashSet;

use rand::Rng;

use super::entry::{parse_tags, Morpheme};

/// Weight used when an entry carries none.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Computes the tag-aware weight of a lexicon entry.
///
/// - The base weight defaults to 1.0 when absent and is clamped to >= 0.
/// - With no selected tags, the base weight is returned unchanged.
/// - Otherwise an entry sharing no tag with the selection weighs 0, and an
///   entry sharing `n` tags weighs `base * (1 + n * intensity)`.
/// - The result saturates at `f64::MAX` instead of overflowing.
///
/// `selected` must already be normalized (see `entry::normalize_tags`).
pub fn effective_weight(base: Option<f64>, raw_tags: Option<&str>, selected: &HashSet<String>, intensity: f64) -> f64 {
	let base = base.filter(|w| w.is_finite()).unwrap_or(DEFAULT_WEIGHT).max(0.0);
	if selected.is_empty() {
		return base;
	}

	let entry_tags = parse_tags(raw_tags.unwrap_or(""));
	let match_count = entry_tags.intersection(selected).count();
	if match_count == 0 {
		return 0.0;
	}
	let boost = (1.0 + match_count as f64 * intensity.max(0.0)).min(f64::MAX);
	(base * boost).min(f64::MAX)
}

/// Draws one item with probability proportional to `weight_of`.
///
/// Performs:
/// - an O(n) pass to compute the weights and their total
/// - a uniform draw in `[0, total)` followed by a cumulative scan
///
/// Negative or NaN weights count as 0 and infinite ones as `f64::MAX`. When
/// the total overflows, weights are rescaled by the largest one first. When
/// every weight is 0 the draw falls back to a uniform pick over all items.
///
/// Returns `None` only if `items` is empty.
pub fn weighted_choice<'a, T, R, F>(items: &'a [T], rng: &mut R, mut weight_of: F) -> Option<&'a T>
where
	R: Rng + ?Sized,
	F: FnMut(&T) -> f64,
{
	if items.is_empty() {
		return None;
	}

	let mut weights: Vec<f64> = items
		.iter()
		.map(|item| {
			let w = weight_of(item);
			if w.is_nan() { 0.0 } else { w.clamp(0.0, f64::MAX) }
		})
		.collect();
	let mut total: f64 = weights.iter().sum();
	if total.is_infinite() {
		let peak = weights.iter().copied().fold(0.0, f64::max);
		weights.iter_mut().for_each(|w| *w /= peak);
		total = weights.iter().sum();
	}
	if total <= 0.0 {
		return items.get(rng.random_range(0..items.len()));
	}

	let draw = rng.random_range(0.0..total);
	let mut cumulative = 0.0;
	let mut fallback = None;
	for (item, weight) in items.iter().zip(&weights) {
		if *weight <= 0.0 {
			continue;
		}
		cumulative += weight;
		if draw < cumulative {
			return Some(item);
		}
		fallback = Some(item);
	}

	// Rounding can leave `draw` just above the accumulated sum
	fallback
}

/// Draws a lexicon entry using its tag-aware effective weight.
pub fn pick_morpheme<'a, M, R>(items: &'a [M], selected: &HashSet<String>, intensity: f64, rng: &mut R) -> Option<&'a M>
where
	M: Morpheme,
	R: Rng + ?Sized,
{
	weighted_choice(items, rng, |m| effective_weight(m.weight(), m.raw_tags(), selected, intensity))
}
