use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::entry::LexItem;
use super::phonology::is_vowel;
use crate::error::GeneratorError;

/// Attempts made to draw a second word distinct from the first.
const MAX_PAIR_ATTEMPTS: usize = 10;

/// Length the candidate scoring aims for.
const TARGET_LENGTH: i64 = 9;

/// Inclusive bounds on the core length (hyphens excluded) of a result.
const MIN_LENGTH: usize = 6;
const MAX_LENGTH: usize = 16;

/// Shortest overlap accepted when splicing two words.
const MIN_OVERLAP: usize = 3;

/// Fragments kept by the head/tail merge: at least 4 chars, ~40% of the word, at most 6.
const FRAGMENT_MIN: usize = 4;
const FRAGMENT_MAX: usize = 6;

/// Output of a blend: the new word and the two words it was made from.
#[derive(Clone, Debug, PartialEq)]
pub struct Blend {
	pub word: String,
	pub left: String,
	pub right: String,
}

/// Heuristic word blender used by the simple generation mode.
///
/// Holds a pool of free-form words and a pool of decorative suffixes.
///
/// # Responsibilities
/// - Draw two distinct words, optionally restricted by tag overlap
/// - Generate blend candidates (overlap splice, head/tail merge, vowel link,
///   hyphenated join, suffixed words) and keep the best-scoring one
/// - Normalize the result (no triple letters, bounded length)
#[derive(Clone, Debug, Default)]
pub struct WordBlender {
	words: Vec<LexItem>,
	suffixes: Vec<String>,
}

impl WordBlender {
	pub fn new(words: Vec<LexItem>, suffixes: Vec<String>) -> Self {
		Self { words, suffixes }
	}

	pub fn words(&self) -> &[LexItem] {
		&self.words
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}

	/// Draws two words and blends them.
	///
	/// `selected` must be normalized tags. When no word shares a tag with the
	/// selection, the whole pool is used.
	///
	/// # Errors
	/// Returns `EmptyBlendLexicon` if the word pool is empty.
	pub fn generate<R: Rng + ?Sized>(&self, selected: &HashSet<String>, rng: &mut R) -> Result<Blend, GeneratorError> {
		let (left, right) = self.pick_pair(selected, rng)?;
		let word = self.blend(&left.word, &right.word, rng);
		Ok(Blend {
			word,
			left: left.word.clone(),
			right: right.word.clone(),
		})
	}

	/// Picks two words uniformly, retrying a bounded number of times while
	/// the second equals the first (case-insensitive) or is shorter than 3.
	fn pick_pair<R: Rng + ?Sized>(&self, selected: &HashSet<String>, rng: &mut R) -> Result<(&LexItem, &LexItem), GeneratorError> {
		let filtered: Vec<&LexItem> = if selected.is_empty() {
			Vec::new()
		} else {
			self.words.iter().filter(|item| !item.tags.is_disjoint(selected)).collect()
		};
		let pool: Vec<&LexItem> = if filtered.is_empty() { self.words.iter().collect() } else { filtered };

		let first = *pool.choose(rng).ok_or(GeneratorError::EmptyBlendLexicon)?;
		let mut second = *pool.choose(rng).ok_or(GeneratorError::EmptyBlendLexicon)?;
		let mut attempts = 0;
		while (second.word.to_lowercase() == first.word.to_lowercase() || second.word.chars().count() < 3)
			&& attempts < MAX_PAIR_ATTEMPTS
		{
			second = *pool.choose(rng).ok_or(GeneratorError::EmptyBlendLexicon)?;
			attempts += 1;
		}
		Ok((first, second))
	}

	/// Blends two words into one.
	///
	/// Every candidate is scored and the best one is kept (first found wins a
	/// tie). A decorative suffix is then tried on it, and finally the result is
	/// normalized and clipped. If the normalized winner is no longer
	/// pronounceable, the next candidates are tried in score order.
	pub fn blend<R: Rng + ?Sized>(&self, a: &str, b: &str, rng: &mut R) -> String {
		let a: String = a.trim().chars().filter(|c| *c != ' ').collect();
		let b: String = b.trim().chars().filter(|c| *c != ' ').collect();

		let mut candidates: Vec<String> = Vec::new();
		candidates.extend(overlap_merge(&a, &b));
		candidates.extend(overlap_merge(&b, &a));
		candidates.push(head_tail(&a, &b));
		candidates.push(head_tail(&b, &a));
		candidates.push(link_with_vowel(&a, &b));
		candidates.push(link_with_vowel(&b, &a));
		if let Some(suffix) = self.suffixes.choose(rng) {
			for word in [&a, &b] {
				if (4..=9).contains(&word.chars().count()) {
					candidates.push(format!("{word}{suffix}"));
				}
			}
		}
		candidates.push(format!("{a}-{b}"));

		let mut ranked: Vec<(String, i64)> = candidates
			.into_iter()
			.map(|c| {
				let score = score_candidate(&c, &a, &b);
				(c, score)
			})
			.collect();
		// Stable: equal scores keep generation order
		ranked.sort_by(|x, y| y.1.cmp(&x.1));

		let mut best = ranked[0].0.clone();
		if let Some(suffix) = self.suffixes.choose(rng) {
			let trial = collapse_triples(&format!("{best}{suffix}"));
			if (MIN_LENGTH..=MAX_LENGTH).contains(&core_len(&trial)) && is_pronounceable(&trial) {
				best = trial;
			}
		}

		let cleaned = finalize(&best);
		if is_pronounceable(&cleaned) {
			return cleaned;
		}
		ranked
			.iter()
			.skip(1)
			.map(|(c, _)| finalize(c))
			.find(|c| is_pronounceable(c))
			.unwrap_or(cleaned)
	}
}

/// Collapses triple letters and clips to the maximum length.
fn finalize(word: &str) -> String {
	let cleaned = collapse_triples(word);
	if core_len(&cleaned) <= MAX_LENGTH {
		cleaned
	} else {
		cleaned.chars().take(MAX_LENGTH).collect()
	}
}

fn core_len(s: &str) -> usize {
	s.chars().filter(|c| *c != '-').count()
}

fn take_chars(s: &str, n: usize) -> String {
	s.chars().take(n).collect()
}

fn take_last_chars(s: &str, n: usize) -> String {
	let len = s.chars().count();
	s.chars().skip(len.saturating_sub(n)).collect()
}

/// Splices `b` onto `a` over their longest shared edge (`a`'s end == `b`'s start).
///
/// Returns `None` when the overlap is shorter than 3 characters.
fn overlap_merge(a: &str, b: &str) -> Option<String> {
	let al: Vec<char> = a.to_lowercase().chars().collect();
	let bl: Vec<char> = b.to_lowercase().chars().collect();
	let b_chars: Vec<char> = b.chars().collect();
	let max = al.len().min(bl.len()).min(b_chars.len());
	(MIN_OVERLAP..=max)
		.rev()
		.find(|&k| al[al.len() - k..] == bl[..k])
		.map(|k| {
			let mut merged = a.to_owned();
			merged.extend(&b_chars[k..]);
			merged
		})
}

fn fragment_len(word_len: usize) -> usize {
	FRAGMENT_MIN.max((word_len * 2 / 5).min(FRAGMENT_MAX))
}

/// Head of `a` followed by tail of `b`, vowel-linked if the raw join is unpronounceable.
fn head_tail(a: &str, b: &str) -> String {
	let head = take_chars(a, fragment_len(a.chars().count()));
	let tail = take_last_chars(b, fragment_len(b.chars().count()));
	let raw = format!("{head}{tail}");
	if is_pronounceable(&raw) { raw } else { link_with_vowel(&head, &tail) }
}

/// Joins two fragments, inserting an `o` between two consonants.
fn link_with_vowel(left: &str, right: &str) -> String {
	match (left.chars().next_back(), right.chars().next()) {
		(Some(l), Some(r)) if !is_vowel(l) && !is_vowel(r) => format!("{left}o{right}"),
		_ => format!("{left}{right}"),
	}
}

/// Drops any letter that would make a run of three identical letters.
fn collapse_triples(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut prev1: Option<char> = None;
	let mut prev2: Option<char> = None;
	for c in s.chars() {
		let lc = c.to_lowercase().next().unwrap_or(c);
		if prev1 == Some(lc) && prev2 == Some(lc) {
			continue;
		}
		out.push(c);
		prev2 = prev1;
		prev1 = Some(lc);
	}
	out
}

fn score_candidate(candidate: &str, a: &str, b: &str) -> i64 {
	let s = candidate.to_lowercase();
	let mut score: i64 = if is_pronounceable(&s) { 5 } else { -3 };
	for source in [a, b] {
		let overlap = longest_common_substring(&s, &source.to_lowercase());
		if overlap >= 4 {
			score += overlap as i64;
		}
	}
	if s.contains('-') {
		score -= 2;
	}
	score - (core_len(&s) as i64 - TARGET_LENGTH).abs()
}

/// Length of the longest run of characters shared by `x` and `y`.
fn longest_common_substring(x: &str, y: &str) -> usize {
	let x: Vec<char> = x.chars().collect();
	let y: Vec<char> = y.chars().collect();
	let mut best = 0;
	let mut prev = vec![0usize; y.len() + 1];
	for i in 1..=x.len() {
		let mut row = vec![0usize; y.len() + 1];
		for j in 1..=y.len() {
			if x[i - 1] == y[j - 1] {
				row[j] = prev[j - 1] + 1;
				best = best.max(row[j]);
			}
		}
		prev = row;
	}
	best
}

/// A word is pronounceable when it has a vowel, no run of 4+ consonants and
/// every `q` is followed by `u`. Non-letters are ignored for the consonant run.
pub fn is_pronounceable(s: &str) -> bool {
	let mut consonant_run = 0;
	let mut has_vowel = false;
	for c in s.chars().filter(|c| c.is_alphabetic()) {
		if is_vowel(c) {
			consonant_run = 0;
			has_vowel = true;
		} else {
			consonant_run += 1;
			if consonant_run >= 4 {
				return false;
			}
		}
	}
	if !has_vowel {
		return false;
	}
	let lower: Vec<char> = s.to_lowercase().chars().collect();
	lower
		.iter()
		.enumerate()
		.all(|(i, c)| *c != 'q' || lower.get(i + 1) == Some(&'u'))
}
