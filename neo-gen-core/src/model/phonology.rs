use serde::{Deserialize, Serialize};

/// Vowels, including the accented French variants.
const VOWELS: &str = "aeiouyàâäéèêëîïôöùûü";

/// Penalty for two vowels meeting at a morpheme boundary.
const VOWEL_VOWEL_PENALTY: f64 = 0.3;

/// Penalty for two consonants meeting at a morpheme boundary.
const CONSONANT_CONSONANT_PENALTY: f64 = 0.1;

/// Result of a phonological composition.
///
/// `plausibility` is a heuristic in `[0.0, 1.0]` based on the transitions
/// at both morpheme boundaries.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WordBuild {
	pub word: String,
	pub plausibility: f64,
}

fn lower(c: char) -> char {
	c.to_lowercase().next().unwrap_or(c)
}

/// Case-insensitive vowel test (accented vowels included).
pub(crate) fn is_vowel(c: char) -> bool {
	VOWELS.contains(lower(c))
}

pub(crate) fn starts_with_vowel(s: &str) -> bool {
	s.chars().next().is_some_and(is_vowel)
}

fn ends_with_vowel(s: &str) -> bool {
	s.chars().next_back().is_some_and(is_vowel)
}

/// `h` followed by a vowel ("hémo", "hydro"), treated like a vowel onset.
pub(crate) fn starts_with_silent_h(s: &str) -> bool {
	let mut chars = s.chars();
	matches!(chars.next(), Some('h' | 'H')) && chars.next().is_some_and(is_vowel)
}

fn same_letter(a: Option<char>, b: Option<char>) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => lower(a) == lower(b),
		_ => false,
	}
}

/// Concatenates a prefix, a root and a suffix into a pronounceable word.
///
/// Affix markers are stripped first (`bio-` → `bio`, `-logie` → `logie`).
///
/// With `use_filters` off the raw concatenation is returned with a
/// plausibility of exactly 1.0. Otherwise, in order:
/// 1. the prefix's final vowel is elided before a vowel or silent-h root,
///    unless a connector is given
/// 2. a letter doubled across the prefix/root boundary is collapsed,
///    unless the root starts with a vowel
/// 3. same for the root/suffix boundary, unless the suffix starts with a vowel
/// 4. the connector is inserted between prefix and root, unless the prefix
///    already ends with it or the root already starts with it
pub fn compose_word(prefix_form: &str, root_form: &str, suffix_form: &str, connector: Option<&str>, use_filters: bool) -> WordBuild {
	// Every marker hyphen is stripped, not just one: "bio--" reads as "bio"
	let prefix = prefix_form.trim().trim_end_matches('-');
	let mut root = root_form.trim().trim_end_matches('-').to_owned();
	let mut suffix = suffix_form.trim().trim_start_matches('-').to_owned();

	if !use_filters {
		return WordBuild {
			word: format!("{prefix}{root}{suffix}"),
			plausibility: 1.0,
		};
	}

	let connector = connector.unwrap_or("").trim();

	let mut prefix_adjusted = prefix.to_owned();
	let needs_elision = connector.is_empty()
		&& (starts_with_vowel(&root) || starts_with_silent_h(&root))
		&& ends_with_vowel(prefix);
	if needs_elision {
		prefix_adjusted.pop();
	}

	if same_letter(prefix_adjusted.chars().next_back(), root.chars().next()) && !starts_with_vowel(&root) {
		root.remove(0);
	}
	if same_letter(root.chars().next_back(), suffix.chars().next()) && !starts_with_vowel(&suffix) {
		suffix.remove(0);
	}

	let liaison = if !connector.is_empty() && !(prefix.ends_with(connector) || root.starts_with(connector)) {
		connector
	} else {
		""
	};

	let word = format!("{prefix_adjusted}{liaison}{root}{suffix}");
	let plausibility = plausibility(&prefix_adjusted, &root, &suffix, liaison);
	WordBuild { word, plausibility }
}

/// Scores the two boundaries of a composed word.
///
/// The left side of the second boundary is the liaison's last letter when a
/// liaison was inserted, the root's last letter otherwise.
fn plausibility(prefix: &str, root: &str, suffix: &str, liaison: &str) -> f64 {
	fn penalty(a: Option<char>, b: Option<char>) -> f64 {
		let (Some(a), Some(b)) = (a, b) else {
			return 0.0;
		};
		match (is_vowel(a), is_vowel(b)) {
			(true, true) => VOWEL_VOWEL_PENALTY,
			(false, false) => CONSONANT_CONSONANT_PENALTY,
			_ => 0.0,
		}
	}

	let mut score = 1.0;
	score -= penalty(prefix.chars().next_back(), root.chars().next());
	let second_left = if liaison.is_empty() {
		root.chars().next_back()
	} else {
		liaison.chars().next_back()
	};
	score -= penalty(second_left, suffix.chars().next());
	f64::clamp(score, 0.0, 1.0)
}
