use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::history::{HistoryEntry, HistoryMode};
use crate::model::generator::GenerationResult;

/// Words kept by the user, stored with the same record as the history so a
/// favorite can be recomputed from its provenance.
///
/// # Invariants
/// - At most one favorite per word (case-insensitive); adding a word again
///   replaces the previous record
/// - Ids start at 1 and are never reused
#[derive(Debug)]
pub struct InMemoryFavorites {
	next_id: AtomicU64,
	entries: Mutex<Vec<HistoryEntry>>,
}

impl Default for InMemoryFavorites {
	fn default() -> Self {
		Self::new()
	}
}

fn same_word(entry: &HistoryEntry, word: &str) -> bool {
	entry.word.to_lowercase() == word.to_lowercase()
}

impl InMemoryFavorites {
	pub fn new() -> Self {
		Self {
			next_id: AtomicU64::new(1),
			entries: Mutex::new(Vec::new()),
		}
	}

	/// Stores a result as a favorite and returns the stored record.
	pub fn add(&self, result: &GenerationResult, mode: HistoryMode) -> HistoryEntry {
		let mut entry = HistoryEntry::from_result(result, mode);
		entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);

		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		entries.retain(|e| !same_word(e, &entry.word));
		entries.push(entry.clone());
		entry
	}

	/// Removes the favorite for `word`. Returns whether one was removed.
	pub fn remove(&self, word: &str) -> bool {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let before = entries.len();
		entries.retain(|e| !same_word(e, word));
		entries.len() != before
	}

	pub fn remove_by_id(&self, id: u64) -> bool {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let before = entries.len();
		entries.retain(|e| e.id != id);
		entries.len() != before
	}

	pub fn contains(&self, word: &str) -> bool {
		self.get(word).is_some()
	}

	pub fn get(&self, word: &str) -> Option<HistoryEntry> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		entries.iter().find(|e| same_word(e, word)).cloned()
	}

	/// Every favorite, newest first.
	pub fn list(&self) -> Vec<HistoryEntry> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		entries.iter().rev().cloned().collect()
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::definition::DefinitionMode;
	use crate::model::entry::{Prefix, Root, Suffix};
	use crate::model::generator::Provenance;

	fn result(word: &str) -> GenerationResult {
		GenerationResult {
			word: word.to_owned(),
			definition: "étude d'air".to_owned(),
			decomposition: "bio- + aéro- + -logie".to_owned(),
			plausibility: 0.9,
			provenance: None,
		}
	}

	#[test]
	fn adding_twice_keeps_one_record() {
		let favorites = InMemoryFavorites::new();
		let first = favorites.add(&result("Biaérologie"), HistoryMode::Random);
		let second = favorites.add(&result("biaérologie"), HistoryMode::Manual);
		assert_eq!(favorites.len(), 1);
		assert!(second.id > first.id);
		assert_eq!(favorites.get("BIAÉROLOGIE").map(|e| e.mode), Some(HistoryMode::Manual));
	}

	#[test]
	fn lists_newest_first_and_removes() {
		let favorites = InMemoryFavorites::new();
		favorites.add(&result("un"), HistoryMode::Simple);
		let deux = favorites.add(&result("deux"), HistoryMode::Simple);
		favorites.add(&result("trois"), HistoryMode::Simple);

		let words: Vec<String> = favorites.list().into_iter().map(|e| e.word).collect();
		assert_eq!(words, vec!["trois", "deux", "un"]);

		assert!(favorites.remove("Un"));
		assert!(!favorites.contains("un"));
		assert!(favorites.remove_by_id(deux.id));
		assert!(!favorites.remove_by_id(deux.id));
		assert_eq!(favorites.len(), 1);
	}

	#[test]
	fn keeps_provenance_for_recompute() {
		let provenance = Provenance::from_entries(
			&Prefix::new("p", "bio-", "vie"),
			&Root::new("r", "aéro-", "air"),
			&Suffix::new("s", "-logie", "étude").with_pos("nom"),
		);
		let favorites = InMemoryFavorites::new();
		favorites.add(&provenance.compose(DefinitionMode::Technical, true), HistoryMode::Random);

		let stored = favorites.get("biaérologie").and_then(|e| e.provenance).unwrap();
		assert_eq!(stored.compose(DefinitionMode::Technical, false).word, "bioaérologie");
	}
}
