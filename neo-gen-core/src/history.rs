use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::generator::{GenerationResult, Provenance};

/// How a recorded word was produced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
	Random,
	Simple,
	Manual,
}

impl fmt::Display for HistoryMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			HistoryMode::Random => "random",
			HistoryMode::Simple => "simple",
			HistoryMode::Manual => "manual",
		};
		f.write_str(label)
	}
}

/// One generated word as stored by a history sink.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HistoryEntry {
	/// Assigned by the store on insertion, 0 until then.
	#[serde(default)]
	pub id: u64,
	pub word: String,
	pub definition: String,
	pub decomposition: String,
	pub mode: HistoryMode,
	/// Milliseconds since the Unix epoch.
	pub created_at: u64,
	pub provenance: Option<Provenance>,
}

impl HistoryEntry {
	/// Snapshots a result, stamped with the current time.
	pub fn from_result(result: &GenerationResult, mode: HistoryMode) -> Self {
		Self {
			id: 0,
			word: result.word.clone(),
			definition: result.definition.clone(),
			decomposition: result.decomposition.clone(),
			mode,
			created_at: now_millis(),
			provenance: result.provenance.clone(),
		}
	}
}

fn now_millis() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or(0)
}

/// Write-only destination for successful generations.
pub trait HistorySink {
	fn record(&self, entry: HistoryEntry);
}

/// Sink that drops everything.
impl HistorySink for () {
	fn record(&self, _entry: HistoryEntry) {}
}

impl<H: HistorySink + ?Sized> HistorySink for Arc<H> {
	fn record(&self, entry: HistoryEntry) {
		(**self).record(entry);
	}
}

/// Bounded in-memory history. The oldest entry is dropped first.
///
/// Ids are assigned in insertion order, starting at 1, and never reused.
#[derive(Debug)]
pub struct InMemoryHistory {
	limit: usize,
	next_id: AtomicU64,
	entries: Mutex<VecDeque<HistoryEntry>>,
}

impl InMemoryHistory {
	pub fn new(limit: usize) -> Self {
		Self {
			limit,
			next_id: AtomicU64::new(1),
			entries: Mutex::new(VecDeque::new()),
		}
	}

	/// Up to `limit` entries, newest first.
	pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		entries.iter().rev().take(limit).cloned().collect()
	}

	/// Most recent entry for a word (case-insensitive).
	pub fn latest_by_word(&self, word: &str) -> Option<HistoryEntry> {
		let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let word = word.to_lowercase();
		entries.iter().rev().find(|e| e.word.to_lowercase() == word).cloned()
	}

	/// Removes the entry with the given id. Returns whether one was removed.
	pub fn delete(&self, id: u64) -> bool {
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		let before = entries.len();
		entries.retain(|e| e.id != id);
		entries.len() != before
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn clear(&self) {
		self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
	}
}

impl HistorySink for InMemoryHistory {
	fn record(&self, mut entry: HistoryEntry) {
		if self.limit == 0 {
			return;
		}
		entry.id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
		while entries.len() >= self.limit {
			entries.pop_front();
		}
		entries.push_back(entry);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(word: &str) -> HistoryEntry {
		HistoryEntry {
			id: 0,
			word: word.to_owned(),
			definition: "relatif à test".to_owned(),
			decomposition: word.to_owned(),
			mode: HistoryMode::Random,
			created_at: now_millis(),
			provenance: None,
		}
	}

	#[test]
	fn keeps_the_newest_entries() {
		let history = InMemoryHistory::new(3);
		for word in ["un", "deux", "trois", "quatre"] {
			history.record(entry(word));
		}
		assert_eq!(history.len(), 3);
		let words: Vec<String> = history.recent(10).into_iter().map(|e| e.word).collect();
		assert_eq!(words, vec!["quatre", "trois", "deux"]);
		assert_eq!(history.recent(1)[0].word, "quatre");
	}

	#[test]
	fn finds_latest_by_word() {
		let history = InMemoryHistory::new(10);
		history.record(entry("Biaérologie"));
		let mut again = entry("biaérologie");
		again.mode = HistoryMode::Manual;
		history.record(again);
		assert_eq!(history.latest_by_word("BIAÉROLOGIE").map(|e| e.mode), Some(HistoryMode::Manual));
		assert!(history.latest_by_word("absent").is_none());
	}

	#[test]
	fn deletes_by_id() {
		let history = InMemoryHistory::new(10);
		for word in ["un", "deux", "trois"] {
			history.record(entry(word));
		}
		let ids: Vec<u64> = history.recent(10).iter().map(|e| e.id).collect();
		assert_eq!(ids, vec![3, 2, 1]);

		assert!(history.delete(2));
		assert!(!history.delete(2));
		let words: Vec<String> = history.recent(10).into_iter().map(|e| e.word).collect();
		assert_eq!(words, vec!["trois", "un"]);

		// Ids keep growing after a deletion
		history.record(entry("quatre"));
		assert_eq!(history.recent(1)[0].id, 4);
	}

	#[test]
	fn clear_and_zero_limit() {
		let history = InMemoryHistory::new(0);
		history.record(entry("rien"));
		assert!(history.is_empty());

		let history = InMemoryHistory::new(2);
		history.record(entry("mot"));
		history.clear();
		assert!(history.is_empty());
	}

	#[test]
	fn mode_labels() {
		assert_eq!(HistoryMode::Manual.to_string(), "manual");
		assert_eq!(HistoryMode::Simple.to_string(), "simple");
	}
}
