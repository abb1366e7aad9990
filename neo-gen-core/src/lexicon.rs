use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::io::{normalize_folder, read_csv};
use crate::model::blender::WordBlender;
use crate::model::entry::{parse_tags, parse_weight, LexItem, Morpheme, Prefix, Root, Suffix};

pub const PREFIX_FILE: &str = "prefixes.csv";
pub const ROOT_FILE: &str = "roots.csv";
pub const SUFFIX_FILE: &str = "suffixes.csv";
pub const BLEND_WORDS_FILE: &str = "simple_lexicon.csv";
pub const BLEND_SUFFIXES_FILE: &str = "simple_suffixes.csv";

/// Binary snapshot written next to the seed files after the first parse.
pub const BINARY_CACHE: &str = "lexicon.bin";

/// Read access to the morpheme tables.
///
/// List methods take a tag (empty for everything) and return entries ordered
/// by weight, heaviest first, entries without weight last, ties in insertion
/// order.
pub trait LexiconStore {
	fn list_prefixes_by_tag(&self, tag: &str) -> Arc<Vec<Prefix>>;

	/// Roots are filtered on their domain.
	fn list_roots_by_tag(&self, tag: &str) -> Arc<Vec<Root>>;

	fn list_suffixes_by_tag(&self, tag: &str) -> Arc<Vec<Suffix>>;

	fn search_prefixes(&self, query: &str) -> Vec<Prefix>;

	fn search_roots(&self, query: &str) -> Vec<Root>;

	fn search_suffixes(&self, query: &str) -> Vec<Suffix>;

	/// Sorted, normalized union of every tag and root domain.
	fn distinct_tags(&self) -> Vec<String>;
}

/// The three morpheme tables, as parsed from the seed files.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LexiconTables {
	pub prefixes: Vec<Prefix>,
	pub roots: Vec<Root>,
	pub suffixes: Vec<Suffix>,
}

fn field(row: &[String], index: usize) -> Option<String> {
	row.get(index).map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_owned)
}

/// Rows without an id or a form are dropped.
fn required(row: &[String]) -> Option<(String, String)> {
	Some((field(row, 0)?, field(row, 1)?))
}

impl LexiconTables {
	/// Parses `prefixes.csv`, `roots.csv` and `suffixes.csv` from a directory.
	///
	/// # Errors
	/// Returns an error if one of the files cannot be read.
	pub fn from_csv_dir<P: AsRef<Path>>(dir: P) -> Result<Self, GeneratorError> {
		let dir = dir.as_ref();

		let prefixes = read_csv(dir.join(PREFIX_FILE))?
			.iter()
			.filter_map(|row| {
				let (id, form) = required(row)?;
				Some(Prefix {
					id,
					form,
					alt_forms: field(row, 2),
					gloss: field(row, 3).unwrap_or_default(),
					origin: field(row, 4),
					connector: field(row, 5),
					phon_rules: field(row, 6),
					tags: field(row, 7),
					weight: field(row, 8).and_then(|w| parse_weight(&w)),
				})
			})
			.collect();

		let roots = read_csv(dir.join(ROOT_FILE))?
			.iter()
			.filter_map(|row| {
				let (id, form) = required(row)?;
				Some(Root {
					id,
					form,
					alt_forms: field(row, 2),
					gloss: field(row, 3).unwrap_or_default(),
					origin: field(row, 4),
					domain: field(row, 5),
					connector_pref: field(row, 6),
					examples: field(row, 7),
					weight: field(row, 8).and_then(|w| parse_weight(&w)),
				})
			})
			.collect();

		let suffixes = read_csv(dir.join(SUFFIX_FILE))?
			.iter()
			.filter_map(|row| {
				let (id, form) = required(row)?;
				Some(Suffix {
					id,
					form,
					alt_forms: field(row, 2),
					gloss: field(row, 3).unwrap_or_default(),
					origin: field(row, 4),
					pos_out: field(row, 5),
					def_template: field(row, 6),
					tags: field(row, 7),
					weight: field(row, 8).and_then(|w| parse_weight(&w)),
				})
			})
			.collect();

		Ok(Self { prefixes, roots, suffixes })
	}
}

/// Cached listings, one map per morpheme class, keyed by normalized tag.
#[derive(Default)]
struct ListCache {
	prefixes: HashMap<String, Arc<Vec<Prefix>>>,
	roots: HashMap<String, Arc<Vec<Root>>>,
	suffixes: HashMap<String, Arc<Vec<Suffix>>>,
}

impl ListCache {
	fn clear(&mut self) {
		self.prefixes.clear();
		self.roots.clear();
		self.suffixes.clear();
	}
}

/// Ties a morpheme type to its table and its cache slot.
trait Tabled: Morpheme {
	fn table(tables: &LexiconTables) -> &[Self];
	fn slot(cache: &mut ListCache) -> &mut HashMap<String, Arc<Vec<Self>>>;
}

impl Tabled for Prefix {
	fn table(tables: &LexiconTables) -> &[Self] {
		&tables.prefixes
	}

	fn slot(cache: &mut ListCache) -> &mut HashMap<String, Arc<Vec<Self>>> {
		&mut cache.prefixes
	}
}

impl Tabled for Root {
	fn table(tables: &LexiconTables) -> &[Self] {
		&tables.roots
	}

	fn slot(cache: &mut ListCache) -> &mut HashMap<String, Arc<Vec<Self>>> {
		&mut cache.roots
	}
}

impl Tabled for Suffix {
	fn table(tables: &LexiconTables) -> &[Self] {
		&tables.suffixes
	}

	fn slot(cache: &mut ListCache) -> &mut HashMap<String, Arc<Vec<Self>>> {
		&mut cache.suffixes
	}
}

/// Heaviest first, weightless last. `sort_by` is stable, ties keep insertion order.
fn sort_by_weight<M: Morpheme>(items: &mut [M]) {
	items.sort_by(|a, b| match (a.weight(), b.weight()) {
		(Some(x), Some(y)) => y.total_cmp(&x),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	});
}

/// In-memory lexicon store with a read-through cache of its listings.
///
/// # Invariants
/// - A cache slot is populated at most once at a time: the check and the
///   population both happen under the cache mutex
/// - `reseed` replaces the tables and clears every slot while holding the
///   cache mutex, so no reader observes a slot built from the old tables
///
/// Lock order is always cache, then tables.
#[derive(Debug, Default)]
pub struct Lexicon {
	tables: RwLock<LexiconTables>,
	cache: Mutex<ListCache>,
}

impl std::fmt::Debug for ListCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ListCache")
			.field("prefixes", &self.prefixes.len())
			.field("roots", &self.roots.len())
			.field("suffixes", &self.suffixes.len())
			.finish()
	}
}

impl Lexicon {
	/// Builds a store over already loaded tables.
	pub fn from_tables(tables: LexiconTables) -> Self {
		Self {
			tables: RwLock::new(tables),
			cache: Mutex::new(ListCache::default()),
		}
	}

	/// Loads a lexicon from a directory of seed files.
	///
	/// - Reads the binary snapshot (`lexicon.bin`, postcard) when it exists
	/// - Otherwise parses the CSV seed files and writes the snapshot for
	///   future fast loading
	///
	/// # Errors
	/// Returns an error if the files cannot be read or the snapshot is corrupt.
	pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, GeneratorError> {
		let folder = normalize_folder(dir.as_ref());
		let binary_data_path = folder.join(BINARY_CACHE);
		let tables: LexiconTables = if binary_data_path.exists() {
			let bytes = std::fs::read(&binary_data_path)?;
			let tables = postcard::from_bytes(&bytes)?;
			info!("Lexicon loaded from {}", binary_data_path.display());
			tables
		} else {
			Self::read_seed_files(&folder)?
		};
		Ok(Self::from_tables(tables))
	}

	/// Parses the CSV seed files and refreshes the binary snapshot.
	fn read_seed_files(folder: &Path) -> Result<LexiconTables, GeneratorError> {
		let tables = LexiconTables::from_csv_dir(folder)?;
		let bytes = postcard::to_stdvec(&tables)?;
		std::fs::write(folder.join(BINARY_CACHE), bytes)?;
		info!(
			"Lexicon parsed from {}: {} prefixes, {} roots, {} suffixes",
			folder.display(),
			tables.prefixes.len(),
			tables.roots.len(),
			tables.suffixes.len()
		);
		Ok(tables)
	}

	/// Re-parses the CSV seed files (ignoring the snapshot) and reseeds.
	pub fn reload<P: AsRef<Path>>(&self, dir: P) -> Result<(), GeneratorError> {
		let folder = normalize_folder(dir.as_ref());
		let tables = Self::read_seed_files(&folder)?;
		self.reseed(tables);
		Ok(())
	}

	/// Replaces every table and invalidates the cache in one step.
	pub fn reseed(&self, tables: LexiconTables) {
		let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
		let mut current = self.tables.write().unwrap_or_else(PoisonError::into_inner);
		*current = tables;
		cache.clear();
		info!("Lexicon reseeded, cache cleared");
	}

	/// Drops every cached listing.
	pub fn invalidate(&self) {
		self.cache.lock().unwrap_or_else(PoisonError::into_inner).clear();
	}

	/// Number of prefixes, roots and suffixes.
	pub fn counts(&self) -> (usize, usize, usize) {
		let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
		(tables.prefixes.len(), tables.roots.len(), tables.suffixes.len())
	}

	fn list_by_tag<M: Tabled>(&self, tag: &str) -> Arc<Vec<M>> {
		let key = tag.trim().to_lowercase();
		let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(hit) = M::slot(&mut cache).get(&key) {
			return Arc::clone(hit);
		}

		let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
		let mut items: Vec<M> = M::table(&tables)
			.iter()
			.filter(|m| key.is_empty() || m.raw_tags().is_some_and(|t| t.to_lowercase().contains(&key)))
			.cloned()
			.collect();
		sort_by_weight(&mut items);
		debug!("Cache slot populated: {} '{}' ({} entries)", M::KIND, key, items.len());

		let items = Arc::new(items);
		M::slot(&mut cache).insert(key, Arc::clone(&items));
		items
	}

	fn search<M: Tabled>(&self, query: &str) -> Vec<M> {
		let query = query.trim().to_lowercase();
		let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
		let mut items: Vec<M> = M::table(&tables)
			.iter()
			.filter(|m| m.form().to_lowercase().contains(&query))
			.cloned()
			.collect();
		sort_by_weight(&mut items);
		items
	}
}

impl LexiconStore for Lexicon {
	fn list_prefixes_by_tag(&self, tag: &str) -> Arc<Vec<Prefix>> {
		self.list_by_tag(tag)
	}

	fn list_roots_by_tag(&self, tag: &str) -> Arc<Vec<Root>> {
		self.list_by_tag(tag)
	}

	fn list_suffixes_by_tag(&self, tag: &str) -> Arc<Vec<Suffix>> {
		self.list_by_tag(tag)
	}

	fn search_prefixes(&self, query: &str) -> Vec<Prefix> {
		self.search(query)
	}

	fn search_roots(&self, query: &str) -> Vec<Root> {
		self.search(query)
	}

	fn search_suffixes(&self, query: &str) -> Vec<Suffix> {
		self.search(query)
	}

	fn distinct_tags(&self) -> Vec<String> {
		let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
		let raw = tables
			.prefixes
			.iter()
			.filter_map(|p| p.raw_tags())
			.chain(tables.roots.iter().filter_map(|r| r.raw_tags()))
			.chain(tables.suffixes.iter().filter_map(|s| s.raw_tags()));
		let tags: BTreeSet<String> = raw.flat_map(parse_tags).collect();
		tags.into_iter().collect()
	}
}

/// Simple-mode word pool and its decorative suffixes.
pub type BlendLexicon = WordBlender;

/// Loads the simple-mode word pool and its decorative suffixes.
///
/// A missing file yields an empty list (with a warning); blending then fails
/// with `EmptyBlendLexicon` when it is actually requested.
pub fn load_blend_lexicon<P: AsRef<Path>>(dir: P) -> BlendLexicon {
	let folder = normalize_folder(dir.as_ref());

	let words = match read_csv(folder.join(BLEND_WORDS_FILE)) {
		Ok(rows) => rows
			.iter()
			.filter_map(|row| {
				let word = field(row, 0)?;
				let tags = row.get(1).map(|t| t.split([';', ',']).map(str::to_owned).collect::<Vec<_>>()).unwrap_or_default();
				Some(LexItem {
					word,
					tags: crate::model::entry::normalize_tags(tags),
					register: field(row, 2).unwrap_or_default(),
				})
			})
			.collect(),
		Err(e) => {
			warn!("Failed to read {}: {e}", folder.join(BLEND_WORDS_FILE).display());
			Vec::new()
		}
	};

	let suffixes = match read_csv(folder.join(BLEND_SUFFIXES_FILE)) {
		Ok(rows) => rows.iter().filter_map(|row| field(row, 0)).collect(),
		Err(e) => {
			warn!("Failed to read {}: {e}", folder.join(BLEND_SUFFIXES_FILE).display());
			Vec::new()
		}
	};

	WordBlender::new(words, suffixes)
}

#[cfg(test)]
mod tests {
	use std::fs;

	use super::*;

	fn tables() -> LexiconTables {
		LexiconTables {
			prefixes: vec![
				Prefix::new("p1", "bio-", "vie").with_tags("biologie"),
				Prefix::new("p2", "micro-", "petit").with_tags("science, Mesure").with_weight(2.0),
				Prefix::new("p3", "trans-", "à travers").with_weight(0.5),
				Prefix::new("p4", "auto-", "soi").with_weight(2.0),
			],
			roots: vec![
				Root::new("r1", "astro-", "étoile").with_domain("science").with_connector("o"),
				Root::new("r2", "son-", "son"),
			],
			suffixes: vec![Suffix::new("s1", "-logie", "étude").with_pos("nom").with_tags("science")],
		}
	}

	#[test]
	fn listings_are_ordered_by_weight_then_insertion() {
		let lexicon = Lexicon::from_tables(tables());
		let ids: Vec<String> = lexicon.list_prefixes_by_tag("").iter().map(|p| p.id.clone()).collect();
		assert_eq!(ids, vec!["p2", "p4", "p3", "p1"]);
	}

	#[test]
	fn tag_filter_is_case_insensitive_substring() {
		let lexicon = Lexicon::from_tables(tables());
		let hits = lexicon.list_prefixes_by_tag(" MESURE ");
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].id, "p2");
		assert_eq!(lexicon.list_roots_by_tag("scien").len(), 1);
		assert!(lexicon.list_suffixes_by_tag("poésie").is_empty());
	}

	#[test]
	fn listings_are_cached_until_invalidated() {
		let lexicon = Lexicon::from_tables(tables());
		let first = lexicon.list_roots_by_tag("");
		let second = lexicon.list_roots_by_tag("");
		assert!(Arc::ptr_eq(&first, &second));

		lexicon.invalidate();
		let third = lexicon.list_roots_by_tag("");
		assert!(!Arc::ptr_eq(&first, &third));
		assert_eq!(*first, *third);
	}

	#[test]
	fn reseed_replaces_tables_and_clears_cache() {
		let lexicon = Lexicon::from_tables(tables());
		assert_eq!(lexicon.list_suffixes_by_tag("").len(), 1);

		let mut next = tables();
		next.suffixes.push(Suffix::new("s2", "-ique", "adj.").with_pos("adj"));
		lexicon.reseed(next);
		assert_eq!(lexicon.list_suffixes_by_tag("").len(), 2);
		assert_eq!(lexicon.counts(), (4, 2, 2));
	}

	#[test]
	fn concurrent_readers_share_one_slot() {
		let lexicon = Arc::new(Lexicon::from_tables(tables()));
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let lexicon = Arc::clone(&lexicon);
				std::thread::spawn(move || lexicon.list_prefixes_by_tag("science"))
			})
			.collect();
		let lists: Vec<Arc<Vec<Prefix>>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
		assert!(lists.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
	}

	#[test]
	fn search_matches_form_substring() {
		let lexicon = Lexicon::from_tables(tables());
		let hits = lexicon.search_prefixes("CRO");
		assert_eq!(hits.len(), 1);
		assert_eq!(hits[0].form, "micro-");
		assert_eq!(lexicon.search_roots("o").len(), 2);
	}

	#[test]
	fn distinct_tags_merge_all_tables() {
		let lexicon = Lexicon::from_tables(tables());
		assert_eq!(lexicon.distinct_tags(), vec!["biologie", "mesure", "science"]);
	}

	#[test]
	fn loads_csv_then_binary_snapshot() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(
			dir.path().join(PREFIX_FILE),
			"id,form,alt_forms,gloss,origin,connector,phon_rules,tags,weight\n\
			 p1,bio-,,vie,grec,,,\"biologie,science\",2\n\
			 ,orphan-,,,,,,,\n\
			 p2,trans-,,à travers,latin,,,,lourd\n",
		)
		.unwrap();
		fs::write(
			dir.path().join(ROOT_FILE),
			"id,form,alt_forms,gloss,origin,domain,connector_pref,examples,weight\nr1,astro-,,étoile,grec,science,o,,\n",
		)
		.unwrap();
		fs::write(
			dir.path().join(SUFFIX_FILE),
			"id,form,alt_forms,gloss,origin,pos_out,def_template,tags,weight\n\
			 s1,-logie,,étude,grec,nom,\"tech:étude {DE_ROOT}|poetic:qui évoque {ROOT}\",science,1.5\n",
		)
		.unwrap();

		let lexicon = Lexicon::new(dir.path()).unwrap();
		assert_eq!(lexicon.counts(), (2, 1, 1));
		assert!(dir.path().join(BINARY_CACHE).exists());

		let prefixes = lexicon.list_prefixes_by_tag("");
		assert_eq!(prefixes[0].tags.as_deref(), Some("biologie,science"));
		assert_eq!(prefixes[0].weight, Some(2.0));
		assert_eq!(prefixes[1].weight, None);
		let suffixes = lexicon.list_suffixes_by_tag("");
		assert_eq!(suffixes[0].def_template.as_deref(), Some("tech:étude {DE_ROOT}|poetic:qui évoque {ROOT}"));

		// Second load comes from the snapshot even once the CSV is gone
		fs::remove_file(dir.path().join(PREFIX_FILE)).unwrap();
		let cached = Lexicon::new(dir.path()).unwrap();
		assert_eq!(cached.counts(), (2, 1, 1));
	}

	#[test]
	fn blend_lexicon_tolerates_missing_files() {
		let dir = tempfile::tempdir().unwrap();
		assert!(load_blend_lexicon(dir.path()).is_empty());

		fs::write(dir.path().join(BLEND_WORDS_FILE), "word,tags,register\nsoleil,Nature;ciel,courant\nlune,,\n").unwrap();
		fs::write(dir.path().join(BLEND_SUFFIXES_FILE), "suffix\nette\n").unwrap();
		let blender = load_blend_lexicon(dir.path());
		assert_eq!(blender.words().len(), 2);
		assert!(blender.words()[0].tags.contains("nature"));
		assert!(blender.words()[1].tags.is_empty());
	}
}
