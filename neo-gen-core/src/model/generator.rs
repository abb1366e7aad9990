use std::time::Instant;

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::blender::WordBlender;
use super::definition::{compose_definition, DefinitionMode};
use super::entry::{MorphemeKind, Prefix, Root, Suffix};
use super::generation_input::{GenerationInput, GenerationKind};
use super::phonology::compose_word;
use super::selector::pick_morpheme;
use crate::error::GeneratorError;
use crate::history::{HistoryEntry, HistoryMode, HistorySink};
use crate::lexicon::LexiconStore;

/// Generations slower than this are logged as warnings.
const SLOW_GENERATION_MS: f64 = 150.0;

/// The morpheme fields a word and its definition were built from.
///
/// Enough to rebuild both without querying the lexicon again.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Provenance {
	pub prefix_form: String,
	pub root_form: String,
	pub suffix_form: String,
	/// Root gloss, or the root form when the gloss is blank.
	pub root_gloss: String,
	pub root_connector: Option<String>,
	pub suffix_pos: Option<String>,
	pub suffix_template: Option<String>,
	pub suffix_tags: Option<String>,
}

impl Provenance {
	pub fn from_entries(prefix: &Prefix, root: &Root, suffix: &Suffix) -> Self {
		let root_gloss = if root.gloss.trim().is_empty() { root.form.clone() } else { root.gloss.clone() };
		Self {
			prefix_form: prefix.form.clone(),
			root_form: root.form.clone(),
			suffix_form: suffix.form.clone(),
			root_gloss,
			root_connector: root.connector_pref.clone(),
			suffix_pos: suffix.pos_out.clone(),
			suffix_template: suffix.def_template.clone(),
			suffix_tags: suffix.tags.clone(),
		}
	}

	/// Composes the word and its definition. Deterministic.
	///
	/// An empty definition is replaced by `relatif à {gloss}` and logged.
	pub fn compose(&self, mode: DefinitionMode, use_filters: bool) -> GenerationResult {
		let build = compose_word(
			&self.prefix_form,
			&self.root_form,
			&self.suffix_form,
			self.root_connector.as_deref(),
			use_filters,
		);

		let mut definition = compose_definition(
			&self.root_gloss,
			self.suffix_pos.as_deref(),
			self.suffix_template.as_deref(),
			self.suffix_tags.as_deref(),
			mode,
		);
		if definition.is_empty() {
			warn!(
				"Empty definition composed, using fallback | root='{}' pos_out={:?} tags={:?}",
				self.root_gloss, self.suffix_pos, self.suffix_tags
			);
			definition = format!("relatif à {}", self.root_gloss).trim().to_owned();
		}

		GenerationResult {
			word: build.word,
			definition,
			decomposition: format!("{} + {} + {}", self.prefix_form, self.root_form, self.suffix_form),
			plausibility: build.plausibility,
			provenance: Some(self.clone()),
		}
	}
}

/// A generated word with everything needed to display or rebuild it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenerationResult {
	pub word: String,
	pub definition: String,
	pub decomposition: String,
	pub plausibility: f64,
	/// `None` for blended words.
	pub provenance: Option<Provenance>,
}

/// Generation service over a lexicon store and a history sink.
///
/// # Responsibilities
/// - Draw morphemes with tag-aware weights and compose them (`generate_random`)
/// - Blend two free-form words (`generate_simple`), when a blend lexicon is set
/// - Compose hand-picked morphemes (`compose_manual`)
/// - Rebuild a result under new display settings (`recompute`)
/// - Forward successful generations to the history sink on request
#[derive(Debug)]
pub struct Generator<L, H> {
	store: L,
	history: H,
	blender: Option<WordBlender>,
}

impl<L: LexiconStore, H: HistorySink> Generator<L, H> {
	/// Creates a generator without a blend lexicon; simple mode then fails
	/// with `EmptyBlendLexicon`.
	pub fn new(store: L, history: H) -> Self {
		Self { store, history, blender: None }
	}

	pub fn with_blender(mut self, blender: WordBlender) -> Self {
		self.blender = Some(blender);
		self
	}

	pub fn store(&self) -> &L {
		&self.store
	}

	pub fn history(&self) -> &H {
		&self.history
	}

	/// Generates a word according to `input.kind`, using the thread RNG.
	///
	/// # Errors
	/// See [`generate_random`](Self::generate_random) and
	/// [`generate_simple`](Self::generate_simple).
	pub fn generate(&self, input: &GenerationInput) -> Result<GenerationResult, GeneratorError> {
		let mut rng = rand::rng();
		match input.kind {
			GenerationKind::Random => self.generate_random(input, &mut rng),
			GenerationKind::Simple => self.generate_simple(input, &mut rng),
		}
	}

	/// Draws a prefix, a root and a suffix and composes them.
	///
	/// Every class is drawn from its full listing with weights re-computed
	/// against the selected tags (roots match on their domain).
	///
	/// # Errors
	/// Returns `EmptyPool` if one of the three classes has no entry.
	pub fn generate_random<R: Rng + ?Sized>(&self, input: &GenerationInput, rng: &mut R) -> Result<GenerationResult, GeneratorError> {
		let start = Instant::now();
		let selected = input.selected_tags();
		let intensity = input.weighting_intensity();

		let prefixes = self.store.list_prefixes_by_tag("");
		let roots = self.store.list_roots_by_tag("");
		let suffixes = self.store.list_suffixes_by_tag("");

		let prefix = pick_morpheme(prefixes.as_slice(), selected, intensity, rng).ok_or(GeneratorError::EmptyPool(MorphemeKind::Prefix))?;
		let root = pick_morpheme(roots.as_slice(), selected, intensity, rng).ok_or(GeneratorError::EmptyPool(MorphemeKind::Root))?;
		let suffix = pick_morpheme(suffixes.as_slice(), selected, intensity, rng).ok_or(GeneratorError::EmptyPool(MorphemeKind::Suffix))?;

		let result = Provenance::from_entries(prefix, root, suffix).compose(input.mode, input.use_filters);
		let compose_ms = start.elapsed().as_secs_f64() * 1000.0;

		if input.save_to_history {
			self.history.record(HistoryEntry::from_result(&result, HistoryMode::Random));
		}

		let total_ms = start.elapsed().as_secs_f64() * 1000.0;
		if total_ms > SLOW_GENERATION_MS {
			warn!("Generation latency >150ms: compose={compose_ms:.1}ms total={total_ms:.1}ms tags={}", selected.len());
		} else {
			debug!("Generation latency: compose={compose_ms:.1}ms total={total_ms:.1}ms tags={}", selected.len());
		}

		Ok(result)
	}

	/// Blends two words of the simple lexicon.
	///
	/// Definition and decomposition are both `"{a} + {b}"`; plausibility is 1.0.
	///
	/// # Errors
	/// Returns `EmptyBlendLexicon` if no blend lexicon is set or it is empty.
	pub fn generate_simple<R: Rng + ?Sized>(&self, input: &GenerationInput, rng: &mut R) -> Result<GenerationResult, GeneratorError> {
		let blender = self.blender.as_ref().ok_or(GeneratorError::EmptyBlendLexicon)?;
		let blend = blender.generate(input.selected_tags(), rng)?;

		let decomposition = format!("{} + {}", blend.left, blend.right);
		let result = GenerationResult {
			word: blend.word,
			definition: decomposition.clone(),
			decomposition,
			plausibility: 1.0,
			provenance: None,
		};

		if input.save_to_history {
			self.history.record(HistoryEntry::from_result(&result, HistoryMode::Simple));
		}
		Ok(result)
	}

	/// Composes three hand-picked morphemes. No randomness involved.
	pub fn compose_manual(&self, prefix: &Prefix, root: &Root, suffix: &Suffix, input: &GenerationInput) -> GenerationResult {
		let result = Provenance::from_entries(prefix, root, suffix).compose(input.mode, input.use_filters);
		if input.save_to_history {
			self.history.record(HistoryEntry::from_result(&result, HistoryMode::Manual));
		}
		result
	}

	/// Rebuilds a result's word and definition from its provenance.
	///
	/// Results without provenance (blends) are returned unchanged.
	pub fn recompute(&self, result: &GenerationResult, mode: DefinitionMode, use_filters: bool) -> GenerationResult {
		match &result.provenance {
			Some(provenance) => provenance.compose(mode, use_filters),
			None => result.clone(),
		}
	}
}
