use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::definition::DefinitionMode;
use super::entry::normalize_tags;
use crate::config::Config;
use crate::error::GeneratorError;

/// Strategy used to build a word.
///
/// # Variants
/// - `Random`: draw a prefix, a root and a suffix and compose them.
/// - `Simple`: draw two free-form words and blend them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
	#[default]
	Random,
	Simple,
}

impl GenerationKind {
	/// Parses `random` or `simple` (case-insensitive).
	pub fn parse(key: &str) -> Option<Self> {
		match key.trim().to_lowercase().as_str() {
			"random" => Some(GenerationKind::Random),
			"simple" => Some(GenerationKind::Simple),
			_ => None,
		}
	}
}

/// Input parameters of a single generation request.
///
/// # Responsibilities
/// - Track the generation kind and display settings (definition mode, filters)
/// - Hold the selected thematic tags, always normalized
/// - Hold the weighting intensity, always a finite value >= 0
///
/// # Invariants
/// - `selected_tags` is trimmed, lower-cased and free of blanks
/// - `weighting_intensity` is finite and non-negative
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationInput {
	pub kind: GenerationKind,

	pub mode: DefinitionMode,

	/// Apply the phonological filters when composing.
	pub use_filters: bool,

	/// Record the result in the history sink.
	pub save_to_history: bool,

	selected_tags: HashSet<String>,

	weighting_intensity: f64,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			kind: GenerationKind::Random,
			mode: DefinitionMode::Technical,
			use_filters: true,
			save_to_history: false,
			selected_tags: HashSet::new(),
			weighting_intensity: 1.0,
		}
	}
}

impl GenerationInput {
	/// Builds an input carrying the configured defaults.
	///
	/// An invalid configured intensity falls back to 1.0.
	pub fn from_config(config: &Config) -> Self {
		let mut input = Self {
			mode: config.definition_mode,
			use_filters: config.use_filters,
			save_to_history: config.save_to_history,
			..Self::default()
		};
		if input.set_weighting_intensity(config.weighting_intensity).is_err() {
			log::warn!("Ignoring invalid weighting intensity {} from configuration", config.weighting_intensity);
		}
		input
	}

	/// Returns the normalized selected tags.
	pub fn selected_tags(&self) -> &HashSet<String> {
		&self.selected_tags
	}

	/// Replaces the selected tags. Tags are normalized, blanks dropped.
	pub fn set_tags<I, S>(&mut self, tags: I)
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.selected_tags = normalize_tags(tags);
	}

	pub fn with_kind(mut self, kind: GenerationKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn with_mode(mut self, mode: DefinitionMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_filters(mut self, use_filters: bool) -> Self {
		self.use_filters = use_filters;
		self
	}

	pub fn with_save_to_history(mut self, save_to_history: bool) -> Self {
		self.save_to_history = save_to_history;
		self
	}

	/// Builder form of [`set_tags`](Self::set_tags).
	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		self.set_tags(tags);
		self
	}

	pub fn weighting_intensity(&self) -> f64 {
		self.weighting_intensity
	}

	/// Sets the weighting intensity.
	///
	/// # Errors
	/// Returns `InvalidIntensity` if the value is negative or not finite.
	pub fn set_weighting_intensity(&mut self, intensity: f64) -> Result<(), GeneratorError> {
		if !intensity.is_finite() || intensity < 0.0 {
			return Err(GeneratorError::InvalidIntensity(intensity));
		}
		self.weighting_intensity = intensity;
		Ok(())
	}
}
