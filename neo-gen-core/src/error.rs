use thiserror::Error;

use crate::model::entry::MorphemeKind;

/// Errors raised by the generation pipeline and its I/O edges.
///
/// Pure composition (phonology, definitions) never fails; only the stages
/// that draw from a possibly empty pool, and the loaders, return these.
#[derive(Debug, Error)]
pub enum GeneratorError {
	/// No entry of a required morpheme class was available.
	#[error("No {0} entries available")]
	EmptyPool(MorphemeKind),

	/// The simple-mode word pool is empty, blending cannot proceed.
	#[error("No words available for blending")]
	EmptyBlendLexicon,

	/// Weighting intensity must be a finite, non-negative number.
	#[error("Weighting intensity must be >= 0.0, got {0}")]
	InvalidIntensity(f64),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Binary lexicon cache could not be read or written.
	#[error("Lexicon cache error: {0}")]
	Cache(#[from] postcard::Error),

	#[error("Invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
}
