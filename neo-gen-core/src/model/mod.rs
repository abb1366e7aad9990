//! Word and definition composition.
//!
//! - Lexicon records (`entry`)
//! - Phonological composition of prefix, root and suffix (`phonology`)
//! - Definition templates (`definition`)
//! - Tag-aware weighted selection (`selector`)
//! - Word blending for the simple mode (`blender`)
//! - Request parameters and the generation service (`generation_input`, `generator`)

/// Prefix, root, suffix and simple-lexicon records, plus tag helpers.
pub mod entry;

/// Elision, doubled-letter collapsing, liaison and plausibility scoring.
pub mod phonology;

/// Part-of-speech normalization, inline templates and default phrasing.
pub mod definition;

/// Effective weights and weighted random draws.
pub mod selector;

/// Heuristic blending of two free-form words.
pub mod blender;

/// Per-request generation settings.
pub mod generation_input;

/// High-level generation service over a lexicon store and a history sink.
pub mod generator;
