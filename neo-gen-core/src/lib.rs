//! French neologism generation library.
//!
//! This crate composes invented words from weighted lexicon tables:
//! - Phonological composition of a prefix, a root and a suffix
//! - Definition synthesis from templates, part-of-speech and thematic tags
//! - Tag-aware weighted selection of lexicon entries
//! - An alternate "simple" mode blending two free-form words
//!
//! Lexicon loading (CSV seed files with a binary cache), a bounded history,
//! favorites and TOML configuration are provided around the core.

/// Composition algorithms and the generation service.
pub mod model;

/// Lexicon store with a read-through listing cache.
pub mod lexicon;

/// History sink and its in-memory implementation.
pub mod history;

/// Favorite words, stored with their provenance.
pub mod favorites;

/// Generation defaults and server settings.
pub mod config;

/// Error type shared by the crate.
pub mod error;

/// I/O utilities (CSV reading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use config::Config;
pub use error::GeneratorError;
pub use favorites::InMemoryFavorites;
pub use history::{HistoryEntry, HistoryMode, HistorySink, InMemoryHistory};
pub use lexicon::{load_blend_lexicon, BlendLexicon, Lexicon, LexiconStore, LexiconTables};
pub use model::definition::DefinitionMode;
pub use model::generation_input::{GenerationInput, GenerationKind};
pub use model::generator::{GenerationResult, Generator, Provenance};
