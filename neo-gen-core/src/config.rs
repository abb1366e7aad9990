use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::model::definition::DefinitionMode;

/// Generation defaults and server settings.
///
/// Every key is optional in the TOML file; missing keys take the values of
/// `Config::default()`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
	/// Directory holding the seed CSV files (and the binary lexicon cache).
	pub data_dir: PathBuf,

	/// Definition phrasing used when a request does not specify one.
	pub definition_mode: DefinitionMode,

	/// Phonological filters (elision, collapsing, liaison) on by default.
	pub use_filters: bool,

	/// How strongly tag-matching entries are favoured. Must be >= 0.
	pub weighting_intensity: f64,

	/// Record successful generations in the history.
	pub save_to_history: bool,

	/// Maximum number of history entries kept in memory.
	pub history_limit: usize,

	// Server
	pub bind_address: String,
	pub port: u16,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			data_dir: PathBuf::from("./data"),
			definition_mode: DefinitionMode::Technical,
			use_filters: true,
			weighting_intensity: 1.0,
			save_to_history: true,
			history_limit: 200,
			bind_address: "127.0.0.1".to_owned(),
			port: 5000,
		}
	}
}

impl Config {
	/// Loads configuration from a TOML file.
	pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, GeneratorError> {
		let content = std::fs::read_to_string(path)?;
		Ok(Self::from_toml_str(&content)?)
	}

	/// Loads configuration from a TOML string.
	pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(content)
	}

	/// Serializes configuration to a TOML string.
	pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
		toml::to_string_pretty(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_keys_take_defaults() {
		let config = Config::from_toml_str("port = 8080\ndefinition_mode = \"poetic\"\n").unwrap();
		assert_eq!(config.port, 8080);
		assert_eq!(config.definition_mode, DefinitionMode::Poetic);
		assert_eq!(config.data_dir, PathBuf::from("./data"));
		assert_eq!(config.history_limit, 200);
		assert!(config.use_filters);
	}

	#[test]
	fn toml_round_trip() {
		let config = Config {
			weighting_intensity: 2.5,
			save_to_history: false,
			..Config::default()
		};
		let text = config.to_toml_string().unwrap();
		assert_eq!(Config::from_toml_str(&text).unwrap(), config);
	}

	#[test]
	fn unknown_mode_is_rejected() {
		assert!(Config::from_toml_str("definition_mode = \"lyrique\"").is_err());
	}

	#[test]
	fn loads_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("neo-gen.toml");
		std::fs::write(&path, "data_dir = \"/srv/lexique\"\nuse_filters = false\n").unwrap();
		let config = Config::load_toml(&path).unwrap();
		assert_eq!(config.data_dir, PathBuf::from("/srv/lexique"));
		assert!(!config.use_filters);
		assert!(matches!(Config::load_toml(dir.path().join("absent.toml")), Err(GeneratorError::Io(_))));
	}
}
