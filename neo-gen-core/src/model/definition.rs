use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::phonology::{starts_with_silent_h, starts_with_vowel};

/// Selects the template family used to phrase a definition.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionMode {
	#[default]
	Technical,
	Poetic,
}

impl DefinitionMode {
	/// Parses a mode name, accepting the French spellings used in templates.
	///
	/// Returns `None` for anything else.
	pub fn parse(key: &str) -> Option<Self> {
		match key.trim().to_lowercase().as_str() {
			"tech" | "technical" | "technique" => Some(DefinitionMode::Technical),
			"poet" | "poetic" | "poetique" | "poétique" => Some(DefinitionMode::Poetic),
			_ => None,
		}
	}
}

/// Canonical part-of-speech derived from the free-form `pos_out` of a suffix.
///
/// Variants are declared in ascending priority: when a composite value such
/// as `adj/nom` maps to several categories, the greatest one wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartOfSpeech {
	Unknown,
	Adverb,
	Noun,
	Adjective,
	Verb,
	ResultNoun,
	ActionNoun,
	AgentNoun,
}

impl PartOfSpeech {
	/// Normalizes a free-form part-of-speech string.
	///
	/// The input is split on `/`, `,`, `;` and spaces, every token is
	/// classified, and the highest-priority category is kept:
	/// agent noun > action noun > result noun > verb > adjective > noun > adverb > unknown.
	pub fn classify(raw: Option<&str>) -> Self {
		let Some(raw) = raw else {
			return PartOfSpeech::Unknown;
		};
		raw.split(['/', ',', ';', ' '])
			.map(|token| Self::classify_token(&token.trim().to_lowercase()))
			.max()
			.unwrap_or(PartOfSpeech::Unknown)
	}

	fn classify_token(token: &str) -> Self {
		if token.is_empty() {
			return PartOfSpeech::Unknown;
		}
		if token.contains("agent") || token.contains("profession") {
			return PartOfSpeech::AgentNoun;
		}
		if token.contains("action") || token.contains("processus") {
			return PartOfSpeech::ActionNoun;
		}
		if ["result", "résultat", "produit"].iter().any(|k| token.contains(k)) {
			return PartOfSpeech::ResultNoun;
		}
		if token.starts_with("adj") {
			return PartOfSpeech::Adjective;
		}
		if token.starts_with("adv") {
			return PartOfSpeech::Adverb;
		}
		if token.starts_with('v') || token.contains("transiti") {
			return PartOfSpeech::Verb;
		}
		if token.starts_with("nom") || token.starts_with("subst") || token.starts_with('n') {
			return PartOfSpeech::Noun;
		}
		PartOfSpeech::Unknown
	}

	/// Wording substituted for `{ACTION}`.
	pub fn action(self) -> &'static str {
		match self {
			PartOfSpeech::AgentNoun => "agit sur",
			PartOfSpeech::Noun => "concerne",
			PartOfSpeech::Adjective => "qualifie",
			PartOfSpeech::Verb => "agir sur",
			PartOfSpeech::ActionNoun => "action de",
			PartOfSpeech::ResultNoun => "résultat de",
			PartOfSpeech::Adverb => "se rapporte à",
			PartOfSpeech::Unknown => "concerne",
		}
	}
}

/// Parses an inline template string of the form `key:text|key:text`.
///
/// Unrecognized keys and segments without a colon are ignored.
pub fn parse_templates(raw: &str) -> HashMap<DefinitionMode, String> {
	let mut templates = HashMap::new();
	for part in raw.split('|') {
		if let Some((key, value)) = part.split_once(':') {
			if let Some(mode) = DefinitionMode::parse(key) {
				templates.insert(mode, value.trim().to_owned());
			}
		}
	}
	templates
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
	needles.iter().any(|n| haystack.contains(n))
}

const MEDICAL: &[&str] = &["médecine", "medecine", "médical", "medical", "medic"];
const BIOLOGY: &[&str] = &["biologie", "bio"];
const SOFTWARE: &[&str] = &["informatique", "logiciel", "numérique", "numerique"];
const SOCIAL: &[&str] = &["société", "societe", "social", "sociologie"];
const PLACE: &[&str] = &["lieu", "toponyme"];

/// Default technical template for a part-of-speech and a lower-cased tag string.
fn technical_template(pos: PartOfSpeech, tags: &str) -> &'static str {
	match pos {
		PartOfSpeech::Adjective => "qui qualifie {ROOT}",
		PartOfSpeech::Adverb => "d'une manière liée à {ROOT}",
		PartOfSpeech::Verb => "{ACTION} {ROOT}",
		PartOfSpeech::ActionNoun => "action {DE_ROOT}",
		PartOfSpeech::ResultNoun => "résultat {DE_ROOT}",
		PartOfSpeech::AgentNoun => "qui {ACTION} {ROOT}",
		PartOfSpeech::Noun | PartOfSpeech::Unknown => {
			if contains_any(tags, &["instrument", "outil"]) {
				"instrument qui agit sur {ROOT}"
			} else if tags.contains("inflammation") {
				"inflammation {DE_ROOT}"
			} else if contains_any(tags, &["pathologie", "maladie", "patho"]) {
				"pathologie {DE_ROOT}"
			} else if contains_any(tags, MEDICAL) {
				"terme médical lié à {ROOT}"
			} else if contains_any(tags, BIOLOGY) {
				"phénomène biologique lié à {ROOT}"
			} else if contains_any(tags, SOFTWARE) {
				"processus informatique {DE_ROOT}"
			} else if tags.contains("technologie") {
				"procédé technique {DE_ROOT}"
			} else if contains_any(tags, &["science", "discipline", "étude", "logie"]) {
				"étude {DE_ROOT}"
			} else if contains_any(tags, SOCIAL) {
				"phénomène social lié à {ROOT}"
			} else if contains_any(tags, PLACE) {
				"lieu lié à {ROOT}"
			} else if tags.contains("tech") {
				"{ACTION} {DE_ROOT}"
			} else {
				"relatif à {ROOT}"
			}
		}
	}
}

/// Default poetic template: the tag cascade first, then the part-of-speech.
fn poetic_template(pos: PartOfSpeech, tags: &str) -> &'static str {
	if contains_any(tags, &["inflammation", "pathologie", "maladie", "patho"]) || contains_any(tags, MEDICAL) {
		"la douleur des tissus {DE_ROOT}"
	} else if contains_any(tags, BIOLOGY) {
		"la vie qui {ACTION} {ROOT}"
	} else if tags.contains("tech") || contains_any(tags, SOFTWARE) {
		"la machine qui {ACTION} {ROOT}"
	} else if contains_any(tags, SOCIAL) {
		"le mouvement social lié à {ROOT}"
	} else if contains_any(tags, PLACE) {
		"le lieu lié à {ROOT}"
	} else if pos == PartOfSpeech::Adverb {
		"d'une manière qui évoque {ROOT}"
	} else {
		"qui évoque {ROOT}"
	}
}

/// `de {gloss}`, elided to `d'{gloss}` before a vowel or a silent h.
pub fn de_root(gloss: &str) -> String {
	if starts_with_vowel(gloss) || starts_with_silent_h(gloss) {
		format!("d'{gloss}")
	} else {
		format!("de {gloss}")
	}
}

/// Builds a definition from a root gloss and the suffix's metadata.
///
/// An inline template for the requested mode (see [`parse_templates`]) wins
/// over the defaults. A template with no mode key at all applies to every
/// mode. The result is trimmed and may be empty; callers decide on a
/// fallback.
pub fn compose_definition(root_gloss: &str, pos_out: Option<&str>, template: Option<&str>, tags: Option<&str>, mode: DefinitionMode) -> String {
	let pos = PartOfSpeech::classify(pos_out);
	let tags = tags.unwrap_or("").to_lowercase();

	let inline = template.and_then(|raw| {
		let templates = parse_templates(raw);
		if templates.is_empty() {
			Some(raw.trim().to_owned()).filter(|t| !t.is_empty())
		} else {
			templates.get(&mode).cloned()
		}
	});

	let chosen = inline.unwrap_or_else(|| {
		let default = match mode {
			DefinitionMode::Technical => technical_template(pos, &tags),
			DefinitionMode::Poetic => poetic_template(pos, &tags),
		};
		default.to_owned()
	});

	chosen
		.replace("{DE_ROOT}", &de_root(root_gloss))
		.replace("{ROOT}", root_gloss)
		.replace("{ACTION}", pos.action())
		.trim()
		.to_owned()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn composite_pos_resolves_by_priority() {
		assert_eq!(PartOfSpeech::classify(Some("adj/nom")), PartOfSpeech::Adjective);
		assert_eq!(PartOfSpeech::classify(Some("nom, verbe")), PartOfSpeech::Verb);
		assert_eq!(PartOfSpeech::classify(Some("nom_agent")), PartOfSpeech::AgentNoun);
		assert_eq!(PartOfSpeech::classify(Some("nom_action; adj")), PartOfSpeech::ActionNoun);
		assert_eq!(PartOfSpeech::classify(Some("nom_resultat")), PartOfSpeech::ResultNoun);
		assert_eq!(PartOfSpeech::classify(Some("adv nom")), PartOfSpeech::Noun);
		assert_eq!(PartOfSpeech::classify(Some("adverbe")), PartOfSpeech::Adverb);
		assert_eq!(PartOfSpeech::classify(Some("v.t.")), PartOfSpeech::Verb);
		assert_eq!(PartOfSpeech::classify(Some("transitif")), PartOfSpeech::Verb);
		assert_eq!(PartOfSpeech::classify(Some("???")), PartOfSpeech::Unknown);
		assert_eq!(PartOfSpeech::classify(Some("")), PartOfSpeech::Unknown);
		assert_eq!(PartOfSpeech::classify(None), PartOfSpeech::Unknown);
	}

	#[test]
	fn technical_adjective_default() {
		let def = compose_definition("lumière", Some("adj"), None, None, DefinitionMode::Technical);
		assert_eq!(def, "qui qualifie lumière");
		let def = compose_definition("lumière", Some("adj/nom"), None, None, DefinitionMode::Technical);
		assert_eq!(def, "qui qualifie lumière");
	}

	#[test]
	fn poetic_fallback_evokes_the_root() {
		assert_eq!(compose_definition("lumière", None, None, None, DefinitionMode::Poetic), "qui évoque lumière");
		assert_eq!(compose_definition("lumière", Some("nom"), None, None, DefinitionMode::Poetic), "qui évoque lumière");
		assert_eq!(
			compose_definition("lumière", Some("adv"), None, None, DefinitionMode::Poetic),
			"d'une manière qui évoque lumière"
		);
	}

	#[test]
	fn de_root_elides_before_vowel_and_silent_h() {
		let tech = DefinitionMode::Technical;
		assert_eq!(compose_definition("air", Some("nom"), None, Some("science"), tech), "étude d'air");
		assert_eq!(compose_definition("son", Some("nom"), None, Some("science"), tech), "étude de son");
		assert_eq!(de_root("hémoglobine"), "d'hémoglobine");
		assert_eq!(de_root("hache"), "d'hache");
		assert_eq!(de_root("rythme"), "de rythme");
	}

	#[test]
	fn inline_template_overrides_defaults_per_mode() {
		let tpl = "tech:instrument qui {ACTION} {ROOT}|poetic:qui évoque {ROOT}";
		let tech = compose_definition("lumière", Some("nom"), Some(tpl), None, DefinitionMode::Technical);
		let poet = compose_definition("lumière", Some("nom"), Some(tpl), None, DefinitionMode::Poetic);
		assert_eq!(tech, "instrument qui concerne lumière");
		assert_eq!(poet, "qui évoque lumière");
	}

	#[test]
	fn inline_template_missing_mode_uses_default() {
		let def = compose_definition("lumière", Some("adj"), Some("tech:{ACTION} {ROOT}"), None, DefinitionMode::Poetic);
		assert_eq!(def, "qui évoque lumière");
	}

	#[test]
	fn unkeyed_template_applies_to_every_mode() {
		let def = compose_definition("air", Some("nom"), Some("étude {DE_ROOT}"), None, DefinitionMode::Poetic);
		assert_eq!(def, "étude d'air");
	}

	#[test]
	fn action_follows_part_of_speech() {
		let tpl = Some("tech:{ACTION} {ROOT}");
		let tech = DefinitionMode::Technical;
		assert_eq!(compose_definition("lumière", Some("verbe"), tpl, None, tech), "agir sur lumière");
		assert_eq!(compose_definition("lumière", Some("nom_action"), tpl, None, tech), "action de lumière");
		assert_eq!(compose_definition("lumière", Some("nom_resultat"), tpl, None, tech), "résultat de lumière");
	}

	#[test]
	fn technical_defaults_by_part_of_speech() {
		let tech = DefinitionMode::Technical;
		assert_eq!(compose_definition("lumière", Some("adv"), None, None, tech), "d'une manière liée à lumière");
		assert_eq!(compose_definition("lumière", Some("verbe"), None, None, tech), "agir sur lumière");
		assert_eq!(compose_definition("lumière", Some("nom_agent"), None, None, tech), "qui agit sur lumière");
		assert_eq!(compose_definition("onde", Some("nom_action"), None, None, tech), "action d'onde");
		assert_eq!(compose_definition("lumière", Some("produit"), None, None, tech), "résultat de lumière");
		assert_eq!(compose_definition("lumière", Some("nom"), None, None, tech), "relatif à lumière");
	}

	#[test]
	fn technical_noun_tag_cascade() {
		let tech = DefinitionMode::Technical;
		let def = |tags: &str| compose_definition("cœur", Some("nom"), None, Some(tags), tech);
		assert_eq!(def("outil"), "instrument qui agit sur cœur");
		assert_eq!(def("Médecine,inflammation"), "inflammation de cœur");
		assert_eq!(def("maladie"), "pathologie de cœur");
		assert_eq!(def("médecine"), "terme médical lié à cœur");
		assert_eq!(def("biologie"), "phénomène biologique lié à cœur");
		assert_eq!(def("numérique"), "processus informatique de cœur");
		assert_eq!(def("technologie"), "procédé technique de cœur");
		assert_eq!(def("social"), "phénomène social lié à cœur");
		// "logie" is caught by the study rule before the social one
		assert_eq!(def("sociologie"), "étude de cœur");
		assert_eq!(def("toponyme"), "lieu lié à cœur");
		assert_eq!(def("high-tech"), "concerne de cœur");
		assert_eq!(def("cuisine"), "relatif à cœur");
	}

	#[test]
	fn poetic_tag_cascade() {
		let poet = DefinitionMode::Poetic;
		let def = |tags: &str| compose_definition("air", Some("nom"), None, Some(tags), poet);
		assert_eq!(def("pathologie"), "la douleur des tissus d'air");
		assert_eq!(def("bio"), "la vie qui concerne air");
		assert_eq!(def("logiciel"), "la machine qui concerne air");
		assert_eq!(def("social"), "le mouvement social lié à air");
		assert_eq!(def("lieu"), "le lieu lié à air");
	}

	#[test]
	fn template_parser_accepts_french_keys() {
		let templates = parse_templates("technique: a {ROOT} | poétique:b|bogus:c|no colon");
		assert_eq!(templates.len(), 2);
		assert_eq!(templates[&DefinitionMode::Technical], "a {ROOT}");
		assert_eq!(templates[&DefinitionMode::Poetic], "b");
	}

	#[test]
	fn blank_template_yields_blank_definition() {
		let def = compose_definition("air", Some("nom"), Some("tech:  "), None, DefinitionMode::Technical);
		assert!(def.is_empty());
	}
}
