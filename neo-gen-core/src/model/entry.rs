use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three morpheme classes a composed word is built from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MorphemeKind {
	Prefix,
	Root,
	Suffix,
}

impl fmt::Display for MorphemeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			MorphemeKind::Prefix => "prefix",
			MorphemeKind::Root => "root",
			MorphemeKind::Suffix => "suffix",
		};
		f.write_str(name)
	}
}

/// Common view over prefix, root and suffix records.
///
/// Used by the store (ordering, tag filtering) and by the weighted selector.
pub trait Morpheme: Clone {
	const KIND: MorphemeKind;

	fn id(&self) -> &str;

	/// Canonical form, possibly carrying a hyphen affix marker (`bio-`, `-logie`).
	fn form(&self) -> &str;

	fn weight(&self) -> Option<f64>;

	/// Raw comma-separated tag field. Roots expose their domain here.
	fn raw_tags(&self) -> Option<&str>;
}

/// A prefix record (`bio-`, `trans-`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prefix {
	pub id: String,
	pub form: String,
	pub alt_forms: Option<String>,
	pub gloss: String,
	pub origin: Option<String>,
	pub connector: Option<String>,
	pub phon_rules: Option<String>,
	pub tags: Option<String>,
	pub weight: Option<f64>,
}

impl Prefix {
	pub fn new(id: &str, form: &str, gloss: &str) -> Self {
		Self {
			id: id.to_owned(),
			form: form.to_owned(),
			alt_forms: None,
			gloss: gloss.to_owned(),
			origin: None,
			connector: None,
			phon_rules: None,
			tags: None,
			weight: None,
		}
	}

	pub fn with_tags(mut self, tags: &str) -> Self {
		self.tags = Some(tags.to_owned());
		self
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}
}

/// A root record. `connector_pref` is the liaison inserted before it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Root {
	pub id: String,
	pub form: String,
	pub alt_forms: Option<String>,
	pub gloss: String,
	pub origin: Option<String>,
	pub domain: Option<String>,
	pub connector_pref: Option<String>,
	pub examples: Option<String>,
	pub weight: Option<f64>,
}

impl Root {
	pub fn new(id: &str, form: &str, gloss: &str) -> Self {
		Self {
			id: id.to_owned(),
			form: form.to_owned(),
			alt_forms: None,
			gloss: gloss.to_owned(),
			origin: None,
			domain: None,
			connector_pref: None,
			examples: None,
			weight: None,
		}
	}

	pub fn with_domain(mut self, domain: &str) -> Self {
		self.domain = Some(domain.to_owned());
		self
	}

	pub fn with_connector(mut self, connector: &str) -> Self {
		self.connector_pref = Some(connector.to_owned());
		self
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}
}

/// A suffix record, carrying the output part-of-speech and definition template.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Suffix {
	pub id: String,
	pub form: String,
	pub alt_forms: Option<String>,
	pub gloss: String,
	pub origin: Option<String>,
	pub pos_out: Option<String>,
	pub def_template: Option<String>,
	pub tags: Option<String>,
	pub weight: Option<f64>,
}

impl Suffix {
	pub fn new(id: &str, form: &str, gloss: &str) -> Self {
		Self {
			id: id.to_owned(),
			form: form.to_owned(),
			alt_forms: None,
			gloss: gloss.to_owned(),
			origin: None,
			pos_out: None,
			def_template: None,
			tags: None,
			weight: None,
		}
	}

	pub fn with_pos(mut self, pos_out: &str) -> Self {
		self.pos_out = Some(pos_out.to_owned());
		self
	}

	pub fn with_template(mut self, template: &str) -> Self {
		self.def_template = Some(template.to_owned());
		self
	}

	pub fn with_tags(mut self, tags: &str) -> Self {
		self.tags = Some(tags.to_owned());
		self
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}
}

macro_rules! impl_morpheme {
	($ty:ty, $kind:expr, $tags:ident) => {
		impl Morpheme for $ty {
			const KIND: MorphemeKind = $kind;

			fn id(&self) -> &str {
				&self.id
			}

			fn form(&self) -> &str {
				&self.form
			}

			fn weight(&self) -> Option<f64> {
				self.weight
			}

			fn raw_tags(&self) -> Option<&str> {
				self.$tags.as_deref()
			}
		}
	};
}

impl_morpheme!(Prefix, MorphemeKind::Prefix, tags);
impl_morpheme!(Root, MorphemeKind::Root, domain);
impl_morpheme!(Suffix, MorphemeKind::Suffix, tags);

/// A free-form word of the simple-mode lexicon.
#[derive(Clone, Debug, PartialEq)]
pub struct LexItem {
	pub word: String,
	/// Normalized (trimmed, lower-cased) tags.
	pub tags: HashSet<String>,
	pub register: String,
}

impl LexItem {
	pub fn new(word: &str, tags: &[&str], register: &str) -> Self {
		Self {
			word: word.to_owned(),
			tags: normalize_tags(tags.iter().copied()),
			register: register.to_owned(),
		}
	}
}

/// Splits a comma-separated tag field into a normalized set.
///
/// Tags are trimmed and lower-cased; blank tags are dropped.
pub fn parse_tags(raw: &str) -> HashSet<String> {
	normalize_tags(raw.split(','))
}

/// Normalizes user-supplied tags the same way `parse_tags` does.
pub fn normalize_tags<I, S>(tags: I) -> HashSet<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	tags.into_iter()
		.map(|t| t.as_ref().trim().to_lowercase())
		.filter(|t| !t.is_empty())
		.collect()
}

/// Parses a seed weight. Blank, unparseable or non-finite values yield `None`
/// (the default weight applies).
pub fn parse_weight(raw: &str) -> Option<f64> {
	raw.trim().parse::<f64>().ok().filter(|w| w.is_finite())
}
