
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Instant;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::debug;

use crate::normalize;
use crate::{Error, IconIndex};

/// The lookup-table artifact compiled into the crate. A full artifact built
/// from the same compiler is drop-in compatible via [LookupTable::from_path].
const EMBEDDED_ARTIFACT: &str = include_str!("../data/words.json");

/// Wire shape of the `words.json` artifact.
#[derive(Deserialize)]
struct Artifact {
	languages: Vec<ArtifactLanguage>,
	keys: BTreeMap<String, IconIndex>,
}

#[derive(Deserialize)]
struct ArtifactLanguage {
	code: String,
	label: String,
	words: Vec<Vec<String>>,
}

struct LanguageEntry {
	code: String,
	label: String,
	words: Vec<Vec<String>>,
}

/// The frozen mapping between normalized words, emoji and icon indexes,
/// plus the per-language display word lists.
///
/// Immutable after load; safe to share between threads. Most callers use the
/// process-wide instance through the crate-level functions, but a custom
/// artifact can be loaded and queried through the inherent methods.
pub struct LookupTable {
	pub(crate) keys: HashMap<String, IconIndex>,
	pub(crate) sorted_keys: Vec<(String, IconIndex)>,
	/// Diacritic-folded aliases for fuzzy mode. `None` marks a fold two
	/// different indexes collided on; those must never resolve.
	pub(crate) folded_keys: HashMap<String, Option<IconIndex>>,
	languages: Vec<LanguageEntry>,
	by_code: HashMap<String, usize>,
}

static GLOBAL: Lazy<Result<LookupTable, Error>> =
	Lazy::new(|| LookupTable::from_str(EMBEDDED_ARTIFACT));

impl LookupTable {
	/// The process-wide table, loaded from the embedded artifact on first use.
	pub fn global() -> Result<&'static LookupTable, Error> {
		GLOBAL.as_ref().map_err(Clone::clone)
	}

	/// Parse and validate an artifact from its JSON text.
	pub fn from_str(json: &str) -> Result<LookupTable, Error> {
		let started = Instant::now();
		let artifact: Artifact = serde_json::from_str(json)
			.map_err(|e| Error::LookupTableMissing(format!("invalid artifact JSON: {}", e)))?;
		let table = LookupTable::from_artifact(artifact)?;
		let keys = table.keys.len();
		let languages = table.languages.len();
		let elapsed_ms = started.elapsed().as_millis() as u64;
		debug!(keys, languages, elapsed_ms, "lookup table loaded");
		Ok(table)
	}

	/// Load and validate an artifact file.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LookupTable, Error> {
		let json = std::fs::read_to_string(path.as_ref()).map_err(|e| {
			Error::LookupTableMissing(format!(
				"cannot read artifact {}: {}",
				path.as_ref().display(),
				e
			))
		})?;
		LookupTable::from_str(&json)
	}

	fn from_artifact(artifact: Artifact) -> Result<LookupTable, Error> {
		if artifact.languages.is_empty() {
			return Err(Error::LookupTableMissing("artifact lists no languages".into()));
		}

		let mut by_code = HashMap::with_capacity(artifact.languages.len());
		let mut languages = Vec::with_capacity(artifact.languages.len());
		for lang in artifact.languages {
			if lang.code.is_empty() {
				return Err(Error::LookupTableMissing("empty language code".into()));
			}
			if by_code.insert(lang.code.clone(), languages.len()).is_some() {
				return Err(Error::LookupTableMissing(format!(
					"duplicate language code {}",
					lang.code
				)));
			}
			if lang.words.len() != 256 {
				return Err(Error::LookupTableMissing(format!(
					"language {} covers {} indexes instead of 256",
					lang.code,
					lang.words.len()
				)));
			}
			languages.push(LanguageEntry { code: lang.code, label: lang.label, words: lang.words });
		}

		let keys: HashMap<String, IconIndex> = artifact.keys.into_iter().collect();

		// Every primary word must round-trip through the key map. A mismatch
		// means the artifact was not produced by the compiler, or was edited.
		for lang in &languages {
			for (index, words) in lang.words.iter().enumerate() {
				let primary = words.first().filter(|w| !w.is_empty()).ok_or_else(|| {
					Error::LookupTableMissing(format!(
						"language {} has no display word for index {}",
						lang.code, index
					))
				})?;
				let key = normalize::lookup_key(primary);
				match keys.get(&key) {
					Some(mapped) if *mapped as usize == index => {}
					Some(mapped) => {
						return Err(Error::LookupTableMissing(format!(
							"key {} resolves to {} but belongs to index {} of {}",
							key, mapped, index, lang.code
						)))
					}
					None => {
						return Err(Error::LookupTableMissing(format!(
							"primary word {} of {} is missing from the key map",
							primary, lang.code
						)))
					}
				}
			}
		}

		let mut sorted_keys: Vec<(String, IconIndex)> =
			keys.iter().map(|(k, v)| (k.clone(), *v)).collect();
		sorted_keys.sort();

		let mut folded_keys: HashMap<String, Option<IconIndex>> = HashMap::new();
		for (key, index) in &keys {
			let folded = normalize::fold_script(normalize::dominant_script(key), key);
			if folded == *key {
				continue;
			}
			match folded_keys.entry(folded) {
				Entry::Occupied(mut slot) => {
					if *slot.get() != Some(*index) {
						slot.insert(None);
					}
				}
				Entry::Vacant(slot) => {
					slot.insert(Some(*index));
				}
			}
		}

		Ok(LookupTable { keys, sorted_keys, folded_keys, languages, by_code })
	}

	/// Supported languages as `(code, label)` pairs, in artifact order.
	pub fn languages(&self) -> impl Iterator<Item = (&str, &str)> {
		self.languages.iter().map(|l| (l.code.as_str(), l.label.as_str()))
	}

	/// The display label of a language code, if supported.
	pub fn language_label(&self, code: &str) -> Option<&str> {
		self.by_code.get(code).map(|i| self.languages[*i].label.as_str())
	}

	/// The language used when callers do not specify one.
	pub fn default_language(&self) -> &str {
		&self.languages[0].code
	}

	/// The primary display word of `index` in the given language.
	pub fn primary_word(&self, language: &str, index: IconIndex) -> Result<&str, Error> {
		Ok(&self.word_lists(language)?[index as usize][0])
	}

	/// Every accepted word of `index` in the given language, primary first.
	pub fn accepted_words(&self, language: &str, index: IconIndex) -> Result<&[String], Error> {
		Ok(&self.word_lists(language)?[index as usize])
	}

	fn word_lists(&self, language: &str) -> Result<&Vec<Vec<String>>, Error> {
		let entry = self
			.by_code
			.get(language)
			.ok_or_else(|| Error::UnknownLanguage(language.to_string()))?;
		Ok(&self.languages[*entry].words)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn embedded_artifact_loads() {
		let table = LookupTable::global().unwrap();
		assert!(table.keys.len() > 256);
		assert!(table.languages().count() >= 1);
	}

	#[test]
	fn language_order_and_default() {
		let table = LookupTable::global().unwrap();
		let codes: Vec<&str> = table.languages().map(|(c, _)| c).collect();
		assert_eq!(codes[0], table.default_language());
		assert_eq!(table.default_language(), "en");
	}

	#[test]
	fn every_index_has_a_primary_word_per_language() {
		let table = LookupTable::global().unwrap();
		let codes: Vec<String> = table.languages().map(|(c, _)| c.to_string()).collect();
		for code in &codes {
			for index in 0..=255u8 {
				assert!(!table.primary_word(code, index).unwrap().is_empty());
			}
		}
	}

	#[test]
	fn unknown_language_is_an_error() {
		let table = LookupTable::global().unwrap();
		assert_eq!(
			table.primary_word("xx", 0),
			Err(Error::UnknownLanguage("xx".to_string()))
		);
	}

	#[test]
	fn malformed_artifact_is_rejected() {
		assert!(matches!(
			LookupTable::from_str("{}"),
			Err(Error::LookupTableMissing(_))
		));
		assert!(matches!(
			LookupTable::from_str("{\"languages\": [], \"keys\": {}}"),
			Err(Error::LookupTableMissing(_))
		));
	}

	#[test]
	fn key_map_rejects_out_of_range_indexes() {
		let json = r#"{"languages": [{"code": "en", "label": "English", "words": []}], "keys": {"dog": 300}}"#;
		assert!(matches!(
			LookupTable::from_str(json),
			Err(Error::LookupTableMissing(_))
		));
	}
}
