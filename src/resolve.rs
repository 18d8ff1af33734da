
use std::collections::HashSet;

use crate::lookup::LookupTable;
use crate::normalize::{self, MarkPolicy, Script};
use crate::{Error, IconIndex};

/// Resolution mode.
///
/// The two modes are deliberately separate values rather than behavior that
/// varies with context: the strict path feeds the KDF, the fuzzy path feeds
/// recovery UIs where the checksum backstops any misresolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
	/// Unicode normalization and exact table lookup only. This is the only
	/// mode allowed to produce KDF input.
	Strict,
	/// Strict lookup first, then script-aware diacritic and affix fallbacks.
	Fuzzy,
}

impl LookupTable {
	/// Resolve a single word, emoji or spelled-out entry to its icon index.
	pub fn resolve(&self, word: &str, mode: ResolveMode) -> Option<IconIndex> {
		let key = normalize::lookup_key(word);
		if key.is_empty() {
			return None;
		}
		if let Some(index) = self.keys.get(&key) {
			return Some(*index);
		}
		match mode {
			ResolveMode::Strict => None,
			ResolveMode::Fuzzy => self.resolve_fuzzy(&key),
		}
	}

	/// Resolve a word list. Returns one entry per input position plus a
	/// structured error per miss; misses never abort the remaining words.
	pub fn resolve_many<S: AsRef<str>>(
		&self,
		words: &[S],
		mode: ResolveMode,
	) -> (Vec<Option<IconIndex>>, Vec<Error>) {
		let mut indexes = Vec::with_capacity(words.len());
		let mut errors = Vec::new();
		for word in words {
			let resolved = self.resolve(word.as_ref(), mode);
			if resolved.is_none() {
				errors.push(Error::Unresolvable(word.as_ref().to_string()));
			}
			indexes.push(resolved);
		}
		(indexes, errors)
	}

	/// Autocomplete: every table key starting with the normalized prefix,
	/// deduplicated by icon index, word-ascending, truncated to `limit`.
	pub fn search(&self, prefix: &str, limit: usize) -> Vec<(String, IconIndex)> {
		let prefix = normalize::lookup_key(prefix);
		if prefix.is_empty() || limit == 0 {
			return Vec::new();
		}
		let start = self.sorted_keys.partition_point(|(key, _)| key.as_str() < prefix.as_str());
		let mut seen = HashSet::new();
		let mut results = Vec::new();
		for (key, index) in &self.sorted_keys[start..] {
			if !key.starts_with(&prefix) {
				break;
			}
			if seen.insert(*index) {
				results.push((key.clone(), *index));
				if results.len() == limit {
					break;
				}
			}
		}
		results
	}

	/// The fuzzy fallback ladder, in fixed order. Each rung produces one or
	/// more candidate keys; the first hit wins.
	///
	/// Folding must work in both directions: the registered key may carry the
	/// diacritic the typist dropped, or the other way around. Candidates are
	/// therefore matched against the exact key map and against the
	/// load-time index of folded registered keys.
	fn resolve_fuzzy(&self, key: &str) -> Option<IconIndex> {
		let script = normalize::dominant_script(key);

		if normalize::mark_policy(script) == MarkPolicy::Fold {
			let folded = normalize::fold_script(script, key);
			if let Some(index) = self.fold_aware_hit(&folded) {
				return Some(index);
			}
		}

		if script == Script::Arabic {
			if let Some(stripped) = normalize::strip_arabic_article(key) {
				if let Some(index) = self.candidate_hit(&stripped, script) {
					return Some(index);
				}
			}
		}
		if script == Script::Hebrew {
			if let Some(stripped) = normalize::strip_hebrew_article(key) {
				if let Some(index) = self.candidate_hit(&stripped, script) {
					return Some(index);
				}
			}
		}
		if script == Script::Latin {
			if let Some(stripped) = normalize::strip_romance_contraction(key) {
				if let Some(index) = self.candidate_hit(&stripped, script) {
					return Some(index);
				}
			}
			for stem in normalize::strip_noun_suffix(key) {
				if let Some(index) = self.candidate_hit(&stem, script) {
					return Some(index);
				}
			}
		}
		None
	}

	/// Exact hit first, then the unambiguous folded-key aliases.
	fn fold_aware_hit(&self, candidate: &str) -> Option<IconIndex> {
		if let Some(index) = self.keys.get(candidate) {
			return Some(*index);
		}
		self.folded_keys.get(candidate).copied().flatten()
	}

	/// An affix-stripped candidate, matched as-is and diacritic-folded (an
	/// affixed word can also carry accents).
	fn candidate_hit(&self, candidate: &str, script: Script) -> Option<IconIndex> {
		if let Some(index) = self.fold_aware_hit(candidate) {
			return Some(index);
		}
		let folded = normalize::fold_script(script, candidate);
		if folded != candidate {
			return self.fold_aware_hit(&folded);
		}
		None
	}
}
