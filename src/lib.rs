// Rust Universal Seed Library
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the CC0 Public Domain Dedication
// along with this software.
// If not, see <http://creativecommons.org/publicdomain/zero/1.0/>.
//

//! # Universal Seed (v2)
//!
//! Visual and multilingual seed phrases for cryptographic wallets: a seed is
//! a sequence of 24 or 36 icon indexes (0–255), recordable as words in any
//! supported language, as emoji, or as raw indexes. The last two indexes are
//! an HMAC-SHA-256 checksum over the data indexes; a hardened six-layer KDF
//! (positional binding, HKDF-Extract, PBKDF2, Argon2id, HKDF-Expand) turns a
//! seed and an optional passphrase into a 64-byte master key, from which
//! independent per-password profile keys can be derived.
//!
//! Everything here is deterministic and offline; no key material is ever
//! persisted by this crate. All v2 constants are frozen; see [kdf_info].
//!
//! ```
//! use universal_seed::{generate_words, verify_checksum, resolve, ResolveMode};
//!
//! let words = generate_words(24, None, Some("en")).unwrap();
//! assert_eq!(words.len(), 24);
//!
//! let spelled: Vec<String> = words.iter().map(|w| w.word.clone()).collect();
//! assert!(verify_checksum(&spelled));
//! assert_eq!(resolve("dog", ResolveMode::Strict).unwrap(), Some(15));
//! ```
//!
//! Key derivation is deliberately expensive (~1–3 s, 64 MiB peak):
//!
//! ```no_run
//! use universal_seed::{derive_master_key, derive_profile};
//!
//! # fn main() -> Result<(), universal_seed::Error> {
//! let words: Vec<String> = unimplemented!();
//! let master = derive_master_key(&words, "hunter2")?;
//! let hidden = derive_profile(&master, "business");
//! # Ok(())
//! # }
//! ```

#![deny(non_upper_case_globals)]
#![deny(non_camel_case_types)]
#![deny(non_snake_case)]
#![deny(unused_mut)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(missing_docs)]

mod entropy;
mod kdf;
mod lookup;
mod normalize;
mod pbkdf2;
mod randomness;
mod resolve;
mod seed;
mod strength;

pub use crate::entropy::{EntropyPool, MouseEntropyPool};
pub use crate::kdf::{derive_profile, kdf_info, MasterKey, ProfileKey};
pub use crate::lookup::LookupTable;
pub use crate::randomness::{
	verify_randomness, RandomnessReport, TestOutcome, DEFAULT_NUM_SAMPLES, DEFAULT_SAMPLE_SIZE,
};
pub use crate::resolve::ResolveMode;
pub use crate::seed::{compute_checksum, verify_checksum_indexes, Seed, SeedWord};
pub use crate::strength::entropy_bits;

/// One of the 256 frozen visual concepts. The numbering is part of the
/// compatibility contract.
pub type IconIndex = u8;

/// A universal-seed error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// Seed length is not 24 or 36 words.
	#[error("seed has {0} words, expected 24 or 36")]
	InvalidWordCount(usize),
	/// An integer index fell outside the 0..=255 icon range.
	#[error("icon index {0} is out of range (0..=255)")]
	InvalidIndex(u32),
	/// A word failed strict resolution against the lookup table.
	#[error("word cannot be resolved to an icon index: {0:?}")]
	Unresolvable(String),
	/// The trailing checksum bytes do not match the data indexes.
	#[error("seed checksum does not match its data indexes")]
	ChecksumMismatch,
	/// Entropy failed statistical validation ten consecutive times.
	#[error("entropy pool failed statistical validation 10 consecutive times")]
	EntropyUnavailable,
	/// The lookup-table artifact is unavailable or malformed.
	#[error("lookup table unavailable: {0}")]
	LookupTableMissing(String),
	/// A language code not present in the lookup-table artifact.
	#[error("unsupported language code: {0}")]
	UnknownLanguage(String),
}

/// Generate a fresh seed and render it in the given language (`None` = the
/// default language, English in the shipped artifact).
///
/// Blocks on OS RNG reads and the scheduling-noise entropy source. Fails
/// with [Error::EntropyUnavailable] if entropy validation fails ten times in
/// a row.
pub fn generate_words(
	word_count: usize,
	extra_entropy: Option<&[u8]>,
	language: Option<&str>,
) -> Result<Vec<SeedWord>, Error> {
	let table = LookupTable::global()?;
	let language = language.unwrap_or_else(|| table.default_language());
	// reject an unknown language before spending entropy
	if table.language_label(language).is_none() {
		return Err(Error::UnknownLanguage(language.to_string()));
	}
	let seed = Seed::generate(word_count, extra_entropy)?;
	seed.words_in(table, Some(language))
}

/// Verify a word-form seed. Never fails: anything that does not strictly
/// resolve to 24 or 36 checksummed indexes is simply `false`.
pub fn verify_checksum<S: AsRef<str>>(words: &[S]) -> bool {
	Seed::from_words(words).is_ok()
}

/// Derive the 64-byte master key from a word-form seed. See [kdf_info].
pub fn derive_master_key<S: AsRef<str>>(words: &[S], passphrase: &str) -> Result<MasterKey, Error> {
	Seed::from_words(words)?.derive_master_key(passphrase)
}

/// Derive the 64-byte master key from an index-form seed (checksum
/// included).
pub fn derive_master_key_from_indexes(
	indexes: &[u8],
	passphrase: &str,
) -> Result<MasterKey, Error> {
	Seed::from_indexes(indexes)?.derive_master_key(passphrase)
}

/// Fingerprint of a word-form seed: 8 upper-hex characters.
pub fn fingerprint<S: AsRef<str>>(words: &[S], passphrase: &str) -> Result<String, Error> {
	Seed::from_words(words)?.fingerprint(passphrase)
}

/// Resolve a single word or emoji against the process-wide lookup table.
pub fn resolve(word: &str, mode: ResolveMode) -> Result<Option<IconIndex>, Error> {
	Ok(LookupTable::global()?.resolve(word, mode))
}

/// Resolve a word list: per-position results plus an error per miss.
pub fn resolve_many<S: AsRef<str>>(
	words: &[S],
	mode: ResolveMode,
) -> Result<(Vec<Option<IconIndex>>, Vec<Error>), Error> {
	Ok(LookupTable::global()?.resolve_many(words, mode))
}

/// Autocomplete against the process-wide lookup table.
pub fn search(prefix: &str, limit: usize) -> Result<Vec<(String, IconIndex)>, Error> {
	Ok(LookupTable::global()?.search(prefix, limit))
}

/// Supported languages as `(code, label)` pairs, in artifact order.
pub fn languages() -> Result<Vec<(String, String)>, Error> {
	Ok(LookupTable::global()?
		.languages()
		.map(|(code, label)| (code.to_string(), label.to_string()))
		.collect())
}
