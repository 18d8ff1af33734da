
use bitcoin_hashes::{hmac, sha256, Hash, HashEngine};
use tracing::warn;
use zeroize::Zeroize;

use crate::entropy::EntropyPool;
use crate::lookup::LookupTable;
use crate::resolve::ResolveMode;
use crate::{randomness, Error, IconIndex};

/// HMAC key binding the checksum to this protocol version.
const CHECKSUM_KEY: &[u8] = b"universal-seed-v2-checksum";
/// Checksum bytes appended to the data indexes.
const CHECKSUM_LEN: usize = 2;
/// Hard ceiling on entropy-validation retries during generation.
const MAX_GENERATION_ATTEMPTS: usize = 10;

fn valid_word_count(count: usize) -> bool {
	count == 24 || count == 36
}

/// Compute the two checksum bytes for a run of data indexes:
/// `HMAC-SHA-256(CHECKSUM_KEY, data)[0..2]`.
pub fn compute_checksum(data_indexes: &[u8]) -> [u8; CHECKSUM_LEN] {
	let mut engine = hmac::HmacEngine::<sha256::Hash>::new(CHECKSUM_KEY);
	engine.input(data_indexes);
	let digest = hmac::Hmac::<sha256::Hash>::from_engine(engine).to_byte_array();
	[digest[0], digest[1]]
}

/// Verify a full index sequence. Never fails: a malformed shape is simply
/// not a valid seed.
pub fn verify_checksum_indexes(full_seed: &[u8]) -> bool {
	if !valid_word_count(full_seed.len()) {
		return false;
	}
	let (data, checksum) = full_seed.split_at(full_seed.len() - CHECKSUM_LEN);
	compute_checksum(data)[..] == checksum[..]
}

/// One rendered seed position: the icon index and its display word in the
/// rendering language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedWord {
	/// The icon index this position encodes.
	pub index: IconIndex,
	/// The primary display word for the rendering language.
	pub word: String,
}

/// A validated icon-index seed.
///
/// Always 24 or 36 indexes with a verified checksum: every constructor
/// checks both, so holding a `Seed` is proof the checksum matched. The
/// display rendering is not stored; [Seed::words] re-derives it per
/// language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed(Vec<u8>);

impl Seed {
	/// Build a seed from its full index sequence (data plus checksum).
	pub fn from_indexes(indexes: &[u8]) -> Result<Seed, Error> {
		if !valid_word_count(indexes.len()) {
			return Err(Error::InvalidWordCount(indexes.len()));
		}
		if !verify_checksum_indexes(indexes) {
			return Err(Error::ChecksumMismatch);
		}
		Ok(Seed(indexes.to_vec()))
	}

	/// Build a seed from untyped integers, as callers holding parsed user
	/// input tend to have them.
	pub fn from_raw_indexes(values: &[u32]) -> Result<Seed, Error> {
		let mut indexes = Vec::with_capacity(values.len());
		for value in values {
			if *value > 255 {
				return Err(Error::InvalidIndex(*value));
			}
			indexes.push(*value as u8);
		}
		Seed::from_indexes(&indexes)
	}

	/// Build a seed from words in any supported language, strict-resolved
	/// against the process-wide lookup table.
	pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Seed, Error> {
		Seed::from_words_in(LookupTable::global()?, words)
	}

	/// Build a seed from rendered `(index, word)` pairs.
	///
	/// Only the words are trusted; a pair whose carried index disagrees with
	/// what its word resolves to is treated as unresolvable rather than
	/// silently preferring either side.
	pub fn from_pairs(pairs: &[SeedWord]) -> Result<Seed, Error> {
		let table = LookupTable::global()?;
		if !valid_word_count(pairs.len()) {
			return Err(Error::InvalidWordCount(pairs.len()));
		}
		let mut indexes = Vec::with_capacity(pairs.len());
		for pair in pairs {
			match table.resolve(&pair.word, ResolveMode::Strict) {
				Some(index) if index == pair.index => indexes.push(index),
				_ => return Err(Error::Unresolvable(pair.word.clone())),
			}
		}
		Seed::from_indexes(&indexes)
	}

	/// [Seed::from_words] against a caller-provided table.
	pub fn from_words_in<S: AsRef<str>>(table: &LookupTable, words: &[S]) -> Result<Seed, Error> {
		if !valid_word_count(words.len()) {
			return Err(Error::InvalidWordCount(words.len()));
		}
		let mut indexes = Vec::with_capacity(words.len());
		for word in words {
			match table.resolve(word.as_ref(), ResolveMode::Strict) {
				Some(index) => indexes.push(index),
				None => return Err(Error::Unresolvable(word.as_ref().to_string())),
			}
		}
		Seed::from_indexes(&indexes)
	}

	/// Generate a fresh seed from validated entropy.
	///
	/// Each attempt extracts 512 bits from the pool and runs the four
	/// statistical tests on the extraction. Ten consecutive failures abort
	/// with [Error::EntropyUnavailable]: a broken RNG must surface, never
	/// degrade into a seed.
	pub fn generate(word_count: usize, extra_entropy: Option<&[u8]>) -> Result<Seed, Error> {
		if !valid_word_count(word_count) {
			return Err(Error::InvalidWordCount(word_count));
		}

		let mut pool = EntropyPool::new();
		for attempt in 1..=MAX_GENERATION_ATTEMPTS {
			let mut extracted = pool.extract(extra_entropy);
			if randomness::validate_extract(&extracted) {
				let data = &extracted[..word_count - CHECKSUM_LEN];
				let mut indexes = Vec::with_capacity(word_count);
				indexes.extend_from_slice(data);
				indexes.extend_from_slice(&compute_checksum(data));
				extracted.zeroize();
				return Ok(Seed(indexes));
			}
			extracted.zeroize();
			warn!(attempt, "entropy extraction failed statistical validation");
		}
		Err(Error::EntropyUnavailable)
	}

	/// The full index sequence, checksum included.
	pub fn indexes(&self) -> &[u8] {
		&self.0
	}

	/// The random portion (22 or 34 bytes).
	pub fn data_indexes(&self) -> &[u8] {
		&self.0[..self.0.len() - CHECKSUM_LEN]
	}

	/// The two checksum bytes.
	pub fn checksum(&self) -> [u8; CHECKSUM_LEN] {
		[self.0[self.0.len() - 2], self.0[self.0.len() - 1]]
	}

	/// Number of words (24 or 36).
	pub fn word_count(&self) -> usize {
		self.0.len()
	}

	/// Render the seed in a language (`None` = the table's default).
	pub fn words(&self, language: Option<&str>) -> Result<Vec<SeedWord>, Error> {
		self.words_in(LookupTable::global()?, language)
	}

	/// [Seed::words] against a caller-provided table.
	pub fn words_in(
		&self,
		table: &LookupTable,
		language: Option<&str>,
	) -> Result<Vec<SeedWord>, Error> {
		let language = language.unwrap_or_else(|| table.default_language());
		self.0
			.iter()
			.map(|index| {
				Ok(SeedWord {
					index: *index,
					word: table.primary_word(language, *index)?.to_string(),
				})
			})
			.collect()
	}
}
