//! Cross-implementation fixture vectors and full-pipeline properties.
//!
//! The cheap layers (checksum, extract-path fingerprint, profile HMAC) are
//! locked to reference vectors. The full pipeline runs through Argon2id, so
//! its tests assert the contract properties (determinism across input forms,
//! passphrase separation) rather than gridding vectors.

use universal_seed::{
	compute_checksum, derive_master_key, derive_master_key_from_indexes, derive_profile,
	fingerprint, verify_checksum_indexes, Error, MasterKey, Seed,
};

/// 36-index fixture with a valid checksum (`0E E4`).
fn fixture_indexes_36() -> Vec<u8> {
	let mut data = vec![15u8, 63, 136];
	data.extend((0u32..31).map(|i| ((i * 7 + 3) % 256) as u8));
	let mut full = data.clone();
	full.extend_from_slice(&compute_checksum(&data));
	full
}

fn fixture_words_36() -> Vec<String> {
	Seed::from_indexes(&fixture_indexes_36())
		.unwrap()
		.words(Some("en"))
		.unwrap()
		.into_iter()
		.map(|w| w.word)
		.collect()
}

#[test]
fn checksum_fixture_vectors() {
	let data: Vec<u8> = (0u8..22).collect();
	assert_eq!(compute_checksum(&data), [0xB2, 0xCC]);

	let full = fixture_indexes_36();
	assert_eq!(&full[34..], &[0x0E, 0xE4]);
	assert!(verify_checksum_indexes(&full));

	// any change to the trailing bytes must be rejected
	for flip in 1u8..=3 {
		let mut corrupted = full.clone();
		corrupted[35] ^= flip;
		assert!(!verify_checksum_indexes(&corrupted));
		assert_eq!(Seed::from_indexes(&corrupted), Err(Error::ChecksumMismatch));
	}
}

#[test]
fn fingerprint_fast_path_vectors() {
	let seed = Seed::from_indexes(&fixture_indexes_36()).unwrap();
	assert_eq!(seed.fingerprint("").unwrap(), "A3935F0A");

	let data24: Vec<u8> = (0u32..22).map(|i| ((i * 11 + 5) % 256) as u8).collect();
	let mut full24 = data24.clone();
	full24.extend_from_slice(&compute_checksum(&data24));
	assert_eq!(Seed::from_indexes(&full24).unwrap().fingerprint("").unwrap(), "60DE9E86");
}

#[test]
fn master_key_is_deterministic_across_input_forms() {
	let indexes = fixture_indexes_36();
	let from_indexes = derive_master_key_from_indexes(&indexes, "").unwrap();
	let from_words = derive_master_key(&fixture_words_36(), "").unwrap();

	assert_eq!(from_indexes, from_words);
	assert_eq!(from_indexes.as_bytes().len(), 64);
	assert_ne!(from_indexes.encryption_key(), from_indexes.authentication_key());

	// the fast-path fingerprint is the extract layer, not the master key
	assert_ne!(
		hex::encode_upper(&from_indexes.as_bytes()[..4]),
		"A3935F0A".to_string(),
	);
}

#[test]
fn passphrase_separates_keys_and_fingerprints() {
	let indexes = fixture_indexes_36();
	let bare = derive_master_key_from_indexes(&indexes, "").unwrap();
	let passworded = derive_master_key_from_indexes(&indexes, "hunter2").unwrap();

	assert_ne!(bare, passworded);

	let seed = Seed::from_indexes(&indexes).unwrap();
	let fp = seed.fingerprint("hunter2").unwrap();
	assert_eq!(fp, hex::encode_upper(&passworded.as_bytes()[..4]));
	assert_ne!(fp, seed.fingerprint("").unwrap());
}

#[test]
fn unicode_passphrase_is_taken_verbatim() {
	let words = fixture_words_36();
	let fp = fingerprint(&words, "パスワード").unwrap();
	assert_eq!(fp.len(), 8);
	assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
	assert_ne!(fp, fingerprint(&words, "").unwrap());
}

#[test]
fn profile_keys_are_independent() {
	let mut bytes = [0u8; 64];
	for (i, b) in bytes.iter_mut().enumerate() {
		*b = (i as u8).wrapping_mul(13).wrapping_add(7);
	}
	let master = MasterKey::from_bytes(bytes);

	let personal = derive_profile(&master, "personal");
	let business = derive_profile(&master, "business");
	let default = derive_profile(&master, "");

	assert_ne!(personal, business);
	assert_ne!(personal.as_bytes(), master.as_bytes());
	assert_ne!(business.as_bytes(), master.as_bytes());
	assert_eq!(default.as_bytes(), master.as_bytes());

	// deterministic
	assert_eq!(derive_profile(&master, "personal"), personal);
}

#[test]
fn derivation_rejects_invalid_input() {
	assert_eq!(
		derive_master_key_from_indexes(&[0u8; 23], ""),
		Err(Error::InvalidWordCount(23)),
	);
	assert_eq!(
		derive_master_key(&["dog", "blorp"], ""),
		Err(Error::InvalidWordCount(2)),
	);

	let mut corrupted = fixture_indexes_36();
	corrupted[0] ^= 0xFF;
	assert_eq!(
		derive_master_key_from_indexes(&corrupted, ""),
		Err(Error::ChecksumMismatch),
	);

	let mut words = fixture_words_36();
	words[0] = "blorp".to_string();
	assert_eq!(derive_master_key(&words, ""), Err(Error::Unresolvable("blorp".to_string())));
}
