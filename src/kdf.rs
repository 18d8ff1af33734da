
use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use bitcoin_hashes::{hmac, sha512, Hash, HashEngine};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::pbkdf2;
use crate::seed::Seed;
use crate::Error;

/// Protocol domain separator. Every derived value is bound to it; changing
/// any parameter below means a new separator and a new protocol version.
pub(crate) const DOMAIN: &[u8] = b"universal-seed-v2";

const EXTRACT_SALT: &[u8] = DOMAIN;
const PBKDF2_SALT: &[u8] = b"universal-seed-v2-stretch-pbkdf2";
const PBKDF2_ROUNDS: usize = 600_000;
const ARGON2_SALT: &[u8] = b"universal-seed-v2-stretch-argon2id";
const ARGON2_TIME_COST: u32 = 3;
const ARGON2_MEMORY_KIB: u32 = 65536;
const ARGON2_PARALLELISM: u32 = 4;
const EXPAND_INFO: &[u8] = b"universal-seed-v2-master";
const PROFILE_INFO: &[u8] = b"universal-seed-v2-profile";
const KEY_LEN: usize = 64;

/// A derived 64-byte master key.
///
/// By convention the first 32 bytes are an encryption key and the last 32 an
/// authentication key; the whole value may also be used directly. Zeroized
/// on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
	/// Wrap an existing 64-byte key (for callers reloading stored material).
	pub fn from_bytes(bytes: [u8; 64]) -> MasterKey {
		MasterKey(bytes)
	}

	/// The full 64-byte key.
	pub fn as_bytes(&self) -> &[u8; 64] {
		&self.0
	}

	/// Conventional encryption half (bytes 0..32).
	pub fn encryption_key(&self) -> &[u8] {
		&self.0[..32]
	}

	/// Conventional authentication half (bytes 32..64).
	pub fn authentication_key(&self) -> &[u8] {
		&self.0[32..]
	}
}

impl PartialEq for MasterKey {
	fn eq(&self, other: &MasterKey) -> bool {
		self.0[..] == other.0[..]
	}
}
impl Eq for MasterKey {}

impl fmt::Debug for MasterKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("MasterKey(<64 bytes>)")
	}
}

/// A 64-byte profile key derived from a master key and a profile password.
/// Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ProfileKey([u8; KEY_LEN]);

impl ProfileKey {
	/// The full 64-byte key.
	pub fn as_bytes(&self) -> &[u8; 64] {
		&self.0
	}
}

impl PartialEq for ProfileKey {
	fn eq(&self, other: &ProfileKey) -> bool {
		self.0[..] == other.0[..]
	}
}
impl Eq for ProfileKey {}

impl fmt::Debug for ProfileKey {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("ProfileKey(<64 bytes>)")
	}
}

fn hmac_sha512(key: &[u8], segments: &[&[u8]]) -> [u8; 64] {
	let mut engine = hmac::HmacEngine::<sha512::Hash>::new(key);
	for segment in segments {
		engine.input(segment);
	}
	hmac::Hmac::from_engine(engine).to_byte_array()
}

/// Commit every index to its slot: `(position, index)` byte pairs, then the
/// raw passphrase. The passphrase is taken verbatim (no normalization, no
/// trimming), so an empty one is byte-identical to none at all.
fn positional_payload(data_indexes: &[u8], passphrase: &[u8]) -> Zeroizing<Vec<u8>> {
	let mut payload =
		Zeroizing::new(Vec::with_capacity(data_indexes.len() * 2 + passphrase.len()));
	for (position, index) in data_indexes.iter().enumerate() {
		payload.push(position as u8);
		payload.push(*index);
	}
	payload.extend_from_slice(passphrase);
	payload
}

fn argon2id() -> Argon2<'static> {
	let params =
		Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME_COST, ARGON2_PARALLELISM, Some(KEY_LEN))
			.expect("frozen Argon2id parameters are valid");
	Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Run the full derivation pipeline for a validated seed.
///
/// Verify and bind happened at [Seed] construction and in the payload; the
/// remaining layers are extract (HKDF over SHA-512), the two stretch stages
/// (PBKDF2 then Argon2id) and the final expand. Every intermediate is wiped
/// on all exit paths. Expect one to three seconds of CPU and a 64 MiB peak.
pub(crate) fn derive_master_key(seed: &Seed, passphrase: &str) -> Result<MasterKey, Error> {
	let payload = positional_payload(seed.data_indexes(), passphrase.as_bytes());

	let prk = Zeroizing::new(hmac_sha512(EXTRACT_SALT, &[&payload[..]]));

	let mut stretched = Zeroizing::new([0u8; KEY_LEN]);
	pbkdf2::pbkdf2(&prk[..], PBKDF2_SALT, PBKDF2_ROUNDS, &mut stretched[..]);

	let mut hardened = Zeroizing::new([0u8; KEY_LEN]);
	argon2id()
		.hash_password_into(&stretched[..], ARGON2_SALT, &mut hardened[..])
		.expect("frozen Argon2id invocation cannot fail");

	// HKDF-Expand with L = 64 is exactly one block: T(1) = HMAC(PRK', info || 0x01)
	Ok(MasterKey(hmac_sha512(&hardened[..], &[EXPAND_INFO, &[0x01]])))
}

/// 32-bit public identifier of a seed (and passphrase), as 8 upper-hex
/// characters.
///
/// Without a passphrase only the cheap extract layer runs, so UIs can show
/// the fingerprint instantly; with one, the full pipeline is the only thing
/// that can vouch for it.
pub(crate) fn fingerprint(seed: &Seed, passphrase: &str) -> Result<String, Error> {
	if passphrase.is_empty() {
		let payload = positional_payload(seed.data_indexes(), b"");
		let prk = Zeroizing::new(hmac_sha512(EXTRACT_SALT, &[&payload[..]]));
		Ok(hex::encode_upper(&prk[..4]))
	} else {
		let key = derive_master_key(seed, passphrase)?;
		Ok(hex::encode_upper(&key.as_bytes()[..4]))
	}
}

/// Derive an independent profile key from a master key and a password.
///
/// The empty password names the default profile: the master key itself.
/// Distinct passwords yield unrelated keys, and without the password a
/// profile cannot be enumerated from the master key holder's view.
pub fn derive_profile(master_key: &MasterKey, password: &str) -> ProfileKey {
	if password.is_empty() {
		return ProfileKey(*master_key.as_bytes());
	}
	ProfileKey(hmac_sha512(master_key.as_bytes(), &[PROFILE_INFO, password.as_bytes()]))
}

/// Human-readable description of the frozen pipeline.
pub fn kdf_info() -> String {
	format!(
		"universal-seed-v2 key derivation: positional binding of (position, index) \
		 pairs plus raw passphrase bytes -> HKDF-Extract (HMAC-SHA-512, salt \
		 \"universal-seed-v2\") -> PBKDF2-HMAC-SHA512 ({} rounds, salt \
		 \"universal-seed-v2-stretch-pbkdf2\") -> Argon2id (t={}, m={} KiB, p={}, salt \
		 \"universal-seed-v2-stretch-argon2id\") -> HKDF-Expand (HMAC-SHA-512, info \
		 \"universal-seed-v2-master\") -> 64 bytes",
		PBKDF2_ROUNDS, ARGON2_TIME_COST, ARGON2_MEMORY_KIB, ARGON2_PARALLELISM,
	)
}

impl Seed {
	/// Derive the 64-byte master key for this seed and passphrase. See
	/// [kdf_info] for the pipeline. Blocks for the full KDF duration.
	pub fn derive_master_key(&self, passphrase: &str) -> Result<MasterKey, Error> {
		derive_master_key(self, passphrase)
	}

	/// The seed's public fingerprint (8 upper-hex characters).
	pub fn fingerprint(&self, passphrase: &str) -> Result<String, Error> {
		fingerprint(self, passphrase)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::seed::compute_checksum;

	fn seed_from_data(data: &[u8]) -> Seed {
		let mut full = data.to_vec();
		full.extend_from_slice(&compute_checksum(data));
		Seed::from_indexes(&full).unwrap()
	}

	fn fixture_seed_36() -> Seed {
		let mut data = vec![15u8, 63, 136];
		data.extend((0..31).map(|i| ((i * 7 + 3) % 256) as u8));
		seed_from_data(&data)
	}

	#[test]
	fn positional_payload_layout() {
		let payload = positional_payload(&[10, 20, 30], b"pw");
		assert_eq!(&payload[..], &[0, 10, 1, 20, 2, 30, b'p', b'w']);

		// empty passphrase appends nothing
		let bare = positional_payload(&[10, 20, 30], b"");
		assert_eq!(&bare[..], &[0, 10, 1, 20, 2, 30]);
	}

	#[test]
	fn fingerprint_vectors() {
		// locked against the reference implementation of the extract layer
		assert_eq!(fixture_seed_36().fingerprint("").unwrap(), "A3935F0A");

		let data24: Vec<u8> = (0..22).map(|i| ((i * 11 + 5) % 256) as u8).collect();
		assert_eq!(seed_from_data(&data24).fingerprint("").unwrap(), "60DE9E86");
	}

	#[test]
	fn fingerprint_format() {
		let fp = fixture_seed_36().fingerprint("").unwrap();
		assert_eq!(fp.len(), 8);
		assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
	}

	#[test]
	fn expand_step_vector() {
		let prk: Vec<u8> = (64u8..128).collect();
		let out = hmac_sha512(&prk, &[EXPAND_INFO, &[0x01]]);
		assert_eq!(
			hex::encode(&out[..]),
			concat!(
				"229512fe8e407528ded3c2d8f9ebf5e69b1731a7a39039e7bec66412d5c99a11",
				"b3dc8bb0419c872ccfe923e4e857a420e649eefc75e146a7e43b794d54964482",
			),
		);
	}

	#[test]
	fn profile_vectors() {
		let mut bytes = [0u8; 64];
		for (i, b) in bytes.iter_mut().enumerate() {
			*b = i as u8;
		}
		let master = MasterKey::from_bytes(bytes);

		let personal = derive_profile(&master, "personal");
		assert_eq!(
			hex::encode(&personal.as_bytes()[..]),
			concat!(
				"41acdfbc5354f7fec8b0c8eb47fe4d351c55c2c3d7b17ef147bcd4d732eef963",
				"e12b26a4e49491bd4199433d7ec097b048e89b8e15d84826a46f211acbb1b739",
			),
		);

		let business = derive_profile(&master, "business");
		assert_eq!(
			hex::encode(&business.as_bytes()[..]),
			concat!(
				"f232210d9ffc50c037b2b29cbb7c41fa67b3722f1bccec69584572673ee21528",
				"92020a352fa81f08af8b8a02293f87b96c109a5f61329732435e8b41e49d593b",
			),
		);

		// Unicode passwords are taken verbatim
		let unicode = derive_profile(&master, "パスワード");
		assert_eq!(
			hex::encode(&unicode.as_bytes()[..]),
			concat!(
				"75f536e4ec7ac148201a18f019d819f3ca6398404adf1e9524677e503427df62",
				"d2c4646bb19252e71650718c45ce622a57f0890f06031f325ee8c266914a31aa",
			),
		);

		assert_ne!(personal, business);
	}

	#[test]
	fn empty_password_profile_is_the_master_key() {
		let master = MasterKey::from_bytes([7u8; 64]);
		let profile = derive_profile(&master, "");
		assert_eq!(profile.as_bytes(), master.as_bytes());
		assert_ne!(derive_profile(&master, "x").as_bytes(), master.as_bytes());
	}

	#[test]
	fn key_debug_is_redacted() {
		let master = MasterKey::from_bytes([0xAB; 64]);
		let rendered = format!("{:?}", master);
		assert!(!rendered.contains("AB"));
		assert!(!rendered.contains("171"));
	}

	#[test]
	fn kdf_info_names_every_stage() {
		let info = kdf_info();
		for needle in
			["positional", "HKDF-Extract", "PBKDF2", "600000", "Argon2id", "65536", "HKDF-Expand"]
				.iter()
		{
			assert!(info.contains(needle), "missing {}", needle);
		}
	}

	#[test]
	fn key_halves_split_cleanly() {
		let master = MasterKey::from_bytes([3u8; 64]);
		assert_eq!(master.encryption_key().len(), 32);
		assert_eq!(master.authentication_key().len(), 32);
		assert_eq!(
			[master.encryption_key(), master.authentication_key()].concat(),
			master.as_bytes().to_vec(),
		);
	}
}
