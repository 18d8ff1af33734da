
use bitcoin_hashes::{hmac, sha512, Hash, HashEngine};
use zeroize::Zeroize;

#[inline]
fn xor(res: &mut [u8], other: &[u8]) {
	debug_assert!(other.len() >= res.len(), "length mismatch in xor");

	res.iter_mut().zip(other.iter()).for_each(|(a, b)| *a ^= b);
}

/// PBKDF2-HMAC-SHA512 over the bitcoin_hashes engine.
///
/// The password is key material here (the HKDF extract output), so the
/// rolling U value is wiped once each block is folded in.
pub(crate) fn pbkdf2(password: &[u8], salt: &[u8], rounds: usize, res: &mut [u8]) {
	let prf = hmac::HmacEngine::<sha512::Hash>::new(password);

	for (block, chunk) in res.chunks_mut(sha512::Hash::LEN).enumerate() {
		for v in chunk.iter_mut() {
			*v = 0;
		}

		let mut u = {
			let mut prfc = prf.clone();
			prfc.input(salt);
			prfc.input(&((block + 1) as u32).to_be_bytes());

			let u = hmac::Hmac::from_engine(prfc).to_byte_array();
			xor(chunk, &u);
			u
		};

		for _ in 1..rounds {
			let mut prfc = prf.clone();
			prfc.input(&u);
			let next = hmac::Hmac::from_engine(prfc).to_byte_array();
			u.zeroize();
			u = next;

			xor(chunk, &u);
		}
		u.zeroize();
	}
}
