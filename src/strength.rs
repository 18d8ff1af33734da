
use crate::Error;

/// Entropy carried by the seed itself: 22 or 34 random bytes.
const SEED_BITS_24: f64 = 176.0;
const SEED_BITS_36: f64 = 272.0;

/// Estimate the total security level of a seed plus passphrase, in bits.
///
/// The passphrase term is `length * log2(alphabet)` with the alphabet
/// inferred from the character classes present. The buckets are deliberately
/// coarse: this feeds a strength meter, not a security proof.
pub fn entropy_bits(word_count: usize, passphrase: &str) -> Result<f64, Error> {
	let seed_bits = match word_count {
		24 => SEED_BITS_24,
		36 => SEED_BITS_36,
		other => return Err(Error::InvalidWordCount(other)),
	};
	Ok(seed_bits + passphrase_bits(passphrase))
}

fn passphrase_bits(passphrase: &str) -> f64 {
	if passphrase.is_empty() {
		return 0.0;
	}
	passphrase.chars().count() as f64 * bits_per_char(passphrase)
}

fn bits_per_char(passphrase: &str) -> f64 {
	let mut lower = false;
	let mut upper = false;
	let mut digit = false;
	let mut symbol = false;
	for c in passphrase.chars() {
		if !c.is_ascii() {
			// any non-ASCII character promotes the whole phrase
			return 7.00;
		}
		if c.is_ascii_lowercase() {
			lower = true;
		} else if c.is_ascii_uppercase() {
			upper = true;
		} else if c.is_ascii_digit() {
			digit = true;
		} else {
			symbol = true;
		}
	}

	if symbol {
		6.55
	} else if lower && upper && digit {
		5.95
	} else if lower && upper {
		5.70
	} else if (lower || upper) && digit {
		5.95
	} else if lower || upper {
		4.70
	} else {
		// digits only
		3.32
	}
}
