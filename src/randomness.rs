
use crate::entropy::EntropyPool;

/// Default validation sample size in bytes.
pub const DEFAULT_SAMPLE_SIZE: usize = 2048;
/// Default number of samples drawn when none is supplied.
pub const DEFAULT_NUM_SAMPLES: usize = 5;
/// Family-wise significance level, Bonferroni-corrected across every
/// p-value a verification run evaluates.
pub const ALPHA: f64 = 0.01;

/// p-values evaluated per sample: monobit + chi-squared + runs + 15
/// autocorrelation lags.
const P_VALUES_PER_SAMPLE: usize = 3 + AUTOCORR_MAX_LAG;
const AUTOCORR_MAX_LAG: usize = 15;

/// Outcome of one statistical test on one sample.
#[derive(Clone, Debug)]
pub struct TestOutcome {
	/// Test name (`monobit`, `chi-squared`, `runs`, `autocorrelation`).
	pub name: &'static str,
	/// Zero-based sample number the test ran on.
	pub sample: usize,
	/// The test's p-value; for autocorrelation, the worst lag.
	pub p_value: f64,
	/// Whether the p-value clears the corrected significance level.
	pub passed: bool,
}

/// Aggregate verification report.
#[derive(Clone, Debug)]
pub struct RandomnessReport {
	/// True only when every test on every sample passed.
	pub passed: bool,
	/// Per-test outcomes, in execution order.
	pub tests: Vec<TestOutcome>,
	/// One-line human-readable verdict.
	pub summary: String,
}

/// Run the NIST SP 800-22 subset.
///
/// With `sample` supplied, that buffer is validated as a single sample.
/// Otherwise `num_samples` buffers of `sample_size` bytes are drawn from a
/// fresh entropy pool. The overall verdict requires every test on every
/// sample to pass at the Bonferroni-corrected level.
pub fn verify_randomness(
	sample: Option<&[u8]>,
	sample_size: usize,
	num_samples: usize,
) -> RandomnessReport {
	let samples: Vec<Vec<u8>> = match sample {
		Some(bytes) => vec![bytes.to_vec()],
		None => {
			let mut pool = EntropyPool::new();
			(0..num_samples.max(1)).map(|_| pool.extract_bytes(sample_size, None)).collect()
		}
	};

	let alpha = ALPHA / (P_VALUES_PER_SAMPLE * samples.len()) as f64;
	let mut tests = Vec::with_capacity(4 * samples.len());
	for (i, bytes) in samples.iter().enumerate() {
		tests.extend(test_sample(bytes, i, alpha));
	}

	let passed = tests.iter().all(|t| t.passed);
	let failed: Vec<&str> =
		tests.iter().filter(|t| !t.passed).map(|t| t.name).collect();
	let summary = if passed {
		format!(
			"4 statistical tests over {} sample(s) of {} byte(s): pass",
			samples.len(),
			samples.first().map(|s| s.len()).unwrap_or(0),
		)
	} else {
		format!("randomness validation failed: {}", failed.join(", "))
	};

	RandomnessReport { passed, tests, summary }
}

/// Gate used by seed generation: all four tests on a single extraction.
pub(crate) fn validate_extract(bytes: &[u8]) -> bool {
	let alpha = ALPHA / P_VALUES_PER_SAMPLE as f64;
	test_sample(bytes, 0, alpha).iter().all(|t| t.passed)
}

fn test_sample(bytes: &[u8], sample: usize, alpha: f64) -> Vec<TestOutcome> {
	let bits = to_bits(bytes);
	let outcome = |name, p_value: f64| TestOutcome {
		name,
		sample,
		p_value,
		passed: p_value >= alpha,
	};
	vec![
		outcome("monobit", monobit_p(&bits)),
		outcome("chi-squared", chi_squared_p(bytes)),
		outcome("runs", runs_p(&bits)),
		outcome("autocorrelation", autocorrelation_p(&bits)),
	]
}

fn to_bits(bytes: &[u8]) -> Vec<u8> {
	let mut bits = Vec::with_capacity(bytes.len() * 8);
	for byte in bytes {
		for shift in (0..8).rev() {
			bits.push((byte >> shift) & 1);
		}
	}
	bits
}

/// Frequency (monobit) test.
fn monobit_p(bits: &[u8]) -> f64 {
	let n = bits.len();
	if n == 0 {
		return 0.0;
	}
	let ones: i64 = bits.iter().map(|b| *b as i64).sum();
	let s = (2 * ones - n as i64) as f64 / (n as f64).sqrt();
	erfc(s.abs() / std::f64::consts::SQRT_2)
}

/// Chi-squared uniformity over the 256 byte buckets, with the
/// Wilson-Hilferty normal approximation for the 255-dof distribution.
fn chi_squared_p(bytes: &[u8]) -> f64 {
	if bytes.is_empty() {
		return 0.0;
	}
	let mut counts = [0u32; 256];
	for byte in bytes {
		counts[*byte as usize] += 1;
	}
	let expected = bytes.len() as f64 / 256.0;
	let statistic: f64 =
		counts.iter().map(|c| (*c as f64 - expected).powi(2) / expected).sum();

	let k = 255.0f64;
	let z = ((statistic / k).powf(1.0 / 3.0) - (1.0 - 2.0 / (9.0 * k))) / (2.0 / (9.0 * k)).sqrt();
	erfc(z.abs() / std::f64::consts::SQRT_2)
}

/// Runs test: number of bit transitions against its expected distribution.
fn runs_p(bits: &[u8]) -> f64 {
	let n = bits.len();
	if n < 2 {
		return 0.0;
	}
	let pi = bits.iter().map(|b| *b as f64).sum::<f64>() / n as f64;
	// frequency prerequisite per SP 800-22 §2.3
	if (pi - 0.5).abs() >= 2.0 / (n as f64).sqrt() {
		return 0.0;
	}
	let runs = 1 + bits.windows(2).filter(|w| w[0] != w[1]).count();
	let expected = 2.0 * n as f64 * pi * (1.0 - pi);
	let denom = 2.0 * (2.0 * n as f64).sqrt() * pi * (1.0 - pi);
	erfc((runs as f64 - expected).abs() / denom)
}

/// Serial autocorrelation at lags 1..=15; the reported p-value is the worst
/// lag, and the caller's threshold already accounts for all fifteen.
fn autocorrelation_p(bits: &[u8]) -> f64 {
	let n = bits.len();
	let mut worst = 1.0f64;
	for lag in 1..=AUTOCORR_MAX_LAG {
		if n <= lag + 1 {
			return 0.0;
		}
		let m = n - lag;
		let matches = (0..m).filter(|i| bits[*i] == bits[*i + lag]).count();
		let z = (matches as f64 - m as f64 / 2.0) / (m as f64 / 4.0).sqrt();
		let p = erfc(z.abs() / std::f64::consts::SQRT_2);
		if p < worst {
			worst = p;
		}
	}
	worst
}

/// Complementary error function, Abramowitz & Stegun 7.1.26 (|ε| < 1.5e-7).
fn erfc(x: f64) -> f64 {
	if x < 0.0 {
		return 2.0 - erfc(-x);
	}
	let t = 1.0 / (1.0 + 0.3275911 * x);
	let poly = t
		* (0.254829592
			+ t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
	poly * (-x * x).exp()
}
