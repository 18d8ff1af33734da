
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Unicode script classes the normalizer distinguishes.
///
/// Only the scripts with a diacritic policy of their own are named; everything
/// else falls into [Script::Other] and is left untouched by fuzzy folding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Script {
	Latin,
	Greek,
	Cyrillic,
	Arabic,
	Hebrew,
	Devanagari,
	Bengali,
	Gurmukhi,
	Tamil,
	Telugu,
	Thai,
	Other,
}

/// Per-script diacritic policy: fold marks away, or preserve them because
/// they are semantically load-bearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MarkPolicy {
	Fold,
	Preserve,
}

/// The policy table. Indic scripts and Thai keep their marks: stripping a
/// matra or tone mark produces a different word, not a variant spelling.
const SCRIPT_POLICIES: &[(Script, MarkPolicy)] = &[
	(Script::Latin, MarkPolicy::Fold),
	(Script::Greek, MarkPolicy::Fold),
	(Script::Cyrillic, MarkPolicy::Fold),
	(Script::Arabic, MarkPolicy::Fold),
	(Script::Hebrew, MarkPolicy::Fold),
	(Script::Devanagari, MarkPolicy::Preserve),
	(Script::Bengali, MarkPolicy::Preserve),
	(Script::Gurmukhi, MarkPolicy::Preserve),
	(Script::Tamil, MarkPolicy::Preserve),
	(Script::Telugu, MarkPolicy::Preserve),
	(Script::Thai, MarkPolicy::Preserve),
];

pub(crate) fn script_of(c: char) -> Script {
	match c as u32 {
		0x0041..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
		0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
		0x0400..=0x052F => Script::Cyrillic,
		0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
		0x0590..=0x05FF => Script::Hebrew,
		0x0900..=0x097F => Script::Devanagari,
		0x0980..=0x09FF => Script::Bengali,
		0x0A00..=0x0A7F => Script::Gurmukhi,
		0x0B80..=0x0BFF => Script::Tamil,
		0x0C00..=0x0C7F => Script::Telugu,
		0x0E00..=0x0E7F => Script::Thai,
		_ => Script::Other,
	}
}

pub(crate) fn mark_policy(script: Script) -> MarkPolicy {
	SCRIPT_POLICIES
		.iter()
		.find(|(s, _)| *s == script)
		.map(|(_, p)| *p)
		.unwrap_or(MarkPolicy::Preserve)
}

/// Characters stripped from every lookup key: zero-width joiners, the soft
/// hyphen, the BOM and emoji variation selectors.
fn is_stripped(c: char) -> bool {
	match c as u32 {
		0x200C | 0x200D | 0x00AD | 0xFEFF => true,
		0xFE00..=0xFE0F => true,
		_ => false,
	}
}

/// Canonical lookup-key normalization: NFKC, zero-width strip, Unicode
/// lowercase. This is the entire strict-mode pipeline; anything beyond it is
/// a fuzzy fallback.
pub(crate) fn lookup_key(input: &str) -> String {
	let trimmed = input.trim();
	let stripped: String = trimmed.nfkc().filter(|c| !is_stripped(*c)).collect();
	stripped.to_lowercase()
}

/// Dominant script of a normalized key, decided by its first scripted
/// character.
pub(crate) fn dominant_script(key: &str) -> Script {
	key.chars()
		.map(script_of)
		.find(|s| *s != Script::Other)
		.unwrap_or(Script::Other)
}

/// Latin diacritic folding: NFD, drop combining marks, expand the letters
/// that decomposition alone does not reach.
pub(crate) fn fold_latin(key: &str) -> String {
	let mut out = String::with_capacity(key.len());
	for c in key.nfd() {
		if is_combining_mark(c) {
			continue;
		}
		match c {
			'ß' => out.push_str("ss"),
			'ø' => out.push('o'),
			'æ' => out.push_str("ae"),
			'œ' => out.push_str("oe"),
			'đ' => out.push('d'),
			'ð' => out.push('d'),
			'þ' => out.push_str("th"),
			'ł' => out.push('l'),
			_ => out.push(c),
		}
	}
	out
}

/// Greek tonos removal. Accented vowels decompose to base + U+0301.
pub(crate) fn fold_greek(key: &str) -> String {
	key.nfd().filter(|c| *c != '\u{0301}' && *c != '\u{0342}').collect()
}

/// Arabic tashkeel (short vowels, shadda, sukun) removal.
pub(crate) fn fold_arabic(key: &str) -> String {
	key.chars()
		.filter(|c| {
			let cp = *c as u32;
			!(0x064B..=0x0652).contains(&cp) && cp != 0x0640
		})
		.collect()
}

/// Hebrew niqqud removal.
pub(crate) fn fold_hebrew(key: &str) -> String {
	key.chars()
		.filter(|c| {
			let cp = *c as u32;
			!(0x05B0..=0x05BD).contains(&cp) && cp != 0x05C1 && cp != 0x05C2 && cp != 0x05C7
		})
		.collect()
}

/// Cyrillic yo-fold. The only accepted Cyrillic variant spelling.
pub(crate) fn fold_cyrillic(key: &str) -> String {
	key.chars().map(|c| if c == 'ё' { 'е' } else { c }).collect()
}

/// Apply the script's diacritic fold. Scripts whose marks are preserved come
/// back unchanged.
pub(crate) fn fold_script(script: Script, key: &str) -> String {
	if mark_policy(script) == MarkPolicy::Preserve {
		return key.to_string();
	}
	match script {
		Script::Greek => fold_greek(key),
		Script::Arabic => fold_arabic(key),
		Script::Hebrew => fold_hebrew(key),
		Script::Cyrillic => fold_cyrillic(key),
		_ => fold_latin(key),
	}
}

/// Strip the Arabic definite article.
pub(crate) fn strip_arabic_article(key: &str) -> Option<String> {
	key.strip_prefix("ال").map(|rest| rest.to_string())
}

/// Strip the Hebrew definite article.
pub(crate) fn strip_hebrew_article(key: &str) -> Option<String> {
	key.strip_prefix('ה').map(|rest| rest.to_string())
}

/// Strip the French/Italian elided article (`l'eau`, `l’acqua`).
pub(crate) fn strip_romance_contraction(key: &str) -> Option<String> {
	key.strip_prefix("l'")
		.or_else(|| key.strip_prefix("l\u{2019}"))
		.map(|rest| rest.to_string())
}

/// Definite-article noun suffixes (Scandinavian, Romanian, Icelandic),
/// longest first. Candidates only; the checksum remains the arbiter.
const NOUN_SUFFIXES: &[&str] = &["inn", "in", "ið", "ul", "ua", "le", "en", "et", "a"];

pub(crate) fn strip_noun_suffix(key: &str) -> Vec<String> {
	let mut candidates = Vec::new();
	for suffix in NOUN_SUFFIXES {
		if let Some(stem) = key.strip_suffix(suffix) {
			if !stem.is_empty() {
				candidates.push(stem.to_string());
			}
		}
	}
	candidates
}
