use isolang::Language;

use crate::errors::ConfigError;

/// Language utilities for ISO language code handling
///
/// Configuration accepts ISO 639-1 (2-letter) and ISO 639-2 (3-letter)
/// codes; prompts want full English language names. This module resolves
/// between the two.
/// ISO 639-2/B codes that differ from their 639-2/T equivalents.
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"), // French
    ("ger", "deu"), // German
    ("dut", "nld"), // Dutch
    ("gre", "ell"), // Greek
    ("chi", "zho"), // Chinese
    ("cze", "ces"), // Czech
    ("ice", "isl"), // Icelandic
    ("alb", "sqi"), // Albanian
    ("arm", "hye"), // Armenian
    ("baq", "eus"), // Basque
    ("bur", "mya"), // Burmese
    ("per", "fas"), // Persian
    ("geo", "kat"), // Georgian
    ("may", "msa"), // Malay
    ("mac", "mkd"), // Macedonian
    ("rum", "ron"), // Romanian
    ("slo", "slk"), // Slovak
    ("wel", "cym"), // Welsh
];

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String, ConfigError> {
    let normalized = code.trim().to_lowercase();

    match normalized.len() {
        // 2-letter code: convert to 3-letter
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        // 3-letter code: accept 639-2/T directly, map 639-2/B variants
        3 => {
            if Language::from_639_3(&normalized).is_some() {
                return Ok(normalized);
            }
            if let Some((_, part2t)) = PART2B_TO_PART2T
                .iter()
                .find(|(part2b, _)| *part2b == normalized)
            {
                return Ok(part2t.to_string());
            }
        }
        _ => {}
    }

    Err(ConfigError::InvalidLanguage(code.to_string()))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String, ConfigError> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| ConfigError::InvalidLanguage(code.to_string()))?;

    Ok(lang.to_name().to_string())
}
