/*!
 * Language utilities.
 *
 * Table of languages the pipeline can dub into, the default text-to-speech
 * voice for each, and helpers to resolve user input (display names, ISO 639-1
 * or ISO 639-3 codes) to the canonical code used by the remote services.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Supported language entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedLanguage {
    /// Display name
    pub name: &'static str,
    /// Canonical code sent to the services
    pub code: &'static str,
    /// Default text-to-speech voice
    pub voice: &'static str,
}

// @const: Languages offered for source and target selection
pub const SUPPORTED_LANGUAGES: &[SupportedLanguage] = &[
    SupportedLanguage { name: "English", code: "en", voice: "en-US" },
    SupportedLanguage { name: "Spanish", code: "es", voice: "es-ES" },
    SupportedLanguage { name: "French", code: "fr", voice: "fr-FR" },
    SupportedLanguage { name: "German", code: "de", voice: "de-DE" },
    SupportedLanguage { name: "Japanese", code: "ja", voice: "ja-JP" },
    SupportedLanguage { name: "Hindi", code: "hi", voice: "hi-IN" },
    SupportedLanguage { name: "Chinese (Simplified)", code: "zh-CN", voice: "zh-CN" },
    SupportedLanguage { name: "Russian", code: "ru", voice: "ru-RU" },
    SupportedLanguage { name: "Italian", code: "it", voice: "it-IT" },
    SupportedLanguage { name: "Portuguese", code: "pt", voice: "pt-BR" },
    SupportedLanguage { name: "Arabic", code: "ar", voice: "ar" },
    SupportedLanguage { name: "Korean", code: "ko", voice: "ko" },
];

/// Primary subtag of a code: "zh-CN" -> "zh"
fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Look up an ISO language from a 2- or 3-letter primary subtag
fn iso_language(code: &str) -> Option<Language> {
    let primary = primary_subtag(code);
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Find a supported language by display name or code (case-insensitive).
/// ISO 639-2 codes resolve through their 639-1 equivalent ("spa" -> "es").
pub fn find_supported(input: &str) -> Option<&'static SupportedLanguage> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(exact) = SUPPORTED_LANGUAGES.iter().find(|lang| {
        lang.code.eq_ignore_ascii_case(trimmed) || lang.name.eq_ignore_ascii_case(trimmed)
    }) {
        return Some(exact);
    }

    // Fall back to the primary subtag, so "zh" or "zho" finds "zh-CN"
    let wanted = iso_language(trimmed)?;
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| iso_language(lang.code) == Some(wanted))
}

/// Canonical code for user input, or an error for unsupported languages
pub fn resolve_language_code(input: &str) -> Result<String> {
    find_supported(input)
        .map(|lang| lang.code.to_string())
        .ok_or_else(|| anyhow!("Unsupported language: {}", input))
}

/// Ensure a language code is in the supported table
pub fn ensure_supported(code: &str) -> Result<()> {
    resolve_language_code(code).map(|_| ())
}

/// Default voice for a language code, if it is in the table
pub fn default_voice(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
        .map(|lang| lang.voice)
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (iso_language(code1), iso_language(code2)) {
        (Some(first), Some(second)) => first == second,
        _ => false,
    }
}

/// Get the language name from a code, preferring the table's display name
pub fn get_language_name(code: &str) -> Result<String> {
    if let Some(lang) = find_supported(code) {
        return Ok(lang.name.to_string());
    }

    let lang = iso_language(code)
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}
