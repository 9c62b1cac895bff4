/*!
 * Tests for language utility functions
 */

use anyhow::Result;
use dubweave::language_utils::{
    default_voice, ensure_supported, find_supported, get_language_name, language_codes_match,
    resolve_language_code, SUPPORTED_LANGUAGES,
};

/// Test resolving codes and names to canonical codes
#[test]
fn test_resolve_language_code_withCodesAndNames_shouldReturnCanonicalCode() -> Result<()> {
    assert_eq!(resolve_language_code("es")?, "es");
    assert_eq!(resolve_language_code(" FR ")?, "fr");
    assert_eq!(resolve_language_code("German")?, "de");
    assert_eq!(resolve_language_code("japanese")?, "ja");
    assert_eq!(resolve_language_code("spa")?, "es");
    assert_eq!(resolve_language_code("zh-CN")?, "zh-CN");
    Ok(())
}

/// Test rejection of unsupported input
#[test]
fn test_resolve_language_code_withUnsupportedInput_shouldFail() {
    assert!(resolve_language_code("sv").is_err());
    assert!(resolve_language_code("xyz").is_err());
    assert!(resolve_language_code("").is_err());
    assert!(ensure_supported("klingon").is_err());
    assert!(ensure_supported("hi").is_ok());
}

/// Test the supported table is internally consistent
#[test]
fn test_supported_languages_withEveryEntry_shouldResolveToItself() {
    for language in SUPPORTED_LANGUAGES {
        assert_eq!(find_supported(language.code), Some(language));
        assert_eq!(find_supported(language.name), Some(language));
        assert_eq!(default_voice(language.code), Some(language.voice));
    }
}

/// Test language code matching
#[test]
fn test_language_codes_match_withEquivalentCodes_shouldMatch() {
    assert!(language_codes_match("en", "eng"));
    assert!(language_codes_match("zh-CN", "zho"));
    assert!(language_codes_match("FR", "fra"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("xx", "en"));
}

/// Test language names
#[test]
fn test_get_language_name_withValidCodes_shouldReturnName() -> Result<()> {
    assert_eq!(get_language_name("zh-CN")?, "Chinese (Simplified)");
    assert_eq!(get_language_name("es")?, "Spanish");
    // Outside the table, the ISO name is used
    assert_eq!(get_language_name("sv")?, "Swedish");
    assert!(get_language_name("qqq1").is_err());
    Ok(())
}
