/*!
 * Tests for subtitle processing functionality
 */

use anyhow::Result;
use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

use crate::common;
use dubweave::errors::SubtitleError;
use dubweave::subtitle_processor::{SubtitleCollection, SubtitleEntry};

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = SubtitleEntry::parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = SubtitleEntry::format_timestamp(ms);
    assert_eq!(formatted, ts);
}

/// Test rejection of malformed timestamps
#[test]
fn test_timestamp_parsing_withInvalidTimestamp_shouldFail() {
    for ts in ["1:2", "00:61:00,000", "00:00:00,1000", "aa:bb:cc,ddd"] {
        assert!(
            matches!(SubtitleEntry::parse_timestamp(ts), Err(SubtitleError::InvalidTimestamp(_))),
            "{} should be rejected",
            ts
        );
    }
}

/// Test subtitle entry display formatting
#[test]
fn test_subtitle_entry_display_withValidEntry_shouldFormatCorrectly() {
    let entry = SubtitleEntry::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "1\n00:00:05,000 --> 00:00:10,000\nTest subtitle\n\n");
}

/// Test caption offsets used for timeline placement
#[test]
fn test_subtitle_entry_offsets_withValidEntry_shouldMatchTimings() {
    let entry = SubtitleEntry::new(42, 61234, 65432, "Hello\nWorld".to_string());

    assert_eq!(entry.format_start_time(), "00:01:01,234");
    assert_eq!(entry.format_end_time(), "00:01:05,432");
    assert_eq!(entry.start_offset(), Duration::from_millis(61234));
    assert_eq!(entry.duration(), Duration::from_millis(4198));
}

/// Test validated construction
#[test]
fn test_new_validated_withEndBeforeStart_shouldFail() {
    let result = SubtitleEntry::new_validated(7, 2000, 1000, "x".to_string());
    assert!(matches!(
        result,
        Err(SubtitleError::InvalidTimeRange { seq_num: 7, start_ms: 2000, end_ms: 1000 })
    ));
}

/// Test parsing SRT string content
#[test]
fn test_parse_srt_string_withValidContent_shouldParseCorrectly() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:08,000\nTest subtitle\nSecond line\n\n";

    let entries = SubtitleCollection::parse_srt_string(srt_content)?;

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1000);
    assert_eq!(entries[0].end_time_ms, 4000);
    assert_eq!(entries[0].text, "Hello world");
    assert_eq!(entries[1].text, "Test subtitle\nSecond line");

    Ok(())
}

/// Test that an empty, zero-length caption is kept
#[test]
fn test_parse_srt_string_withEmptyCaption_shouldKeepEntryAsBlank() -> Result<()> {
    let entries = SubtitleCollection::parse_srt_string(common::THREE_CAPTION_SRT)?;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].start_time_ms, 10_000);
    assert_eq!(entries[2].end_time_ms, 10_000);
    assert!(entries[2].is_blank());
    Ok(())
}

/// Test repeated and decreasing caption numbers are reported but kept
#[test]
fn test_parse_srt_string_withMisnumberedCaptions_shouldKeepOrderAndReportNumbers() -> Result<()> {
    let srt_content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n\
                       3\n00:00:03,000 --> 00:00:04,000\nB\n\n\
                       3\n00:00:05,000 --> 00:00:06,000\nC\n\n\
                       2\n00:00:07,000 --> 00:00:08,000\nD\n\n";

    let entries = SubtitleCollection::parse_srt_string(srt_content)?;

    let numbers: Vec<usize> = entries.iter().map(|e| e.seq_num).collect();
    assert_eq!(numbers, vec![1, 3, 3, 2]);
    assert_eq!(SubtitleCollection::non_increasing_indices(&entries), vec![3, 2]);

    let well_formed = SubtitleCollection::parse_srt_string(common::THREE_CAPTION_SRT)?;
    assert!(SubtitleCollection::non_increasing_indices(&well_formed).is_empty());
    Ok(())
}

/// Test parsing content without any caption
#[test]
fn test_parse_srt_string_withNoEntries_shouldReturnEmptyError() {
    assert!(matches!(
        SubtitleCollection::parse_srt_string("\n\n"),
        Err(SubtitleError::Empty)
    ));
}

/// Test the write/parse round-trip law
#[test]
fn test_write_then_parse_withMixedCaptions_shouldYieldIdenticalTuples() -> Result<()> {
    let mut collection = SubtitleCollection::new(PathBuf::from("talk.mp4"), "es".to_string());
    collection.entries = vec![
        SubtitleEntry::new(1, 0, 2000, "Hola".to_string()),
        SubtitleEntry::new(2, 5000, 7000, "Dos\nlíneas".to_string()),
        SubtitleEntry::new(3, 10_000, 10_000, String::new()),
        SubtitleEntry::new(4, 3_600_000, 3_601_500, "Una hora".to_string()),
    ];

    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("subtitles_es.srt");
    collection.write_to_srt(&path)?;

    let reparsed = SubtitleCollection::from_srt_file(&path, "es")?;
    let tuples = |c: &SubtitleCollection| -> Vec<(u64, u64, String)> {
        c.entries
            .iter()
            .map(|e| (e.start_time_ms, e.end_time_ms, e.text.clone()))
            .collect()
    };

    assert_eq!(tuples(&reparsed), tuples(&collection));
    assert_eq!(reparsed.language, "es");
    Ok(())
}

/// Test replacing caption texts
#[test]
fn test_with_texts_withTranslatedTexts_shouldKeepTimings() -> Result<()> {
    let entries = SubtitleCollection::parse_srt_string(common::THREE_CAPTION_SRT)?;
    let mut collection = SubtitleCollection::new(PathBuf::from("talk.mp4"), "en".to_string());
    collection.entries = entries;

    let translated = collection.with_texts(
        vec!["Hola".to_string(), "Mundo".to_string(), String::new()],
        "es",
    );

    assert_eq!(translated.language, "es");
    assert_eq!(translated.entries[1].text, "Mundo");
    assert_eq!(translated.entries[1].start_time_ms, 5000);
    assert_eq!(translated.speakable_entries().count(), 2);
    Ok(())
}
