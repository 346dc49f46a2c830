//! Source URL collection
//!
//! URLs arrive three ways: a list file, a comma-separated flag, and
//! positional arguments. They are merged in that order so batch position is
//! predictable, then cleaned with one pass: whitespace trimmed, blanks and
//! `#` comments dropped no matter where they came from. Duplicates are kept,
//! one download item each.

use std::path::Path;

use crate::error::{Error, Result};

/// Merge and clean download sources from all three inputs.
///
/// The only failure mode is an unreadable list file; an empty result is
/// left for the caller to reject, so "file full of comments" and "no
/// arguments" surface the same way.
pub fn collect_sources(
    file: Option<&Path>,
    list: Option<&str>,
    positional: &[String],
) -> Result<Vec<String>> {
    let mut raw = Vec::new();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::UrlFile {
            path: path.to_path_buf(),
            source,
        })?;
        raw.extend(contents.lines().map(str::to_owned));
    }

    if let Some(list) = list {
        raw.extend(list.split(',').map(str::to_owned));
    }

    raw.extend(positional.iter().cloned());

    Ok(raw
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty() && !entry.starts_with('#'))
        .map(str::to_owned)
        .collect())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn url_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_merge_order_is_file_then_list_then_positional() {
        let file = url_file("https://example.com/a\nhttps://example.com/b\n");
        let positional = vec!["https://example.com/e".to_owned()];

        let sources = collect_sources(
            Some(file.path()),
            Some("https://example.com/c,https://example.com/d"),
            &positional,
        )
        .unwrap();

        assert_eq!(
            sources,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/c",
                "https://example.com/d",
                "https://example.com/e",
            ]
        );
    }

    #[test]
    fn test_file_comments_and_blanks_are_skipped() {
        let file = url_file("# playlist\n\nhttps://example.com/a\n   \n# end\n");
        let sources = collect_sources(Some(file.path()), None, &[]).unwrap();
        assert_eq!(sources, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_list_entries_are_trimmed() {
        let sources = collect_sources(None, Some(" https://example.com/a , https://example.com/b "), &[]).unwrap();
        assert_eq!(sources, vec!["https://example.com/a", "https://example.com/b"]);
    }

    #[test]
    fn test_comment_filter_applies_to_positional_arguments_too() {
        let positional = vec!["#commented-out".to_owned(), "https://example.com/a".to_owned()];
        let sources = collect_sources(None, None, &positional).unwrap();
        assert_eq!(sources, vec!["https://example.com/a"]);
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let positional = vec![
            "https://example.com/a".to_owned(),
            "https://example.com/a".to_owned(),
        ];
        let sources = collect_sources(None, None, &positional).unwrap();
        assert_eq!(sources.len(), 2, "each occurrence becomes its own item");
    }

    #[test]
    fn test_no_inputs_yields_empty_list() {
        assert!(collect_sources(None, None, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = collect_sources(Some(Path::new("/no/such/list.txt")), None, &[]).unwrap_err();
        assert!(matches!(err, Error::UrlFile { .. }));
        assert!(err.to_string().contains("/no/such/list.txt"));
    }
}
