//! Classifier for yt-dlp progress output lines
//!
//! The fetch tool's textual output is an external, best-effort contract:
//! lines that match none of the known patterns carry no facts and are never
//! an error. The classifier is a pure function over single lines; tracking
//! the "current title" across lines is the worker's job.

use regex::Regex;
use std::sync::LazyLock;

/// One structured fact extracted from a progress line
#[derive(Debug, Clone, PartialEq)]
pub enum LineFact {
    /// A destination line revealed the item's display title
    Title(String),
    /// A download percentage report (0.0 to 100.0)
    Percent(f32),
    /// Audio extraction has begun
    ConversionStarted,
}

// Patterns are fixed literals, compiled once on first use.
#[allow(clippy::expect_used)]
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[download\]\s+(\d+\.?\d*)%").expect("percent pattern"));

#[allow(clippy::expect_used)]
static DESTINATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Destination:\s+.*/(.+)\.(webm|m4a|mp3|opus|wav)").expect("destination pattern")
});

/// Marker the tool prints when it hands the download to the audio extractor
const EXTRACT_AUDIO_MARKER: &str = "[ExtractAudio]";

/// Classify one raw output line into zero or more facts.
///
/// A single line can carry several facts at once — an extraction line like
/// `[ExtractAudio] Destination: /out/My_Song.mp3` names both the phase
/// transition and a title. Facts are returned in the order they should be
/// applied: title first, so percentage and phase facts from the same line
/// already see the updated title.
pub fn classify_line(line: &str) -> Vec<LineFact> {
    let mut facts = Vec::new();

    if let Some(captures) = DESTINATION_RE.captures(line)
        && let Some(stem) = captures.get(1)
    {
        facts.push(LineFact::Title(normalize_title(stem.as_str())));
    }

    if let Some(captures) = PERCENT_RE.captures(line)
        && let Some(value) = captures.get(1)
        && let Ok(percent) = value.as_str().parse::<f32>()
    {
        facts.push(LineFact::Percent(percent));
    }

    if line.contains(EXTRACT_AUDIO_MARKER) {
        facts.push(LineFact::ConversionStarted);
    }

    facts
}

/// Undo the underscore-for-space substitution applied by the tool's
/// filename sanitization.
fn normalize_title(stem: &str) -> String {
    stem.replace('_', " ")
}
