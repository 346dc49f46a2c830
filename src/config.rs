//! Configuration types for audio-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Target audio container format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 (default)
    #[default]
    Mp3,
    /// MPEG-4 audio
    M4a,
    /// Opus
    Opus,
    /// WAV
    Wav,
}

impl AudioFormat {
    /// Format name as passed to the fetch tool
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Wav => "wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" => Ok(AudioFormat::M4a),
            "opus" => Ok(AudioFormat::Opus),
            "wav" => Ok(AudioFormat::Wav),
            other => Err(format!(
                "unsupported audio format '{other}' (expected mp3, m4a, opus, or wav)"
            )),
        }
    }
}

/// Download behavior configuration (output, format, concurrency)
///
/// Groups settings related to how items are fetched and stored.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Output directory (default: ".")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Target audio format (default: mp3)
    #[serde(default)]
    pub format: AudioFormat,

    /// Target audio bitrate in kbps (default: 192)
    #[serde(default = "default_quality_kbps")]
    pub quality_kbps: u32,

    /// Maximum concurrent downloads (default: 3)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_downloads: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            format: AudioFormat::default(),
            quality_kbps: default_quality_kbps(),
            max_concurrent_downloads: default_max_concurrent(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg)
///
/// Groups settings for external binaries. Used as a nested sub-config
/// within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
        }
    }
}

/// Main configuration for AudioDownloader
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) — output directory, format, concurrency
/// - [`tools`](ToolsConfig) — external binary paths
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML
/// format has no nesting. Frequently used fields are also reachable through
/// accessor methods on `Config`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings (output, format, concurrency)
    #[serde(flatten)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(flatten)]
    pub tools: ToolsConfig,
}

// Convenience accessors — delegate to the sub-config structs so call sites
// don't need to spell out the nesting.
impl Config {
    /// Output directory
    pub fn output_dir(&self) -> &PathBuf {
        &self.download.output_dir
    }

    /// Maximum concurrent downloads
    pub fn max_concurrent_downloads(&self) -> usize {
        self.download.max_concurrent_downloads
    }
}

// Default value functions
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_quality_kbps() -> u32 {
    192
}

fn default_max_concurrent() -> usize {
    3
}

fn default_true() -> bool {
    true
}
