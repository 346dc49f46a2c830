//! External tool discovery
//!
//! yt-dlp performs the downloads and shells out to ffmpeg for audio
//! extraction, so both must exist before any work starts. Explicitly
//! configured paths win; otherwise the system PATH is searched. A missing
//! binary fails the whole batch up front with an install hint instead of
//! failing every item mid-run.

use std::path::{Path, PathBuf};

use crate::config::ToolsConfig;
use crate::error::{Error, Result};

const YTDLP_HINT: &str = "Install with: pipx install yt-dlp";
const FFMPEG_HINT: &str = "Install with your package manager";

/// Locations of the binaries a batch run depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    /// Resolved yt-dlp binary, invoked once per item.
    pub ytdlp: PathBuf,
    /// Resolved ffmpeg binary. yt-dlp invokes it itself; it is only
    /// verified up front.
    pub ffmpeg: PathBuf,
}

/// Verify both required binaries exist and report where they live.
pub fn check_dependencies(config: &ToolsConfig) -> Result<ResolvedTools> {
    let ytdlp = resolve(
        config.ytdlp_path.as_deref(),
        config.search_path,
        "yt-dlp",
        YTDLP_HINT,
    )?;
    let ffmpeg = resolve(
        config.ffmpeg_path.as_deref(),
        config.search_path,
        "ffmpeg",
        FFMPEG_HINT,
    )?;

    tracing::debug!(
        ytdlp = %ytdlp.display(),
        ffmpeg = %ffmpeg.display(),
        "external tools resolved"
    );

    Ok(ResolvedTools { ytdlp, ffmpeg })
}

fn resolve(explicit: Option<&Path>, search_path: bool, tool: &str, hint: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::MissingTool {
            tool: format!("{} at {}", tool, path.display()),
            hint: hint.to_owned(),
        });
    }

    if search_path && let Ok(found) = which::which(tool) {
        return Ok(found);
    }

    Err(Error::MissingTool {
        tool: tool.to_owned(),
        hint: hint.to_owned(),
    })
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        File::create(&path).unwrap();
        path
    }

    // --- Explicit paths ---

    #[test]
    fn test_explicit_paths_are_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let ytdlp = touch(dir.path(), "yt-dlp");
        let ffmpeg = touch(dir.path(), "ffmpeg");

        let config = ToolsConfig {
            ytdlp_path: Some(ytdlp.clone()),
            ffmpeg_path: Some(ffmpeg.clone()),
            search_path: false,
        };

        let tools = check_dependencies(&config).unwrap();
        assert_eq!(tools.ytdlp, ytdlp);
        assert_eq!(tools.ffmpeg, ffmpeg);
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolsConfig {
            ytdlp_path: Some(dir.path().join("missing-yt-dlp")),
            ffmpeg_path: None,
            search_path: false,
        };

        let err = check_dependencies(&config).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing-yt-dlp"), "error names the path: {msg}");
        assert!(msg.contains("pipx install yt-dlp"), "error carries the hint: {msg}");
    }

    // --- PATH search ---

    #[test]
    fn test_unknown_binary_is_not_found_on_path() {
        // Holds as long as nothing installs a binary with this name.
        let err = resolve(None, true, "nonexistent-ytdlp-binary-xyz", YTDLP_HINT).unwrap_err();
        assert!(matches!(err, Error::MissingTool { .. }));
    }

    #[test]
    fn test_search_disabled_without_explicit_path_fails() {
        let config = ToolsConfig {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: false,
        };

        let err = check_dependencies(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "yt-dlp not found. Install with: pipx install yt-dlp"
        );
    }

    #[test]
    fn test_ffmpeg_failure_carries_its_own_hint() {
        let dir = tempfile::tempdir().unwrap();
        let config = ToolsConfig {
            ytdlp_path: Some(touch(dir.path(), "yt-dlp")),
            ffmpeg_path: None,
            search_path: false,
        };

        let err = check_dependencies(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ffmpeg not found. Install with your package manager"
        );
    }
}
