#![cfg(feature = "live-tests")]

//! Live smoke tests against a real yt-dlp binary.
//!
//! These tests exercise tool discovery and the real process pipeline. They
//! require yt-dlp and ffmpeg on PATH but intentionally avoid depending on
//! any particular video staying available: the download test uses an
//! unresolvable URL and only asserts clean failure reporting.
//!
//! Gated behind the `live-tests` feature flag.
//!
//! ```bash
//! cargo test --features live-tests --test live_ytdlp -- --nocapture
//! ```

use std::time::Duration;

use audio_dl::{AudioDownloader, Config, Status, ToolsConfig, check_dependencies};

#[test]
fn live_tools_resolve_from_path() {
    let tools = check_dependencies(&ToolsConfig::default()).expect("yt-dlp and ffmpeg on PATH");
    assert!(tools.ytdlp.is_absolute(), "PATH search yields absolute paths");
    assert!(tools.ffmpeg.is_absolute());
}

#[tokio::test]
async fn live_ytdlp_reports_a_version() {
    let tools = check_dependencies(&ToolsConfig::default()).expect("yt-dlp and ffmpeg on PATH");

    let output = tokio::process::Command::new(&tools.ytdlp)
        .arg("--version")
        .output()
        .await
        .expect("failed to run yt-dlp --version");

    assert!(output.status.success());
    let version = String::from_utf8_lossy(&output.stdout);
    assert!(
        version.trim().len() >= 8,
        "expected a date-style version, got {version:?}"
    );
}

/// Run the whole pipeline against a URL that cannot resolve.
///
/// The process starts, fails, and the batch must report one failed item
/// instead of hanging or aborting.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_unresolvable_url_fails_cleanly() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = Config::default();
    config.download.output_dir = dir.path().to_path_buf();

    let downloader = AudioDownloader::new(
        vec!["https://example.invalid/not-a-video".to_string()],
        &config,
    )
    .expect("construct downloader");

    let report = tokio::time::timeout(Duration::from_secs(120), downloader.run())
        .await
        .expect("yt-dlp should fail well within the timeout")
        .expect("batch itself must not error");

    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.items[0].status, Status::Failed);
    assert!(report.items[0].failure.is_some());
}
