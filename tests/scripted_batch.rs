//! End-to-end batch tests against the public API, using scripted fetches.
//!
//! These tests exercise the same surface the CLI uses - construction through
//! [`AudioDownloader::with_spawner`], snapshot observation, cancellation, and
//! the final report - with scripted yt-dlp output instead of real processes:
//! - full transcripts with titles, progress, and conversion
//! - partial failure without aborting the batch
//! - bounded concurrency with one admission per finished item
//! - prompt cancellation mid-batch
//!
//! # Running the tests
//!
//! ```bash
//! cargo test --test scripted_batch
//! ```

use std::sync::Arc;
use std::time::Duration;

use audio_dl::{AudioDownloader, Config, FailureKind, FetchScript, ScriptedSpawner, Status};
use tempfile::TempDir;

fn batch_config(dir: &TempDir, parallel: usize) -> Config {
    let mut config = Config::default();
    config.download.output_dir = dir.path().join("music");
    config.download.max_concurrent_downloads = parallel;
    config
}

fn sources(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("https://example.com/v/{i}")).collect()
}

/// A believable success transcript for one download.
fn success_transcript(stem: &str) -> FetchScript {
    FetchScript::success(format!(
        "[youtube] xyz: Downloading webpage\n\
         [download] Destination: /music/{stem}.webm\n\
         [download]   0.0% of 4.00MiB at 512.00KiB/s ETA 00:08\n\
         [download]  48.5% of 4.00MiB at 1.00MiB/s ETA 00:02\n\
         [download] 100% of 4.00MiB in 00:04\n\
         [ExtractAudio] Destination: /music/{stem}.mp3\n",
    ))
}

#[tokio::test]
async fn batch_completes_and_reports_titles() {
    let dir = tempfile::tempdir().unwrap();
    let spawner = Arc::new(ScriptedSpawner::new([
        success_transcript("First_Track"),
        success_transcript("Second_Track"),
    ]));

    let downloader =
        AudioDownloader::with_spawner(sources(2), &batch_config(&dir, 2), spawner).unwrap();
    let report = downloader.run().await.unwrap();

    assert!(!report.cancelled);
    assert_eq!(report.stats.completed, 2);
    assert_eq!(report.stats.failed, 0);
    assert_eq!(report.items[0].title.as_deref(), Some("First Track"));
    assert_eq!(report.items[1].title.as_deref(), Some("Second Track"));
    assert!(report.items.iter().all(|item| item.percent == 100.0));
    assert!(
        dir.path().join("music").is_dir(),
        "output directory is created during construction"
    );
}

#[tokio::test]
async fn failed_item_does_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let spawner = Arc::new(ScriptedSpawner::new([
        success_transcript("Good_One"),
        FetchScript::failure("ERROR: [youtube] abc: Video unavailable\n"),
        success_transcript("Also_Good"),
    ]));

    let downloader =
        AudioDownloader::with_spawner(sources(3), &batch_config(&dir, 1), spawner).unwrap();
    let report = downloader.run().await.unwrap();

    assert_eq!(report.stats.completed, 2);
    assert_eq!(report.stats.failed, 1);
    assert!(report.stats.is_finished());

    let failed = &report.items[1];
    assert_eq!(failed.status, Status::Failed);
    assert_eq!(
        failed.failure.as_ref().map(|f| f.kind),
        Some(FailureKind::Tool)
    );
    assert_eq!(
        failed.failure.as_ref().map(|f| f.message.as_str()),
        Some("download failed")
    );
    // Neighbors are untouched by the failure.
    assert_eq!(report.items[0].status, Status::Completed);
    assert_eq!(report.items[2].status, Status::Completed);
}

#[tokio::test]
async fn concurrency_stays_within_the_limit() {
    let dir = tempfile::tempdir().unwrap();
    let mut scripts = Vec::new();
    let mut gates = Vec::new();
    for _ in 0..5 {
        let (script, gate) = FetchScript::success("").gated();
        scripts.push(script);
        gates.push(gate);
    }
    let spawner = Arc::new(ScriptedSpawner::new(scripts));

    let downloader =
        AudioDownloader::with_spawner(sources(5), &batch_config(&dir, 2), spawner.clone())
            .unwrap();
    let mut snapshots = downloader.snapshots();

    // Record the highest concurrency the snapshot stream ever shows.
    let watcher = tokio::spawn(async move {
        let mut max_active = 0;
        loop {
            max_active = max_active.max(snapshots.borrow_and_update().stats.active);
            if snapshots.changed().await.is_err() {
                return max_active;
            }
        }
    });

    let batch = tokio::spawn(downloader.run());
    for gate in gates {
        // Releases are spread out so replacements actually happen.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = gate.send(());
    }

    let report = batch.await.unwrap().unwrap();
    let max_active = watcher.await.unwrap();

    assert_eq!(report.stats.completed, 5);
    assert!(
        max_active <= 2,
        "snapshot stream saw {max_active} concurrent downloads"
    );
    assert_eq!(spawner.spawned_sources().len(), 5, "every item was admitted");
}

#[tokio::test]
async fn cancellation_stops_the_batch_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let (running, _hold) = FetchScript::success("").gated();
    let spawner = Arc::new(ScriptedSpawner::new([running, FetchScript::success("")]));

    let downloader =
        AudioDownloader::with_spawner(sources(2), &batch_config(&dir, 1), spawner).unwrap();
    let cancel = downloader.cancellation_token();
    let mut snapshots = downloader.snapshots();
    let batch = tokio::spawn(downloader.run());

    // Wait for the first item to occupy the only slot, then cancel.
    loop {
        if snapshots.borrow_and_update().stats.active == 1 {
            break;
        }
        snapshots
            .changed()
            .await
            .expect("batch ended before an item started");
    }
    cancel.cancel();

    let report = tokio::time::timeout(Duration::from_secs(5), batch)
        .await
        .expect("cancellation must not wait for the held download")
        .unwrap()
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.stats.completed, 0);
    assert_eq!(report.items[0].status, Status::Running);
    assert_eq!(
        report.items[1].status,
        Status::Pending,
        "queued items are never admitted after cancellation"
    );
}
