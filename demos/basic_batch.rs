//! Basic batch download example
//!
//! This example demonstrates the core functionality of audio-dl:
//! - Creating a downloader for a list of URLs
//! - Watching progress snapshots while the batch runs
//! - Inspecting the final report
//!
//! Requires yt-dlp and ffmpeg on PATH:
//!
//! ```bash
//! cargo run --example basic_batch -- "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
//! ```

use audio_dl::{AudioDownloader, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sources: Vec<String> = std::env::args().skip(1).collect();

    let mut config = Config::default();
    config.download.output_dir = "downloads".into();
    config.download.max_concurrent_downloads = 2;

    let downloader = AudioDownloader::new(sources, &config)?;

    // Print the whole table on every update.
    let mut snapshots = downloader.snapshots();
    let progress = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            for item in &snapshot.items {
                println!(
                    "  [{}] {:?} {:5.1}% {}",
                    item.id,
                    item.status,
                    item.percent,
                    item.display_name()
                );
            }
            println!("---");
        }
    });

    let report = downloader.run().await?;
    let _ = progress.await;

    println!(
        "finished: {} completed, {} failed",
        report.stats.completed, report.stats.failed
    );
    for item in &report.items {
        if let Some(failure) = &item.failure {
            println!("  {} failed: {failure}", item.display_name());
        }
    }

    Ok(())
}
