//! Scripted dry run without any external binary
//!
//! This example drives the whole pipeline with canned yt-dlp output through
//! [`ScriptedSpawner`]. It is how the test suite exercises batches, and it
//! works for experimenting with the API on a machine without yt-dlp.
//!
//! ```bash
//! cargo run --example scripted_dry_run
//! ```

use std::sync::Arc;

use audio_dl::{AudioDownloader, Config, FetchScript, ScriptedSpawner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sources = vec![
        "https://example.com/v/1".to_string(),
        "https://example.com/v/2".to_string(),
        "https://example.com/v/3".to_string(),
    ];

    // One script per source, consumed in admission order.
    let spawner = Arc::new(ScriptedSpawner::new([
        FetchScript::success(
            "[download] Destination: /tmp/demo/First_Track.webm\n\
             [download]  50.0% of 3.00MiB at 1.00MiB/s ETA 00:01\n\
             [download] 100% of 3.00MiB in 00:03\n\
             [ExtractAudio] Destination: /tmp/demo/First_Track.mp3\n",
        ),
        FetchScript::failure("ERROR: [youtube] xyz: Video unavailable\n"),
        FetchScript::success(
            "[download] Destination: /tmp/demo/Last_Track.webm\n\
             [download] 100% of 1.00MiB in 00:01\n",
        ),
    ]));

    let mut config = Config::default();
    config.download.output_dir = std::env::temp_dir().join("audio-dl-demo");

    let downloader = AudioDownloader::with_spawner(sources, &config, spawner)?;
    let report = downloader.run().await?;

    for item in &report.items {
        println!(
            "{} -> {:?} ({})",
            item.source,
            item.status,
            item.title.as_deref().unwrap_or("no title")
        );
    }
    println!(
        "completed {}, failed {}",
        report.stats.completed, report.stats.failed
    );

    Ok(())
}
