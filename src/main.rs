//! Command-line front end for the audio-dl batch downloader.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use audio_dl::{
    AudioDownloader, AudioFormat, BatchReport, BatchSnapshot, Config, Status, run_with_shutdown,
    urls,
};

/// Download audio from YouTube and other yt-dlp supported sites.
#[derive(Debug, Parser)]
#[command(name = "audio-dl")]
#[command(about = "Concurrent yt-dlp audio batch downloader", long_about = None)]
struct Cli {
    /// URLs given directly as arguments.
    #[arg(value_name = "URL")]
    positional: Vec<String>,

    /// Comma-separated list of URLs.
    #[arg(long = "urls", value_name = "URL,URL")]
    urls: Option<String>,

    /// File containing URLs, one per line; blank lines and # comments are skipped.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output directory for downloaded audio.
    #[arg(long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// Audio format (mp3, m4a, opus, wav).
    #[arg(long, default_value_t = AudioFormat::Mp3, value_name = "FORMAT")]
    format: AudioFormat,

    /// Audio quality in kbps (128, 192, 256, 320).
    #[arg(long, default_value_t = 192, value_name = "KBPS")]
    quality: u32,

    /// Number of parallel downloads.
    #[arg(long, default_value_t = 3, value_name = "N")]
    parallel: usize,
}

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible.
    init_logging();

    if let Err(err) = run().await {
        eprintln!("audio-dl error: {:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let sources = urls::collect_sources(cli.file.as_deref(), cli.urls.as_deref(), &cli.positional)?;

    let mut config = Config::default();
    config.download.output_dir = std::path::absolute(&cli.output)
        .with_context(|| format!("cannot resolve output directory {}", cli.output.display()))?;
    config.download.format = cli.format;
    config.download.quality_kbps = cli.quality;
    config.download.max_concurrent_downloads = cli.parallel;

    let downloader = AudioDownloader::new(sources, &config)?;
    let display = tokio::spawn(render_progress(downloader.snapshots()));

    let report = run_with_shutdown(downloader).await?;
    let _ = display.await;

    print_summary(&report);
    Ok(())
}

/// Logs go to stderr and stay quiet by default; `RUST_LOG` opens them up.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Draw one progress bar per item until the snapshot channel closes.
///
/// The item list is fixed for the whole batch, so every bar exists up front
/// and later snapshots only move them.
async fn render_progress(mut snapshots: watch::Receiver<BatchSnapshot>) {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template(
        "{prefix:>4} {bar:30.cyan/blue} {percent:>3}% {wide_msg}",
    )
    .expect("static progress template");

    let bars: Vec<ProgressBar> = snapshots
        .borrow()
        .items
        .iter()
        .map(|item| {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(style.clone());
            bar.set_prefix(format!("#{}", item.id));
            bar
        })
        .collect();

    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            draw(&bars, &snapshot);
        }
        if snapshots.changed().await.is_err() {
            // Sender gone: the batch is over and the last state is drawn.
            break;
        }
    }
}

fn draw(bars: &[ProgressBar], snapshot: &BatchSnapshot) {
    for (item, bar) in snapshot.items.iter().zip(bars) {
        if bar.is_finished() {
            continue;
        }
        bar.set_position(item.percent.round() as u64);
        match item.status {
            Status::Pending => bar.set_message(format!("{} (waiting)", item.display_name())),
            Status::Running => bar.set_message(item.display_name().to_owned()),
            Status::Converting => {
                bar.set_message(format!("{} (converting)", item.display_name()));
            }
            Status::Completed => bar.finish_with_message(format!("{} (done)", item.display_name())),
            Status::Failed => {
                let reason = item
                    .failure
                    .as_ref()
                    .map(|failure| failure.message.as_str())
                    .unwrap_or("unknown error");
                bar.abandon_with_message(format!("{} (failed: {reason})", item.display_name()));
            }
        }
    }
}

fn print_summary(report: &BatchReport) {
    println!();
    if report.cancelled {
        println!(
            "Cancelled: {} completed, {} failed, {} unfinished",
            report.stats.completed,
            report.stats.failed,
            report.stats.total - report.stats.completed - report.stats.failed
        );
    } else {
        println!(
            "Finished: {} completed, {} failed of {} total",
            report.stats.completed, report.stats.failed, report.stats.total
        );
    }

    for item in &report.items {
        let marker = match item.status {
            Status::Completed => "done",
            Status::Failed => "failed",
            _ => "stopped",
        };
        match (&item.status, &item.failure) {
            (Status::Failed, Some(failure)) => {
                println!("  {marker:<7} {} ({failure})", item.display_name());
            }
            _ => println!("  {marker:<7} {}", item.display_name()),
        }
    }
}
