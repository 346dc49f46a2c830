//! yt-dlp process integration
//!
//! Each download item is served by one yt-dlp invocation. [`YtDlpRunner`]
//! builds the argument vector from a [`DownloadConfig`] and launches the
//! binary with both pipes captured; the rest of the pipeline only sees the
//! [`FetchSpawner`] trait, so tests substitute [`ScriptedSpawner`] and replay
//! canned output without any external binary.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::io::AsyncRead;
use tokio::process::Command;
use tokio::sync::oneshot;

use crate::config::{AudioFormat, DownloadConfig};

/// Launches one fetch process per source URL.
///
/// Implementations must be cheap to call from the scheduler: `spawn` starts
/// the process and returns immediately, all output is consumed through the
/// returned [`SpawnedFetch`].
pub trait FetchSpawner: Send + Sync {
    /// Start a fetch for `source` with both output streams captured.
    ///
    /// An error here means the process never started (missing binary,
    /// permission problem); it is distinct from the process running and
    /// exiting non-zero, which [`SpawnedFetch::exit`] reports.
    fn spawn(&self, source: &str) -> io::Result<SpawnedFetch>;
}

/// Handles onto a launched fetch process.
///
/// The streams end when the process closes its pipes; `exit` must only be
/// awaited after that to avoid losing trailing output.
pub struct SpawnedFetch {
    /// Line-oriented progress output. yt-dlp writes `[download]` progress
    /// here when `--newline` is passed.
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    /// Diagnostic output. Some extractors report destination paths here.
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
    /// Resolves once the process has exited; `true` means a zero status.
    pub exit: BoxFuture<'static, io::Result<bool>>,
}

/// [`FetchSpawner`] backed by a real yt-dlp binary.
///
/// The argument vector is fixed apart from the source URL: audio extraction
/// into the configured format and bitrate, output restricted to safe
/// filenames under the output directory, playlists refused, existing files
/// kept, and progress forced onto separate lines so the classifier can read
/// it.
#[derive(Debug, Clone)]
pub struct YtDlpRunner {
    binary: PathBuf,
    output_dir: PathBuf,
    format: AudioFormat,
    quality_kbps: u32,
}

impl YtDlpRunner {
    /// Create a runner invoking `binary` with the download settings from
    /// `config`.
    pub fn new(binary: impl Into<PathBuf>, config: &DownloadConfig) -> Self {
        Self {
            binary: binary.into(),
            output_dir: config.output_dir.clone(),
            format: config.format,
            quality_kbps: config.quality_kbps,
        }
    }

    /// Argument vector passed to yt-dlp for `source`.
    pub fn build_args(&self, source: &str) -> Vec<OsString> {
        let template = self.output_dir.join("%(title)s.%(ext)s");
        vec![
            OsString::from("--extract-audio"),
            OsString::from("--audio-format"),
            OsString::from(self.format.as_str()),
            OsString::from("--audio-quality"),
            OsString::from(format!("{}K", self.quality_kbps)),
            OsString::from("--output"),
            template.into_os_string(),
            OsString::from("--no-playlist"),
            OsString::from("--no-overwrites"),
            OsString::from("--restrict-filenames"),
            OsString::from("--newline"),
            OsString::from("--progress"),
            OsString::from(source),
        ]
    }
}

impl FetchSpawner for YtDlpRunner {
    fn spawn(&self, source: &str) -> io::Result<SpawnedFetch> {
        let mut child = Command::new(&self.binary)
            .args(self.build_args(source))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("failed to capture yt-dlp stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("failed to capture yt-dlp stderr"))?;

        Ok(SpawnedFetch {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit: Box::pin(async move { child.wait().await.map(|status| status.success()) }),
        })
    }
}

/// Canned process output for one [`ScriptedSpawner`] launch.
#[derive(Debug)]
pub struct FetchScript {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    exit: io::Result<bool>,
    release: Option<oneshot::Receiver<()>>,
}

impl FetchScript {
    /// Script that replays `stdout` and exits with status zero.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into().into_bytes(),
            stderr: Vec::new(),
            exit: Ok(true),
            release: None,
        }
    }

    /// Script that replays `stderr` and exits with a non-zero status.
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into().into_bytes(),
            exit: Ok(false),
            release: None,
        }
    }

    /// Add stderr output to a script.
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into().into_bytes();
        self
    }

    /// Replace stdout with raw bytes.
    ///
    /// yt-dlp output is not guaranteed to decode as UTF-8, so scripts can
    /// carry bytes that a line reader will reject.
    pub fn with_raw_stdout(mut self, stdout: impl Into<Vec<u8>>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Hold the simulated exit until the returned sender fires.
    ///
    /// The streams still end immediately; only [`SpawnedFetch::exit`] blocks.
    /// Dropping the sender unblocks it as well, so a forgotten gate cannot
    /// hang a test.
    pub fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.release = Some(rx);
        (self, tx)
    }
}

/// [`FetchSpawner`] that replays scripted output instead of running yt-dlp.
///
/// Scripts are consumed in launch order, so a batch of N sources needs N
/// scripts queued. Spawning beyond the queue fails the same way a missing
/// binary would.
///
/// # Examples
///
/// ```
/// use audio_dl::ytdlp::{FetchScript, FetchSpawner, ScriptedSpawner};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let spawner = ScriptedSpawner::new([FetchScript::success(
///     "[download] 100% of 3.21MiB in 00:02\n",
/// )]);
/// let fetch = spawner.spawn("https://example.com/v/1")?;
/// assert!(fetch.exit.await?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ScriptedSpawner {
    scripts: Mutex<VecDeque<io::Result<FetchScript>>>,
    spawned: Mutex<Vec<String>>,
}

impl ScriptedSpawner {
    /// Queue `scripts` for consumption in order.
    pub fn new(scripts: impl IntoIterator<Item = FetchScript>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(Ok).collect()),
            spawned: Mutex::new(Vec::new()),
        }
    }

    /// Append a script to the queue.
    pub fn push(&self, script: FetchScript) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(script));
    }

    /// Make the next launch fail with `error` before any output is produced.
    pub fn push_launch_error(&self, error: io::Error) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Sources passed to [`spawn`](FetchSpawner::spawn) so far, in order.
    pub fn spawned_sources(&self) -> Vec<String> {
        self.spawned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FetchSpawner for ScriptedSpawner {
    fn spawn(&self, source: &str) -> io::Result<SpawnedFetch> {
        self.spawned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source.to_owned());
        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| io::Error::other(format!("no script queued for {source}")))??;

        let exit = script.exit;
        let release = script.release;
        Ok(SpawnedFetch {
            stdout: Box::new(io::Cursor::new(script.stdout)),
            stderr: Box::new(io::Cursor::new(script.stderr)),
            exit: Box::pin(async move {
                if let Some(release) = release {
                    // Released either by firing or dropping the sender.
                    let _ = release.await;
                }
                exit
            }),
        })
    }
}
