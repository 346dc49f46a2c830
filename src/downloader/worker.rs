//! Per-item download worker
//!
//! One worker drives one yt-dlp process: launch it, stream both pipes line
//! by line, translate recognized lines into progress events, then report the
//! exit as the item's single terminal event. Reads finish before the exit is
//! awaited, so the terminal event is always the last one the item sends.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;

use crate::classifier::{LineFact, classify_line};
use crate::types::{ItemFailure, ItemId, ProgressEvent};
use crate::ytdlp::{FetchSpawner, SpawnedFetch};

pub(crate) async fn run_item(
    spawner: Arc<dyn FetchSpawner>,
    id: ItemId,
    source: String,
    events: mpsc::Sender<ProgressEvent>,
) {
    if events.send(ProgressEvent::Started { id }).await.is_err() {
        return;
    }

    let SpawnedFetch {
        stdout,
        stderr,
        exit,
    } = match spawner.spawn(&source) {
        Ok(fetch) => fetch,
        Err(error) => {
            tracing::warn!(id = id.get(), %source, %error, "failed to launch fetch process");
            let _ = events
                .send(ProgressEvent::Failed {
                    id,
                    failure: ItemFailure::launch(error.to_string()),
                    title: None,
                })
                .await;
            return;
        }
    };

    // yt-dlp spreads its output across both pipes depending on extractor,
    // so they are merged and classified as one line stream. A read error
    // ends only the pipe it came from; the other keeps feeding lines.
    let stdout_lines = LinesStream::new(BufReader::new(stdout).lines())
        .map_while(move |next| line_or_eof(id, "stdout", next));
    let stderr_lines = LinesStream::new(BufReader::new(stderr).lines())
        .map_while(move |next| line_or_eof(id, "stderr", next));
    let mut lines = stdout_lines.merge(stderr_lines);

    // Last title seen on either pipe; later events re-attach it.
    let mut title: Option<String> = None;

    while let Some(line) = lines.next().await {
        for fact in classify_line(&line) {
            let event = match fact {
                LineFact::Title(new_title) => {
                    title = Some(new_title.clone());
                    ProgressEvent::TitleDiscovered {
                        id,
                        title: new_title,
                    }
                }
                LineFact::Percent(percent) => ProgressEvent::Progress {
                    id,
                    percent,
                    title: title.clone(),
                },
                LineFact::ConversionStarted => ProgressEvent::Converting {
                    id,
                    title: title.clone(),
                },
            };

            if events.send(event).await.is_err() {
                // Batch torn down; the process dies with this task.
                return;
            }
        }
    }

    let terminal = match exit.await {
        Ok(true) => ProgressEvent::Completed { id, title },
        Ok(false) => ProgressEvent::Failed {
            id,
            failure: ItemFailure::tool("download failed"),
            title,
        },
        Err(error) => ProgressEvent::Failed {
            id,
            failure: ItemFailure::io(error.to_string()),
            title,
        },
    };
    let _ = events.send(terminal).await;
}

/// Treat a read error as end-of-stream for that pipe alone.
fn line_or_eof(id: ItemId, pipe: &'static str, next: io::Result<String>) -> Option<String> {
    match next {
        Ok(line) => Some(line),
        Err(error) => {
            tracing::debug!(id = id.get(), pipe, %error, "unreadable output, closing this pipe");
            None
        }
    }
}
