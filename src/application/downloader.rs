use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::{
    api::{FetchError, PreviewClient},
    domain::{CatalogItem, PreviewError, ProgressSample},
};

/// Cooperative cancellation, polled once per body chunk. Cancelling an
/// in-flight download ends its event stream with no terminal event.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub enum DownloadEvent {
    Progress(ProgressSample),
    Completed(PathBuf),
    NotFound,
    Failed(PreviewError),
}

#[derive(Clone)]
pub struct PreviewDownloader {
    client: PreviewClient,
}

enum WorkerState {
    Start {
        client: PreviewClient,
        item: CatalogItem,
        dest: Option<PathBuf>,
        cancel: CancelToken,
    },
    Downloading {
        file: tokio::fs::File,
        stream: BoxStream<'static, crate::api::Result<bytes::Bytes>>,
        dest: PathBuf,
        downloaded: u64,
        total: Option<u64>,
        cancel: CancelToken,
    },
    Finished,
}

impl PreviewDownloader {
    pub fn new(client: PreviewClient) -> Self {
        Self { client }
    }

    /// Streams a preview download into `dest`. Emits `Progress` samples only
    /// while the total length is known, then exactly one terminal event —
    /// unless cancelled, in which case the stream ends with none.
    ///
    /// A download that does not finish cleanly removes its partial file, so
    /// the next visit retries instead of playing a truncated preview.
    pub fn download_stream(
        &self,
        item: CatalogItem,
        dest: Option<PathBuf>,
        cancel: CancelToken,
    ) -> BoxStream<'static, DownloadEvent> {
        futures::stream::unfold(
            WorkerState::Start {
                client: self.client.clone(),
                item,
                dest,
                cancel,
            },
            |state| async move {
                match state {
                    WorkerState::Start {
                        client,
                        item,
                        dest,
                        cancel,
                    } => {
                        let dest = match dest {
                            Some(dest) => dest,
                            None => {
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(
                                        "no cache location available".into(),
                                    ))),
                                    WorkerState::Finished,
                                ));
                            }
                        };

                        let url = match client.preview_url(&item) {
                            Ok(url) => url,
                            Err(e) => {
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(
                                        e.to_string(),
                                    ))),
                                    WorkerState::Finished,
                                ));
                            }
                        };

                        // Classify the response before touching the
                        // destination, so a 404 leaves no file behind.
                        let (total, stream) = match client.fetch(url).await {
                            Ok(opened) => opened,
                            Err(FetchError::NotFound) => {
                                return Some((
                                    Some(DownloadEvent::NotFound),
                                    WorkerState::Finished,
                                ));
                            }
                            Err(e) => {
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(
                                        e.to_string(),
                                    ))),
                                    WorkerState::Finished,
                                ));
                            }
                        };

                        let file = match tokio::fs::File::create(&dest).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(format!(
                                        "failed to create {}: {}",
                                        dest.display(),
                                        e
                                    )))),
                                    WorkerState::Finished,
                                ));
                            }
                        };

                        Some((
                            None,
                            WorkerState::Downloading {
                                file,
                                stream: stream.boxed(),
                                dest,
                                downloaded: 0,
                                total,
                                cancel,
                            },
                        ))
                    }
                    WorkerState::Downloading {
                        mut file,
                        mut stream,
                        dest,
                        mut downloaded,
                        total,
                        cancel,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            // Checked once per chunk, before the write.
                            if cancel.is_cancelled() {
                                discard_partial(file, &dest).await;
                                return None;
                            }

                            if let Err(e) = file.write_all(&chunk).await {
                                discard_partial(file, &dest).await;
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(format!(
                                        "write error: {}",
                                        e
                                    )))),
                                    WorkerState::Finished,
                                ));
                            }

                            downloaded += chunk.len() as u64;

                            let sample = match total {
                                Some(total) if total > 0 => {
                                    Some(ProgressSample::new(downloaded, total))
                                }
                                _ => None,
                            };

                            Some((
                                sample.map(DownloadEvent::Progress),
                                WorkerState::Downloading {
                                    file,
                                    stream,
                                    dest,
                                    downloaded,
                                    total,
                                    cancel,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            discard_partial(file, &dest).await;
                            Some((
                                Some(DownloadEvent::Failed(PreviewError::Download(e.to_string()))),
                                WorkerState::Finished,
                            ))
                        }
                        None => {
                            if let Err(e) = file.sync_all().await {
                                discard_partial(file, &dest).await;
                                return Some((
                                    Some(DownloadEvent::Failed(PreviewError::Download(format!(
                                        "failed to sync {}: {}",
                                        dest.display(),
                                        e
                                    )))),
                                    WorkerState::Finished,
                                ));
                            }

                            Some((
                                Some(DownloadEvent::Completed(dest)),
                                WorkerState::Finished,
                            ))
                        }
                    },
                    WorkerState::Finished => None,
                }
            },
        )
        .filter_map(std::future::ready)
        .boxed()
    }
}

/// Drops the handle first so the unlink also works on Windows.
async fn discard_partial(file: tokio::fs::File, dest: &Path) {
    drop(file);
    let _ = tokio::fs::remove_file(dest).await;
}
