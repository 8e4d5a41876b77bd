use std::path::PathBuf;

use futures::StreamExt;
use iced::{window, Subscription, Task};
use url::Url;

use crate::api::PreviewClient;
use crate::application::{CancelToken, DownloadEvent, PreviewDownloader};
use crate::domain::{CatalogItem, PreviewError, ScreenPhase};
use crate::ui::{PreviewMessage, PreviewView};
use crate::utils;

pub struct PreviewApp {
    view: PreviewView,
    item: CatalogItem,
    downloader: PreviewDownloader,
    cancel: CancelToken,
    download_started: bool,
}

#[derive(Debug, Clone)]
pub enum Message {
    Resolved(Resolution),
    Download(DownloadEvent),
    Ui(PreviewMessage),
    /// Player process finished; `Err` carries the playback failure.
    PlaybackFinished(Result<(), String>),
    CloseRequested(window::Id),
}

/// What the startup cache lookup decided.
#[derive(Debug, Clone)]
pub enum Resolution {
    Cached(PathBuf),
    StartDownload(Option<PathBuf>),
    Offline,
}

impl PreviewApp {
    pub fn new(item: CatalogItem) -> (Self, Task<Message>) {
        let client = PreviewClient::from_env();
        let base = client.base_url().clone();
        let app = Self {
            view: PreviewView::new(&item),
            downloader: PreviewDownloader::new(client),
            item: item.clone(),
            cancel: CancelToken::new(),
            download_started: false,
        };

        let task = Task::perform(resolve(item.id, base), Message::Resolved);
        (app, task)
    }

    fn start_playback(&mut self, path: PathBuf) -> Task<Message> {
        self.view.progress = None;
        self.view.error_text = None;
        self.view.phase = ScreenPhase::Playing;
        Task::perform(utils::play_looping(path), Message::PlaybackFinished)
    }

    fn show_error(&mut self, error: &PreviewError) {
        self.view.progress = None;
        self.view.error_text = Some(error.to_string());
        self.view.phase = ScreenPhase::Error;
    }
}

/// Cache lookup plus connectivity probe. The screen only downloads when the
/// preview is not already on disk and the remote host is reachable.
async fn resolve(item_id: String, base: Url) -> Resolution {
    let dest = utils::preview_cache_path(&item_id);
    if let Some(path) = &dest {
        if path.exists() {
            return Resolution::Cached(path.clone());
        }
    }

    if utils::has_connection(&base).await {
        Resolution::StartDownload(dest)
    } else {
        Resolution::Offline
    }
}

pub fn update(app: &mut PreviewApp, message: Message) -> Task<Message> {
    match message {
        Message::Resolved(Resolution::Cached(path)) => app.start_playback(path),
        Message::Resolved(Resolution::StartDownload(dest)) => {
            // At most one download per screen lifetime.
            if app.download_started {
                return Task::none();
            }
            app.download_started = true;
            app.view.phase = ScreenPhase::Downloading;

            let stream =
                app.downloader
                    .download_stream(app.item.clone(), dest, app.cancel.clone());
            Task::stream(stream.map(Message::Download))
        }
        Message::Resolved(Resolution::Offline) => {
            app.show_error(&PreviewError::Connectivity);
            Task::none()
        }
        Message::Download(DownloadEvent::Progress(sample)) => {
            app.view.progress = Some(sample);
            Task::none()
        }
        Message::Download(DownloadEvent::Completed(path)) => app.start_playback(path),
        Message::Download(DownloadEvent::NotFound) => {
            app.show_error(&PreviewError::NotFound);
            Task::none()
        }
        Message::Download(DownloadEvent::Failed(error)) => {
            app.show_error(&error);
            Task::none()
        }
        Message::Ui(PreviewMessage::SelectPressed) => {
            // Exit contract: the selected item goes back to the caller on
            // stdout, unmodified.
            app.cancel.cancel();
            if let Ok(payload) = serde_json::to_string(&app.item) {
                println!("{payload}");
            }
            iced::exit()
        }
        Message::Ui(PreviewMessage::OpenLinkPressed) => {
            if let Some(site) = app.item.site_url() {
                utils::open_in_browser(site);
            }
            Task::none()
        }
        Message::PlaybackFinished(Ok(())) => Task::none(),
        Message::PlaybackFinished(Err(reason)) => {
            app.show_error(&PreviewError::Playback(reason));
            Task::none()
        }
        Message::CloseRequested(id) => {
            app.cancel.cancel();
            window::close(id)
        }
    }
}

pub fn view(app: &PreviewApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::Ui)
}

pub fn subscription(_app: &PreviewApp) -> Subscription<Message> {
    window::close_requests().map(Message::CloseRequested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProgressSample;

    fn screen() -> PreviewApp {
        let item = CatalogItem {
            id: "42".into(),
            title: "Waves".into(),
            author: "ada".into(),
            site: Some("https://example.com".into()),
        };
        PreviewApp::new(item).0
    }

    #[test]
    fn not_found_shows_not_found_text() {
        let mut app = screen();
        let _ = update(&mut app, Message::Download(DownloadEvent::NotFound));
        assert_eq!(app.view.phase, ScreenPhase::Error);
        assert_eq!(app.view.error_text.as_deref(), Some("Preview not found"));
        assert!(app.view.progress.is_none());
    }

    #[test]
    fn failure_shows_generic_text() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Failed(PreviewError::Download("boom".into()))),
        );
        assert_eq!(
            app.view.error_text.as_deref(),
            Some("Could not load the preview")
        );
    }

    #[test]
    fn offline_shows_connectivity_error() {
        let mut app = screen();
        let _ = update(&mut app, Message::Resolved(Resolution::Offline));
        assert_eq!(
            app.view.error_text.as_deref(),
            Some("No network connection")
        );
        assert!(!app.download_started);
    }

    #[test]
    fn progress_switches_indicator_to_determinate() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::Resolved(Resolution::StartDownload(None)),
        );
        assert!(app.view.progress.is_none());

        let sample = ProgressSample::new(2048, 4096);
        let _ = update(&mut app, Message::Download(DownloadEvent::Progress(sample)));
        assert_eq!(app.view.progress, Some(sample));
    }

    #[test]
    fn download_starts_at_most_once() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::Resolved(Resolution::StartDownload(None)),
        );
        assert!(app.download_started);
        assert_eq!(app.view.phase, ScreenPhase::Downloading);

        // A second resolution is a no-op.
        let _ = update(
            &mut app,
            Message::Resolved(Resolution::StartDownload(None)),
        );
        assert_eq!(app.view.phase, ScreenPhase::Downloading);
    }

    #[test]
    fn completed_download_enters_playback() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::Download(DownloadEvent::Completed(PathBuf::from("/tmp/42.mp4"))),
        );
        assert_eq!(app.view.phase, ScreenPhase::Playing);
        assert!(app.view.progress.is_none());
    }

    #[test]
    fn playback_failure_shows_generic_text() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::PlaybackFinished(Err("player exited with signal".into())),
        );
        assert_eq!(
            app.view.error_text.as_deref(),
            Some("Could not load the preview")
        );
    }

    #[test]
    fn cached_preview_plays_without_download() {
        let mut app = screen();
        let _ = update(
            &mut app,
            Message::Resolved(Resolution::Cached(PathBuf::from("/tmp/42.mp4"))),
        );
        assert_eq!(app.view.phase, ScreenPhase::Playing);
        assert!(!app.download_started);
    }

    #[test]
    fn select_cancels_in_flight_download() {
        let mut app = screen();
        let _ = update(&mut app, Message::Ui(PreviewMessage::SelectPressed));
        assert!(app.cancel.is_cancelled());
    }
}
