mod downloader;

pub use downloader::{CancelToken, DownloadEvent, PreviewDownloader};
