use futures::{Stream, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::domain::CatalogItem;

const DEFAULT_BASE_URL: &str = "https://previews.catalog.app";
const BASE_URL_ENV: &str = "CATALOG_PREVIEW_BASE_URL";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("preview not found on the remote")]
    NotFound,

    #[error("unexpected status: {0}")]
    Status(StatusCode),

    #[error("invalid preview URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, FetchError>;

#[derive(Clone)]
pub struct PreviewClient {
    client: Client,
    base_url: Url,
}

impl PreviewClient {
    /// Base URL comes from `CATALOG_PREVIEW_BASE_URL` when set; a missing or
    /// malformed override falls back to the default endpoint.
    pub fn from_env() -> Self {
        let base = std::env::var(BASE_URL_ENV)
            .ok()
            .and_then(|raw| Url::parse(&raw).ok())
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"));
        Self::with_base_url(base)
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Deterministic preview location for an item: `<base>/previews/<id>.mp4`.
    pub fn preview_url(&self, item: &CatalogItem) -> Result<Url> {
        let raw = format!(
            "{}/previews/{}.mp4",
            self.base_url.as_str().trim_end_matches('/'),
            item.id
        );
        Ok(Url::parse(&raw)?)
    }

    /// Opens the preview download and classifies the response.
    /// Returns the declared content length (if any) and the body stream.
    pub async fn fetch(
        &self,
        url: Url,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self.client.get(url).send().await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound),
            status => return Err(FetchError::Status(status)),
        }

        let total = response.content_length();
        let stream = response.bytes_stream().map_err(FetchError::Request);

        Ok((total, stream))
    }
}
