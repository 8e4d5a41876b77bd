use serde::{Deserialize, Serialize};

/// A previewable catalog entry. Enters the screen as a JSON payload and is
/// returned unmodified on stdout when the user selects it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub site: Option<String>,
}

impl CatalogItem {
    /// The site link is shown only when the field is present and non-empty.
    pub fn site_url(&self) -> Option<&str> {
        self.site.as_deref().filter(|s| !s.is_empty())
    }
}

/// One in-flight progress report. Only emitted when the server declared a
/// total content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    pub percent: u8,
    pub bytes_so_far: u64,
    pub total_bytes: u64,
}

impl ProgressSample {
    pub fn new(bytes_so_far: u64, total_bytes: u64) -> Self {
        Self {
            percent: (bytes_so_far * 100 / total_bytes).min(100) as u8,
            bytes_so_far,
            total_bytes,
        }
    }
}

/// Where the screen currently is in the preview flow. `Resolving` and
/// `Downloading` are the only phases the screen leaves on its own; the rest
/// change only through explicit user actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenPhase {
    Resolving,
    Downloading,
    Playing,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_sample_percent() {
        assert_eq!(ProgressSample::new(4096, 4096).percent, 100);
        assert_eq!(ProgressSample::new(2048, 4096).percent, 50);
        assert_eq!(ProgressSample::new(0, 4096).percent, 0);
    }

    #[test]
    fn site_url_empty_is_hidden() {
        let mut item = CatalogItem {
            id: "42".into(),
            title: "t".into(),
            author: "a".into(),
            site: Some(String::new()),
        };
        assert_eq!(item.site_url(), None);
        item.site = Some("https://example.com".into());
        assert_eq!(item.site_url(), Some("https://example.com"));
        item.site = None;
        assert_eq!(item.site_url(), None);
    }

    #[test]
    fn item_round_trips_through_json() {
        let json = r#"{"id":"7","title":"Waves","author":"ada"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "7");
        assert_eq!(item.site, None);
        let out = serde_json::to_string(&item).unwrap();
        let back: CatalogItem = serde_json::from_str(&out).unwrap();
        assert_eq!(back.title, "Waves");
    }
}
