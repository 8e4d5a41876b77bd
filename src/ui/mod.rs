use iced::{
    widget::{button, column, progress_bar, row, text, Space},
    Element, Length,
};

use crate::domain::{CatalogItem, ProgressSample, ScreenPhase};

/// Display state for the preview screen.
pub struct PreviewView {
    pub title: String,
    pub author: String,
    pub has_site: bool,
    pub phase: ScreenPhase,
    pub error_text: Option<String>,
    pub progress: Option<ProgressSample>,
}

#[derive(Debug, Clone)]
pub enum PreviewMessage {
    SelectPressed,
    OpenLinkPressed,
}

impl PreviewView {
    pub fn new(item: &CatalogItem) -> Self {
        Self {
            title: item.title.clone(),
            author: item.author.clone(),
            has_site: item.site_url().is_some(),
            phase: ScreenPhase::Resolving,
            error_text: None,
            progress: None,
        }
    }

    pub fn view(&self) -> Element<'_, PreviewMessage> {
        let status: Element<'_, PreviewMessage> = match &self.phase {
            ScreenPhase::Resolving => text("Loading preview...").size(14).into(),
            ScreenPhase::Downloading => match &self.progress {
                // Indeterminate until the first sample arrives.
                None => text("Downloading preview...").size(14).into(),
                Some(sample) => column![
                    progress_bar(0.0..=100.0, f32::from(sample.percent)),
                    text(format!(
                        "Downloading preview: {}% ({} / {} bytes)",
                        sample.percent, sample.bytes_so_far, sample.total_bytes
                    ))
                    .size(14),
                ]
                .spacing(5)
                .into(),
            },
            ScreenPhase::Playing => text("Preview playing").size(14).into(),
            ScreenPhase::Error => text(self.error_text.as_deref().unwrap_or_default())
                .size(14)
                .into(),
        };

        let mut actions = row![button("Select").on_press(PreviewMessage::SelectPressed)].spacing(10);
        if self.has_site {
            actions = actions.push(button("Open link").on_press(PreviewMessage::OpenLinkPressed));
        }

        column![
            text(&self.title).size(32),
            text(&self.author).size(16),
            Space::new().height(Length::Fixed(20.0)),
            status,
            Space::new().height(Length::Fixed(20.0)),
            actions,
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
