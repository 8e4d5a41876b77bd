use thiserror::Error;

/// User-visible failure taxonomy for the preview flow. The `Display` text is
/// what the screen renders in the inline error label.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PreviewError {
    #[error("No network connection")]
    Connectivity,

    #[error("Preview not found")]
    NotFound,

    #[error("Could not load the preview")]
    Download(String),

    // Shares the generic display text with `Download`: the screen does not
    // distinguish a bad transfer from an unplayable file.
    #[error("Could not load the preview")]
    Playback(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_user_facing() {
        assert_eq!(PreviewError::NotFound.to_string(), "Preview not found");
        assert_eq!(
            PreviewError::Download("timed out".into()).to_string(),
            "Could not load the preview"
        );
    }
}
