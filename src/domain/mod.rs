pub mod error;
pub mod model;

pub use error::PreviewError;
pub use model::{CatalogItem, ProgressSample, ScreenPhase};
