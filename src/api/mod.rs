mod client;

pub use client::{FetchError, PreviewClient, Result};
