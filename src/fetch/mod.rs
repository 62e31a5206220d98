// src/fetch/mod.rs
pub mod batch;
pub mod client;

use crate::utils::error::FetchError;

pub use batch::extract_batch;
pub use client::HttpFetcher;

/// Text-fetch capability: HTTP GET returning the body, or the failing status.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
