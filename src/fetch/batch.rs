// src/fetch/batch.rs
use futures::future::join_all;
use serde::Serialize;

use super::PageFetcher;
use crate::extractors::{Extraction, JobPostingExtractor};
use crate::utils::AppError;

/// Upper bound on postings compared in one batch.
pub const MAX_BATCH_URLS: usize = 5;

/// Outcome for one URL of a batch. Exactly one of `extraction`/`error` is set.
#[derive(Debug, Serialize)]
pub struct BatchItem {
    pub index: usize,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction: Option<Extraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Extracts up to [`MAX_BATCH_URLS`] postings concurrently.
///
/// A failing URL is reported in its own item and does not affect the others.
pub async fn extract_batch<F: PageFetcher>(
    extractor: &JobPostingExtractor<F>,
    urls: &[String],
) -> Result<Vec<BatchItem>, AppError> {
    if urls.is_empty() {
        return Err(AppError::Config("At least one job URL is required".to_string()));
    }
    if urls.len() > MAX_BATCH_URLS {
        return Err(AppError::Config(format!(
            "Maximum {} job URLs allowed per batch, got {}",
            MAX_BATCH_URLS,
            urls.len()
        )));
    }

    let tasks = urls.iter().enumerate().map(|(index, url)| async move {
        match extractor.extract(url).await {
            Ok(extraction) => BatchItem { index, url: url.clone(), extraction: Some(extraction), error: None },
            Err(e) => {
                tracing::warn!("Batch item {} ({}) failed: {}", index, url, e);
                BatchItem { index, url: url.clone(), extraction: None, error: Some(e.to_string()) }
            }
        }
    });

    let items = join_all(tasks).await;
    let failures = items.iter().filter(|item| item.error.is_some()).count();
    tracing::info!("Batch finished. Success: {}, Failures: {}", items.len() - failures, failures);
    Ok(items)
}
