// src/extractors/job.rs

use scraper::Html;

use super::generic;
use super::jsonld;
use super::platform::{self, Platform};
use super::posting::{Extraction, ExtractionStrategy, JobPosting};
use super::text::text_len;
use crate::fetch::PageFetcher;
use crate::utils::error::FetchError;

// --- Constants ---
/// Structured-data descriptions shorter than this are treated as placeholders.
pub const DEFAULT_MIN_STRUCTURED_DESCRIPTION: usize = 100;
/// Container text must be strictly longer than this to count as a description.
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 200;
pub const DEFAULT_JOB_KEYWORDS: &[&str] = &[
    "experience",
    "responsibilities",
    "requirements",
    "qualifications",
    "skills",
    "team",
    "role",
    "position",
];

/// Tunable thresholds for the extraction pipeline.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub min_structured_description: usize,
    pub min_content_length: usize,
    /// Lowercase keywords; at least one must appear in accepted container text.
    pub keywords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_structured_description: DEFAULT_MIN_STRUCTURED_DESCRIPTION,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            keywords: DEFAULT_JOB_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ExtractorConfig {
    /// Long enough and plausibly job-related.
    pub fn accepts_content(&self, text: &str) -> bool {
        if text_len(text) <= self.min_content_length {
            return false;
        }
        let lower = text.to_lowercase();
        self.keywords.iter().any(|keyword| lower.contains(keyword.as_str()))
    }
}

pub struct JobPostingExtractor<F> {
    fetcher: F,
    config: ExtractorConfig,
}

impl<F: PageFetcher> JobPostingExtractor<F> {
    pub fn new(fetcher: F, config: ExtractorConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetches `url` and extracts the posting. Only transport failures are errors.
    pub async fn extract(&self, url: &str) -> Result<Extraction, FetchError> {
        let html = self.fetcher.fetch(url).await?;
        tracing::info!("Fetched {} ({} bytes)", url, html.len());
        Ok(extract_html(&html, url, &self.config))
    }
}

/// Runs every strategy over an HTML page in preference order.
pub fn extract_html(html: &str, url: &str, config: &ExtractorConfig) -> Extraction {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();

    // 1. Structured data
    if let Some(structured) = jsonld::extract_job_posting(&document) {
        extraction.absorb(ExtractionStrategy::JsonLd, &structured);
    }

    let structured_is_authoritative = (!extraction.posting.title.is_empty()
        || !extraction.posting.description.is_empty())
        && extraction.posting.description_len() >= config.min_structured_description;

    if structured_is_authoritative {
        tracing::debug!("JSON-LD description is complete, skipping content strategies");
    } else {
        extract_content(&document, url, config, &mut extraction);
    }

    // 4. Meta-tag backfill
    let mut meta = generic::meta_posting(&document);
    if extraction.posting.description_len() >= config.min_structured_description {
        meta.description.clear();
    }
    extraction.absorb(ExtractionStrategy::MetaTag, &meta);

    tracing::info!(
        "Extracted posting '{}' at '{}' ({} description chars) via [{}]",
        extraction.posting.title,
        extraction.posting.company,
        extraction.posting.description_len(),
        extraction.strategies.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
    );
    extraction
}

fn extract_content(document: &Html, url: &str, config: &ExtractorConfig, extraction: &mut Extraction) {
    // 2. Platform-specific containers
    if let Some(platform) = Platform::detect(url) {
        tracing::debug!("URL matches platform {}", platform);
        let candidate = platform::extract(platform, document, url, config);
        extraction.absorb(ExtractionStrategy::PlatformSpecific(platform), &candidate);
    }

    if text_len(&extraction.posting.description) > config.min_content_length {
        return;
    }

    // 3. Generic containers, then the bare body
    let candidate = generic::extract(document, config);
    let found_container = !candidate.description.is_empty();
    extraction.absorb(ExtractionStrategy::GenericPattern, &candidate);

    if !found_container {
        tracing::debug!("No generic container qualified, falling back to body text");
        let body = JobPosting {
            description: generic::body_text(document),
            ..Default::default()
        };
        extraction.absorb(ExtractionStrategy::BodyText, &body);
    }
}
