// src/extractors/mod.rs
pub mod generic;
pub mod job;
pub mod jsonld;
pub mod platform;
pub mod posting;
pub mod text;

// Re-export key extraction types for convenience
pub use job::{extract_html, ExtractorConfig, JobPostingExtractor};
pub use posting::Extraction;
