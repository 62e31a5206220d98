// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::Extraction;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory like /base_dir/<company>/ for a posting
    fn posting_dir(&self, extraction: &Extraction) -> Result<PathBuf, StorageError> {
        let company = slugify(&extraction.posting.company);
        let target_dir = self.base_dir.join(if company.is_empty() { "unknown".to_string() } else { company });

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir)
                .map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    fn file_stem(extraction: &Extraction) -> String {
        let title = slugify(&extraction.posting.title);
        if title.is_empty() { "posting".to_string() } else { title }
    }

    /// Saves the extracted posting as JSON
    pub fn save_posting(&self, extraction: &Extraction) -> Result<PathBuf, StorageError> {
        let file_path = self
            .posting_dir(extraction)?
            .join(format!("{}.json", Self::file_stem(extraction)));

        let json = serde_json::to_string_pretty(extraction)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, json)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved posting to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the extraction in JSON format
    pub fn save_posting_metadata(&self, extraction: &Extraction, source_url: &str) -> Result<PathBuf, StorageError> {
        let file_path = self
            .posting_dir(extraction)?
            .join(format!("{}_meta.json", Self::file_stem(extraction)));

        let metadata = serde_json::json!({
            "source_url": source_url,
            "title": extraction.posting.title,
            "company": extraction.posting.company,
            "description_length": extraction.posting.description_len(),
            "strategies": extraction.strategies.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
fn slugify(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
