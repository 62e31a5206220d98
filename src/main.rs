// src/main.rs
mod utils;
mod extractors;
mod fetch;
mod autofill;
mod storage;

use clap::{Parser, Subcommand};
use utils::AppError;
use autofill::{FieldMatcher, FillMode, HeadlessDocument, Profile};
use extractors::{Extraction, ExtractorConfig, JobPostingExtractor};
use fetch::HttpFetcher;
use storage::StorageManager;

/// Command Line Interface for the job application assistant
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Structured-data descriptions shorter than this fall through to page scraping
    #[arg(long, global = true, env = "JOB_MIN_STRUCTURED_DESC", default_value_t = extractors::job::DEFAULT_MIN_STRUCTURED_DESCRIPTION)]
    min_structured_description: usize,

    /// Container text must be longer than this to count as a description
    #[arg(long, global = true, env = "JOB_MIN_CONTENT_LEN", default_value_t = extractors::job::DEFAULT_MIN_CONTENT_LENGTH)]
    min_content_length: usize,

    /// Job keywords, comma separated (overrides the built-in list)
    #[arg(long, global = true, env = "JOB_KEYWORDS", value_delimiter = ',')]
    keywords: Vec<String>,

    /// Output directory for extracted postings (optional)
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a job posting and print the extracted record
    FetchJob {
        #[arg(short, long)]
        url: String,
    },
    /// Extract a posting from a saved HTML page
    ExtractFile {
        #[arg(short, long)]
        file: String,
        /// URL the page was saved from, used for platform detection
        #[arg(short, long)]
        url: String,
    },
    /// Extract several postings concurrently
    Batch {
        #[arg(short, long = "url", required = true)]
        urls: Vec<String>,
    },
    /// Fill an HTML form from a saved profile
    Autofill {
        #[arg(long)]
        form: String,
        #[arg(long)]
        profile: String,
        #[arg(long, value_enum, default_value_t = FillMode::Full)]
        mode: FillMode,
    },
    /// Report whether a page looks like a job application
    Detect {
        #[arg(short, long)]
        url: String,
        /// Saved HTML of the page (optional)
        #[arg(long)]
        text_file: Option<String>,
    },
}

impl Args {
    fn extractor_config(&self) -> ExtractorConfig {
        let mut config = ExtractorConfig {
            min_structured_description: self.min_structured_description,
            min_content_length: self.min_content_length,
            ..Default::default()
        };
        let keywords: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if !keywords.is_empty() {
            tracing::debug!("Using {} keywords from command line/environment", keywords.len());
            config.keywords = keywords;
        }
        config
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn save_extraction(storage: Option<&StorageManager>, extraction: &Extraction, url: &str) {
    let Some(storage) = storage else { return };
    if extraction.posting.is_empty() {
        tracing::warn!("Nothing extracted from {}, skipping save", url);
        return;
    }
    if let Err(e) = storage.save_posting(extraction) {
        tracing::error!("Failed to save posting: {}", e);
    }
    if let Err(e) = storage.save_posting_metadata(extraction, url) {
        tracing::error!("Failed to save posting metadata: {}", e);
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    let config = args.extractor_config();
    let storage = args.output_dir.as_ref().map(StorageManager::new).transpose()?;

    match &args.command {
        Command::FetchJob { url } => {
            let extractor = JobPostingExtractor::new(HttpFetcher::new()?, config);
            let extraction = extractor.extract(url).await?;
            tracing::info!("Extracted posting via {:?}", extraction.strategies);
            save_extraction(storage.as_ref(), &extraction, url);
            print_json(&extraction)?;
        }
        Command::ExtractFile { file, url } => {
            let html = std::fs::read_to_string(file)?;
            let extraction = extractors::extract_html(&html, url, &config);
            save_extraction(storage.as_ref(), &extraction, url);
            print_json(&extraction)?;
        }
        Command::Batch { urls } => {
            let extractor = JobPostingExtractor::new(HttpFetcher::new()?, config);
            let items = fetch::extract_batch(&extractor, urls).await?;
            for item in &items {
                if let Some(extraction) = &item.extraction {
                    save_extraction(storage.as_ref(), extraction, &item.url);
                }
            }
            print_json(&items)?;
            if items.iter().all(|item| item.error.is_some()) {
                tracing::error!("Failed to extract any of the {} postings", items.len());
            }
        }
        Command::Autofill { form, profile, mode } => {
            let html = std::fs::read_to_string(form)?;
            let profile: Profile = serde_json::from_str(&std::fs::read_to_string(profile)?)?;

            let mut document = HeadlessDocument::parse(&html);
            let filled = FieldMatcher::new(&mut document).fill_all(&profile, *mode);
            tracing::info!("Filled {} fields", filled);

            print_json(&serde_json::json!({
                "filled": filled,
                "controls": document.touched_controls(),
                "focused": document.focused(),
                "events": document.events(),
            }))?;
        }
        Command::Detect { url, text_file } => {
            let page_text = match text_file {
                Some(path) => extractors::text::html_to_text(&std::fs::read_to_string(path)?),
                None => String::new(),
            };
            let is_application = autofill::is_application_page(url, &page_text);
            print_json(&serde_json::json!({
                "url": url,
                "isApplicationPage": is_application,
            }))?;
        }
    }

    Ok(())
}
