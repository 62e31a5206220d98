// src/extractors/jsonld.rs
//! Structured-data extraction from `<script type="application/ld+json">` blocks.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::Value;

use super::posting::JobPosting;
use super::text::{clean_text, html_to_text};

static JSONLD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="application/ld+json"], script[type="application/ld+json; charset=utf-8"]"#)
        .expect("Failed to compile JSONLD_SELECTOR")
});

const JOB_POSTING_TYPE: &str = "JobPosting";

/// Returns the first JobPosting record found in the document's structured data.
/// Blocks that fail to parse are skipped.
pub fn extract_job_posting(document: &Html) -> Option<JobPosting> {
    for element in document.select(&JSONLD_SELECTOR) {
        // Raw script text; inner_html would re-escape `<` and `&`
        let content = element.text().collect::<String>();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let json = match serde_json::from_str::<Value>(trimmed) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!("Skipping malformed JSON-LD block: {}", e);
                continue;
            }
        };

        if let Some(record) = find_job_posting(&json) {
            tracing::debug!("Found JSON-LD JobPosting record");
            return Some(map_record(record));
        }
    }
    None
}

/// Walks bare records, arrays of records and `@graph` containers.
fn find_job_posting(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_job_posting),
        Value::Object(obj) => {
            if is_job_posting(value) {
                return Some(value);
            }
            obj.get("@graph").and_then(find_job_posting)
        }
        _ => None,
    }
}

fn is_job_posting(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(s)) => s == JOB_POSTING_TYPE,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(JOB_POSTING_TYPE)),
        _ => false,
    }
}

fn map_record(record: &Value) -> JobPosting {
    let title = string_field(record, "title")
        .or_else(|| string_field(record, "name"))
        .map(clean_text)
        .unwrap_or_default();

    let description = string_field(record, "description")
        .map(html_to_text)
        .unwrap_or_default();

    let company = record
        .get("hiringOrganization")
        .and_then(organization_name)
        .map(clean_text)
        .unwrap_or_default();

    let location = record
        .get("jobLocation")
        .and_then(location_name)
        .map(clean_text)
        .unwrap_or_default();

    JobPosting { title, company, description, location }
}

fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn organization_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name.as_str()),
        Value::Object(_) => string_field(value, "name"),
        Value::Array(items) => items.first().and_then(organization_name),
        _ => None,
    }
}

/// Locality of the first job location, in string, object or array form.
fn location_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()).filter(|s| !s.trim().is_empty()),
        Value::Array(items) => items.first().and_then(location_name),
        Value::Object(_) => {
            let address = value.get("address");
            address
                .and_then(|a| string_field(a, "addressLocality"))
                .or_else(|| string_field(value, "name"))
                .or_else(|| address.and_then(Value::as_str))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> Option<JobPosting> {
        extract_job_posting(&Html::parse_document(html))
    }

    #[test]
    fn maps_a_bare_job_posting_record() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@context": "https://schema.org", "@type": "JobPosting",
             "title": "Backend Engineer",
             "description": "<p>Build APIs.</p><ul><li>Rust</li></ul>",
             "hiringOrganization": {"@type": "Organization", "name": "Acme Corp"},
             "jobLocation": {"@type": "Place", "address": {"addressLocality": "Lisbon"}}}
            </script></head><body></body></html>"#;

        let posting = parse(html).expect("posting");
        assert_eq!(posting.title, "Backend Engineer");
        assert_eq!(posting.company, "Acme Corp");
        assert_eq!(posting.location, "Lisbon");
        assert_eq!(posting.description, "Build APIs.\n\n• Rust");
    }

    #[test]
    fn handles_arrays_graphs_and_string_forms() {
        let html = r#"<script type="application/ld+json">
            [{"@type": "WebSite", "name": "Careers"},
             {"@graph": [{"@type": ["JobPosting"], "name": "Data Analyst",
                          "hiringOrganization": "Globex",
                          "jobLocation": [{"name": "Remote"}, {"name": "Austin"}]}]}]
            </script>"#;

        let posting = parse(html).expect("posting");
        assert_eq!(posting.title, "Data Analyst");
        assert_eq!(posting.company, "Globex");
        assert_eq!(posting.location, "Remote");
        assert!(posting.description.is_empty());
    }

    #[test]
    fn skips_malformed_blocks_and_continues() {
        let html = r#"
            <script type="application/ld+json">{ not json </script>
            <script type="application/ld+json">{"@type": "JobPosting", "title": "SRE", "jobLocation": "Oslo"}</script>"#;

        let posting = parse(html).expect("posting");
        assert_eq!(posting.title, "SRE");
        assert_eq!(posting.location, "Oslo");
    }

    #[test]
    fn reads_script_text_without_html_escaping() {
        let html = r#"<script type="application/ld+json">
            {"@type": "JobPosting", "title": "R&D Engineer",
             "description": "<p>Build <b>APIs</b> for the team.</p>",
             "hiringOrganization": {"name": "Johnson & Johnson"}}
            </script>"#;

        let posting = parse(html).expect("posting");
        assert_eq!(posting.title, "R&D Engineer");
        assert_eq!(posting.company, "Johnson & Johnson");
        assert_eq!(posting.description, "Build APIs for the team.");
    }

    #[test]
    fn ignores_non_job_records() {
        let html = r#"<script type="application/ld+json">{"@type": "Organization", "name": "Acme"}</script>"#;
        assert!(parse(html).is_none());
    }
}
