// src/extractors/generic.rs
//! Platform-agnostic fallbacks: common description containers, the page body,
//! and `<meta>`/`<title>` tags.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use super::job::ExtractorConfig;
use super::posting::JobPosting;
use super::text::{clean_text, html_to_text};

/// How a container selector turns matched elements into an HTML fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerMode {
    /// Each match is a candidate on its own, in document order.
    First,
    /// All top-level matches are concatenated into one candidate.
    All,
    /// Like `First`, but the fragment is cut at the embedded application form.
    UpToApplication,
}

#[derive(Debug, Clone)]
pub struct ContainerRule {
    selector: Selector,
    mode: ContainerMode,
}

impl ContainerRule {
    pub fn first(selector: Selector) -> Self {
        Self { selector, mode: ContainerMode::First }
    }

    pub fn all(selector: Selector) -> Self {
        Self { selector, mode: ContainerMode::All }
    }

    pub fn up_to_application(selector: Selector) -> Self {
        Self { selector, mode: ContainerMode::UpToApplication }
    }

    /// Candidate HTML fragments produced by this rule, in preference order.
    fn fragments(&self, document: &Html) -> Vec<String> {
        match self.mode {
            ContainerMode::First => document.select(&self.selector).map(|el| el.inner_html()).collect(),
            ContainerMode::UpToApplication => document
                .select(&self.selector)
                .map(|el| truncate_at_application(&el.inner_html()).to_string())
                .collect(),
            ContainerMode::All => {
                let mut taken = HashSet::new();
                let mut joined = String::new();
                for element in document.select(&self.selector) {
                    let nested = element.ancestors().any(|ancestor| taken.contains(&ancestor.id()));
                    if nested {
                        continue;
                    }
                    taken.insert(element.id());
                    joined.push_str(&element.inner_html());
                    joined.push('\n');
                }
                if joined.is_empty() {
                    Vec::new()
                } else {
                    vec![joined]
                }
            }
        }
    }
}

// --- CSS Selectors (Lazy Static) ---
static GENERIC_CONTENT: Lazy<Vec<ContainerRule>> = Lazy::new(|| {
    [
        "[class*='job-description'], [class*='job_description'], [class*='jobdescription'], [class*='jobDescription']",
        "[class*='description']",
        "[class*='content']",
        "article",
        "main",
    ]
    .iter()
    .map(|css| ContainerRule::first(Selector::parse(css).expect("Failed to compile GENERIC_CONTENT")))
    .collect()
});

static H1_SELECTOR: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![Selector::parse("h1").expect("Failed to compile H1_SELECTOR")]);
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("Failed to compile BODY_SELECTOR"));
static META_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").expect("Failed to compile META_SELECTOR"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("Failed to compile TITLE_SELECTOR"));

// --- Regex Patterns (Lazy Static) ---
static APPLICATION_CUTOFF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<form\b|<div[^>]*\bid=["']application|<div[^>]*\bclass=["'][^"']*application"#)
        .expect("Failed to compile APPLICATION_CUTOFF_RE")
});

static PAGE_CHROME_RE: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)<header\b.*?</header\s*>",
        r"(?is)<nav\b.*?</nav\s*>",
        r"(?is)<footer\b.*?</footer\s*>",
    ]
    .iter()
    .map(|pat| Regex::new(pat).expect("Failed to compile PAGE_CHROME_RE"))
    .collect()
});

const TITLE_SEPARATORS: &[char] = &['|', '-', '–', '—'];

/// Generic container pass: the first common description container whose
/// text passes the content gate, plus the first `<h1>` as title.
pub fn extract(document: &Html, config: &ExtractorConfig) -> JobPosting {
    JobPosting {
        title: first_text(document, &H1_SELECTOR).unwrap_or_default(),
        description: first_qualifying_text(document, &GENERIC_CONTENT, config).unwrap_or_default(),
        ..Default::default()
    }
}

/// Last resort: the whole body as text, with header/nav/footer removed.
pub fn body_text(document: &Html) -> String {
    let body_html = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_else(|| document.root_element().inner_html());

    let stripped = PAGE_CHROME_RE
        .iter()
        .fold(body_html, |html, re| re.replace_all(&html, "").into_owned());

    html_to_text(&stripped)
}

/// Tries each rule in order and returns the text of the first fragment the
/// config's content gate accepts.
pub fn first_qualifying_text(document: &Html, rules: &[ContainerRule], config: &ExtractorConfig) -> Option<String> {
    for rule in rules {
        for fragment in rule.fragments(document) {
            let text = html_to_text(&fragment);
            if config.accepts_content(&text) {
                return Some(text);
            }
            tracing::trace!("Rejected container candidate ({} chars)", text.chars().count());
        }
    }
    None
}

/// Cleaned text of the first element matching any selector, in selector order.
pub fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        document
            .select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

fn truncate_at_application(html: &str) -> &str {
    match APPLICATION_CUTOFF_RE.find(html) {
        Some(m) => &html[..m.start()],
        None => html,
    }
}

/// Content of the first `<meta>` whose `property` or `name` equals `key`.
pub fn meta_content(document: &Html, key: &str) -> Option<String> {
    document.select(&META_SELECTOR).find_map(|meta| {
        let element = meta.value();
        let matches_key = ["property", "name"]
            .iter()
            .filter_map(|attr| element.attr(attr))
            .any(|value| value.trim().eq_ignore_ascii_case(key));
        if !matches_key {
            return None;
        }
        element.attr("content").map(clean_text).filter(|content| !content.is_empty())
    })
}

/// The `<title>` text before the first separator ("Engineer | Acme" → "Engineer").
pub fn document_title(document: &Html) -> Option<String> {
    let title = document.select(&TITLE_SELECTOR).next()?.text().collect::<String>();
    let head = title.split(TITLE_SEPARATORS).next().unwrap_or_default();
    Some(clean_text(head)).filter(|t| !t.is_empty())
}

/// Meta-tag candidate for backfilling: Open Graph title (else `<title>`),
/// Open Graph site name, and Open Graph (else plain) description.
pub fn meta_posting(document: &Html) -> JobPosting {
    JobPosting {
        title: meta_content(document, "og:title")
            .or_else(|| document_title(document))
            .unwrap_or_default(),
        company: meta_content(document, "og:site_name").unwrap_or_default(),
        description: meta_content(document, "og:description")
            .or_else(|| meta_content(document, "description"))
            .unwrap_or_default(),
        location: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV_TEXT: &str = "Home About Us Blog Pricing Contact Login Sign Up Products Solutions \
        Partners Press Investors Legal Privacy Cookies Terms Sitemap Status Support Docs \
        Community Events Webinars Newsletter Podcast Store Gift Cards Affiliates Brand Assets Security";

    fn padded(keyword: &str) -> String {
        format!("{} {}", NAV_TEXT, keyword)
    }

    #[test]
    fn content_gate_rejects_long_navigation_text() {
        assert!(NAV_TEXT.chars().count() > 200);
        let html = format!("<div class=\"content\">{}</div>", NAV_TEXT);
        let document = Html::parse_document(&html);
        assert!(extract(&document, &ExtractorConfig::default()).description.is_empty());
    }

    #[test]
    fn content_gate_accepts_text_with_a_job_keyword() {
        let html = format!("<div class=\"content\">{}</div>", padded("responsibilities"));
        let document = Html::parse_document(&html);
        let posting = extract(&document, &ExtractorConfig::default());
        assert!(posting.description.ends_with("responsibilities"));
    }

    #[test]
    fn generic_containers_are_tried_in_order() {
        let html = format!(
            r#"<main><p>{}</p></main><div class="job-description"><p>{}</p></div>"#,
            padded("team"),
            padded("qualifications")
        );
        let document = Html::parse_document(&html);
        let posting = extract(&document, &ExtractorConfig::default());
        assert!(posting.description.ends_with("qualifications"));
    }

    #[test]
    fn body_text_drops_page_chrome() {
        let html = "<html><body><header>Logo</header><nav>Menu</nav>\
                    <p>The actual posting.</p><footer>Copyright</footer></body></html>";
        let document = Html::parse_document(html);
        assert_eq!(body_text(&document), "The actual posting.");
    }

    #[test]
    fn application_form_is_cut_from_container() {
        let html = "<p>Role details</p><form><input name=\"email\"></form>";
        assert_eq!(truncate_at_application(html), "<p>Role details</p>");
        assert_eq!(truncate_at_application("<p>No form</p>"), "<p>No form</p>");
    }

    #[test]
    fn meta_tags_are_matched_by_property_or_name() {
        let html = r#"<html><head>
            <meta content="Acme Careers" property="og:site_name">
            <meta name="Description" content="  Join   us  ">
            <title>Senior Designer | Acme</title>
            </head><body></body></html>"#;
        let document = Html::parse_document(html);
        let posting = meta_posting(&document);
        assert_eq!(posting.title, "Senior Designer");
        assert_eq!(posting.company, "Acme Careers");
        assert_eq!(posting.description, "Join us");
    }

    #[test]
    fn og_title_beats_document_title() {
        let html = r#"<head><meta property="og:title" content="Staff Engineer"><title>Jobs - Acme</title></head>"#;
        let document = Html::parse_document(html);
        assert_eq!(meta_posting(&document).title, "Staff Engineer");
        assert_eq!(document_title(&document), Some("Jobs".to_string()));
    }
}
