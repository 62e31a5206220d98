// src/extractors/platform.rs
//! Extractors for job boards hosted by known applicant-tracking platforms.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use std::fmt;
use url::Url;

use super::generic::{first_qualifying_text, first_text, ContainerRule};
use super::job::ExtractorConfig;
use super::posting::JobPosting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    Greenhouse,
    Lever,
    Ashby,
    Workday,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Greenhouse => "greenhouse",
            Platform::Lever => "lever",
            Platform::Ashby => "ashby",
            Platform::Workday => "workday",
        };
        f.write_str(name)
    }
}

impl Platform {
    /// Identifies the hosting platform by substring-matching the URL.
    pub fn detect(url: &str) -> Option<Platform> {
        let url = url.to_lowercase();
        if url.contains("greenhouse.io") {
            Some(Platform::Greenhouse)
        } else if url.contains("lever.co") {
            Some(Platform::Lever)
        } else if url.contains("ashbyhq.com") {
            Some(Platform::Ashby)
        } else if url.contains("myworkdayjobs.com") || url.contains("workday.com") {
            Some(Platform::Workday)
        } else {
            None
        }
    }

    /// Platforms whose posting URLs start with the company's board slug.
    fn uses_company_slug(&self) -> bool {
        matches!(self, Platform::Greenhouse | Platform::Lever | Platform::Ashby)
    }
}

// --- CSS Selectors (Lazy Static) ---
const NO_SELECTORS: &[Selector] = &[];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to compile platform selector")
}

static GREENHOUSE_CONTENT: Lazy<Vec<ContainerRule>> = Lazy::new(|| {
    vec![
        ContainerRule::up_to_application(selector("#content")),
        ContainerRule::first(selector(".app-body, #app_body")),
        ContainerRule::first(selector(".job__description, [class*='job-post-content']")),
    ]
});
static GREENHOUSE_TITLE: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![selector("h1.app-title"), selector(".app-title"), selector("h1")]);
static GREENHOUSE_COMPANY: Lazy<Vec<Selector>> = Lazy::new(|| vec![selector(".company-name")]);
static GREENHOUSE_LOCATION: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![selector("div.location"), selector(".job__location"), selector(".location")]);

static LEVER_CONTENT: Lazy<Vec<ContainerRule>> = Lazy::new(|| {
    vec![
        ContainerRule::all(selector(".section-wrapper.page-full-width .section, .posting-page .section")),
        ContainerRule::up_to_application(selector(".section-wrapper")),
        ContainerRule::first(selector("[data-qa='job-description']")),
    ]
});
static LEVER_TITLE: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![selector(".posting-headline h2"), selector("h2")]);
static LEVER_LOCATION: Lazy<Vec<Selector>> = Lazy::new(|| {
    vec![selector(".posting-categories .location"), selector("div.location"), selector("span.location")]
});

static ASHBY_CONTENT: Lazy<Vec<ContainerRule>> = Lazy::new(|| {
    vec![
        ContainerRule::first(selector("[class*='ashby-job-posting-description']")),
        ContainerRule::first(selector("[class*='job-description']")),
    ]
});
static ASHBY_TITLE: Lazy<Vec<Selector>> = Lazy::new(|| vec![selector("h1")]);

static WORKDAY_CONTENT: Lazy<Vec<ContainerRule>> = Lazy::new(|| {
    vec![ContainerRule::first(selector("[data-automation-id*='jobPostingDescription']"))]
});
static WORKDAY_TITLE: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![selector("[data-automation-id*='jobPostingHeader']")]);
static WORKDAY_LOCATION: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![selector("[data-automation-id*='locations'] dd"), selector("[data-automation-id*='locations']")]);

// Splits "figureAI" into "figure" / "AI".
static CASE_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("Failed to compile CASE_BOUNDARY_RE"));

/// Runs the extractor for `platform` over an already-parsed page.
pub fn extract(platform: Platform, document: &Html, url: &str, config: &ExtractorConfig) -> JobPosting {
    let (content, title, company, location): (&[ContainerRule], &[Selector], &[Selector], &[Selector]) =
        match platform {
            Platform::Greenhouse => (
                GREENHOUSE_CONTENT.as_slice(),
                GREENHOUSE_TITLE.as_slice(),
                GREENHOUSE_COMPANY.as_slice(),
                GREENHOUSE_LOCATION.as_slice(),
            ),
            Platform::Lever => (LEVER_CONTENT.as_slice(), LEVER_TITLE.as_slice(), NO_SELECTORS, LEVER_LOCATION.as_slice()),
            Platform::Ashby => (ASHBY_CONTENT.as_slice(), ASHBY_TITLE.as_slice(), NO_SELECTORS, NO_SELECTORS),
            Platform::Workday => (WORKDAY_CONTENT.as_slice(), WORKDAY_TITLE.as_slice(), NO_SELECTORS, WORKDAY_LOCATION.as_slice()),
        };

    let description = first_qualifying_text(document, content, config).unwrap_or_default();
    if description.is_empty() {
        tracing::debug!("No {} container passed the content gate", platform);
    }

    // Greenhouse renders the company as "at Acme"
    let company = first_text(document, company)
        .map(|name| name.strip_prefix("at ").map(str::to_string).unwrap_or(name))
        .filter(|name| !name.is_empty())
        .or_else(|| company_from_url(platform, url))
        .unwrap_or_default();

    JobPosting {
        title: first_text(document, title).unwrap_or_default(),
        company,
        description,
        location: first_text(document, location).unwrap_or_default(),
    }
}

/// Derives a display company name from the posting URL, if the platform encodes one.
pub fn company_from_url(platform: Platform, url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    if platform == Platform::Workday {
        // acme.wd5.myworkdayjobs.com
        let host = parsed.host_str()?;
        if !host.ends_with("myworkdayjobs.com") {
            return None;
        }
        return host.split('.').next().map(humanize_slug).filter(|s| !s.is_empty());
    }

    if !platform.uses_company_slug() {
        return None;
    }

    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
    let slug = match segments.next()? {
        // boards.greenhouse.io/embed/job_app?for=acme
        "embed" => parsed
            .query_pairs()
            .find(|(key, _)| key == "for")
            .map(|(_, value)| value.into_owned())?,
        first => first.to_string(),
    };

    Some(humanize_slug(&slug)).filter(|s| !s.is_empty())
}

/// Turns a board slug into a display name: split on case boundaries, hyphens
/// and underscores, then title-case each word. `figureAI` becomes `Figure Ai`.
pub fn humanize_slug(slug: &str) -> String {
    let spaced = CASE_BOUNDARY_RE.replace_all(slug, "$1 $2");
    spaced
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
