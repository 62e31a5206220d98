// src/autofill/detect.rs

const URL_KEYWORDS: &[&str] = &[
    "apply",
    "application",
    "careers",
    "jobs",
    "workday",
    "greenhouse",
    "lever",
    "taleo",
    "icims",
    "smartrecruiters",
    "jobvite",
    "breezy",
    "ashby",
];

const PAGE_INDICATORS: &[&str] = &["apply now", "submit application", "upload resume", "work experience"];

/// Whether a page looks like a job application, judged by its URL first and
/// then by tell-tale phrases in its visible text.
pub fn is_application_page(url: &str, page_text: &str) -> bool {
    let url = url.to_lowercase();
    if let Some(keyword) = URL_KEYWORDS.iter().find(|kw| url.contains(*kw)) {
        tracing::debug!("URL matches application keyword '{}'", keyword);
        return true;
    }

    let text = page_text.to_lowercase();
    PAGE_INDICATORS.iter().any(|indicator| text.contains(indicator))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_keywords_identify_application_pages() {
        assert!(is_application_page("https://boards.greenhouse.io/acme/jobs/1", ""));
        assert!(is_application_page("https://acme.com/CAREERS/engineer", ""));
    }

    #[test]
    fn page_text_is_checked_when_url_is_neutral() {
        assert!(is_application_page("https://acme.com/p/42", "Please UPLOAD RESUME below"));
        assert!(!is_application_page("https://acme.com/blog/post", "Our quarterly update"));
    }
}
