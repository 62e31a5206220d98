// src/extractors/text.rs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

// --- Regex Rules (Lazy Static) ---
// Applied in order; block removal must run before the structural rewrites.
static MARKUP_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // Non-content blocks are dropped entirely
        (r"(?is)<script\b[^>]*>.*?</script\s*>", ""),
        (r"(?is)<style\b[^>]*>.*?</style\s*>", ""),
        (r"(?is)<noscript\b[^>]*>.*?</noscript\s*>", ""),
        (r"(?s)<!--.*?-->", ""),
        // Structural tags become line breaks
        (r"(?i)<br\s*/?>", "\n"),
        (r"(?i)</p\s*>", "\n\n"),
        (r"(?i)</div\s*>", "\n"),
        (r"(?i)</li\s*>", "\n"),
        (r"(?i)<li(?:\s[^>]*)?>", "• "),
        (r"(?i)</h[1-6]\s*>", "\n\n"),
        (r"(?i)<h[1-6](?:\s[^>]*)?>", "\n"),
        (r"(?i)</tr\s*>", "\n"),
        (r"(?i)</td\s*>", " | "),
        (r"(?i)<hr\b[^>]*>", "\n---\n"),
        // Anything left is an inline tag
        (r"<[^>]+>", " "),
    ]
    .iter()
    .map(|(pat, rep)| (Regex::new(pat).expect("Failed to compile MARKUP_RULES"), *rep))
    .collect()
});

static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
        .expect("Failed to compile ENTITY_RE")
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("Failed to compile MULTI_SPACE_RE"));
static LEADING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n +").expect("Failed to compile LEADING_SPACE_RE"));
static TRAILING_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +\n").expect("Failed to compile TRAILING_SPACE_RE"));
static EXCESS_NEWLINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("Failed to compile EXCESS_NEWLINES_RE"));

/// Converts an HTML fragment into readable plain text.
///
/// Paragraphs and headings are separated by a blank line, list items are
/// bulleted, table cells are pipe-separated, and entities are decoded.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let mut text = html.to_string();
    for (re, replacement) in MARKUP_RULES.iter() {
        text = re.replace_all(&text, *replacement).into_owned();
    }

    let text = decode_entities(&text).replace('\t', " ");

    let text = MULTI_SPACE_RE.replace_all(&text, " ");
    let text = LEADING_SPACE_RE.replace_all(&text, "\n");
    let text = TRAILING_SPACE_RE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES_RE.replace_all(&text, "\n\n");

    text.trim().to_string()
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in characters, which is what every extraction threshold is measured in.
pub fn text_len(text: &str) -> usize {
    text.chars().count()
}

/// Decodes the common named entities plus decimal and hex character references.
/// Unknown named entities become a single space.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                return numeric_reference(u32::from_str_radix(hex, 16).ok());
            }
            if let Some(dec) = entity.strip_prefix('#') {
                return numeric_reference(dec.parse::<u32>().ok());
            }
            named_entity(entity).unwrap_or(" ").to_string()
        })
        .into_owned()
}

fn numeric_reference(code: Option<u32>) -> String {
    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| " ".to_string())
}

fn named_entity(name: &str) -> Option<&'static str> {
    let decoded = match name {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "rsquo" | "lsquo" => "'",
        "rdquo" | "ldquo" => "\"",
        "mdash" => "—",
        "ndash" => "–",
        "bull" => "•",
        "hellip" => "...",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        _ => return None,
    };
    Some(decoded)
}
