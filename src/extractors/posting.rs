// src/extractors/posting.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use super::platform::Platform;
use super::text::text_len;

/// The normalized job-posting record. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
}

/// Where a field of the final posting came from, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", content = "platform")]
pub enum ExtractionStrategy {
    JsonLd,
    PlatformSpecific(Platform),
    GenericPattern,
    BodyText,
    MetaTag,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::JsonLd => write!(f, "json-ld"),
            ExtractionStrategy::PlatformSpecific(platform) => write!(f, "platform:{}", platform),
            ExtractionStrategy::GenericPattern => write!(f, "generic"),
            ExtractionStrategy::BodyText => write!(f, "body-text"),
            ExtractionStrategy::MetaTag => write!(f, "meta-tag"),
        }
    }
}

impl JobPosting {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.company.is_empty()
            && self.description.is_empty()
            && self.location.is_empty()
    }

    pub fn description_len(&self) -> usize {
        text_len(&self.description)
    }

    /// Folds a later strategy's partial result into this one.
    ///
    /// A field is replaced only when the current value is empty; the
    /// description is also replaced when the candidate is strictly longer.
    /// Returns true if any field changed.
    pub fn merge(&mut self, candidate: &JobPosting) -> bool {
        let mut changed = false;
        changed |= fill_if_empty(&mut self.title, &candidate.title);
        changed |= fill_if_empty(&mut self.company, &candidate.company);
        changed |= fill_if_empty(&mut self.location, &candidate.location);
        if text_len(&candidate.description) > text_len(&self.description) {
            self.description = candidate.description.clone();
            changed = true;
        }
        changed
    }
}

fn fill_if_empty(current: &mut String, candidate: &str) -> bool {
    if current.is_empty() && !candidate.is_empty() {
        *current = candidate.to_string();
        return true;
    }
    false
}

/// A posting together with the strategies that contributed to it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    #[serde(flatten)]
    pub posting: JobPosting,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strategies: Vec<ExtractionStrategy>,
}

impl Extraction {
    /// Merges `candidate` and records `strategy` if it changed anything.
    pub fn absorb(&mut self, strategy: ExtractionStrategy, candidate: &JobPosting) {
        if self.posting.merge(candidate) {
            tracing::debug!("Strategy {} contributed to the posting", strategy);
            if !self.strategies.contains(&strategy) {
                self.strategies.push(strategy);
            }
        }
    }
}
