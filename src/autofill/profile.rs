// src/autofill/profile.rs
use serde::{Deserialize, Serialize};

/// Semantic fields the autofill pass knows how to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileField {
    FullName,
    FirstName,
    LastName,
    Email,
    Phone,
    Location,
    Linkedin,
    Website,
    WorkAuth,
    Sponsorship,
}

impl ProfileField {
    /// Lowercase match patterns, most specific first.
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            ProfileField::FullName => &["full name", "fullname", "name", "legal name", "legalname"],
            ProfileField::FirstName => &["first name", "firstname", "first", "given name", "givenname"],
            ProfileField::LastName => &["last name", "lastname", "last", "surname", "family name"],
            ProfileField::Email => &["email", "e-mail", "emailaddress"],
            ProfileField::Phone => &["phone", "telephone", "mobile", "cell", "phonenumber"],
            ProfileField::Location => &["location", "city", "address", "current location"],
            ProfileField::Linkedin => &["linkedin", "linked in"],
            ProfileField::Website => &["website", "portfolio", "personal site", "url", "github"],
            ProfileField::WorkAuth => &["work auth", "authorized", "legally authorized", "legal"],
            ProfileField::Sponsorship => &["sponsor", "visa", "require sponsor"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FillMode {
    /// Contact details only.
    Basic,
    /// Contact details plus work-authorization and sponsorship questions.
    #[default]
    Full,
}

/// The applicant's saved profile. Every value is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub linkedin: Option<String>,
    pub website: Option<String>,
    pub work_auth: Option<String>,
    pub sponsorship: Option<String>,
}

impl Profile {
    /// Non-blank value for `field`. First and last name fall back to
    /// splitting the full name.
    pub fn value(&self, field: ProfileField) -> Option<String> {
        let explicit = match field {
            ProfileField::FullName => &self.full_name,
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Location => &self.location,
            ProfileField::Linkedin => &self.linkedin,
            ProfileField::Website => &self.website,
            ProfileField::WorkAuth => &self.work_auth,
            ProfileField::Sponsorship => &self.sponsorship,
        };
        let explicit = explicit.as_deref().map(str::trim).filter(|v| !v.is_empty());
        if let Some(value) = explicit {
            return Some(value.to_string());
        }

        let (first, last) = split_full_name(self.full_name.as_deref()?);
        let derived = match field {
            ProfileField::FirstName => first,
            ProfileField::LastName => last,
            _ => return None,
        };
        Some(derived).filter(|v| !v.is_empty())
    }
}

/// First token is the first name; the remaining tokens, single-spaced,
/// are the last name.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_multi_word_last_names() {
        assert_eq!(
            split_full_name("Maria De La Cruz"),
            ("Maria".to_string(), "De La Cruz".to_string())
        );
        assert_eq!(split_full_name("  Cher "), ("Cher".to_string(), String::new()));
        assert_eq!(split_full_name(""), (String::new(), String::new()));
    }

    #[test]
    fn explicit_name_parts_take_precedence() {
        let profile = Profile {
            full_name: Some("Maria De La Cruz".to_string()),
            last_name: Some("Cruz".to_string()),
            ..Default::default()
        };
        assert_eq!(profile.value(ProfileField::FirstName).as_deref(), Some("Maria"));
        assert_eq!(profile.value(ProfileField::LastName).as_deref(), Some("Cruz"));
    }

    #[test]
    fn blank_values_are_absent() {
        let profile = Profile {
            email: Some("   ".to_string()),
            full_name: Some("Cher".to_string()),
            ..Default::default()
        };
        assert_eq!(profile.value(ProfileField::Email), None);
        assert_eq!(profile.value(ProfileField::LastName), None);
        assert_eq!(profile.value(ProfileField::Phone), None);
    }

    #[test]
    fn deserializes_camel_case_json() {
        let profile: Profile = serde_json::from_str(
            r#"{"fullName": "Ada Lovelace", "workAuth": "yes", "linkedin": "https://linkedin.com/in/ada"}"#,
        )
        .expect("profile");
        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.work_auth.as_deref(), Some("yes"));
        assert_eq!(profile.email, None);
    }
}
