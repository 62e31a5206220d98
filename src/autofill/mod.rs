// src/autofill/mod.rs
pub mod detect;
pub mod document;
pub mod headless;
pub mod matcher;
pub mod profile;

pub use detect::is_application_page;
pub use headless::HeadlessDocument;
pub use matcher::FieldMatcher;
pub use profile::{FillMode, Profile};
