// src/autofill/matcher.rs

use super::document::{ControlKind, ControlRef, EventKind, FormDocument, FormEvent};
use super::profile::{FillMode, Profile, ProfileField};

const TEXT_CONTROLS: &[ControlKind] = &[ControlKind::Input, ControlKind::Textarea];
const YES_TOKENS: &[&str] = &["yes", "true", "1"];
const NO_TOKENS: &[&str] = &["no", "false", "0"];

const NAME_DESCRIPTORS: &[&str] = &["name", "id", "placeholder", "aria-label", "data-automation-id"];

/// Notifications fired after writing a value. Page frameworks key "touched"
/// state off this exact sequence.
const FILL_EVENTS: [EventKind; 4] = [EventKind::Input, EventKind::Change, EventKind::KeyUp, EventKind::Blur];

/// Attribute-matching strategies, in precedence order within one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Name,
    Id,
    Placeholder,
    AriaLabel,
    Label,
    AutomationId,
}

impl MatchStrategy {
    pub const PRECEDENCE: [MatchStrategy; 6] = [
        MatchStrategy::Name,
        MatchStrategy::Id,
        MatchStrategy::Placeholder,
        MatchStrategy::AriaLabel,
        MatchStrategy::Label,
        MatchStrategy::AutomationId,
    ];
}

/// Locates and fills form controls for profile fields.
pub struct FieldMatcher<'d, D> {
    document: &'d mut D,
}

impl<'d, D: FormDocument> FieldMatcher<'d, D> {
    pub fn new(document: &'d mut D) -> Self {
        Self { document }
    }

    /// Best input/textarea for `patterns`. Pattern order dominates strategy
    /// order: every strategy is tried for the first pattern before the
    /// second pattern is considered.
    pub fn find(&self, patterns: &[&str]) -> Option<ControlRef> {
        self.find_where(patterns, |_| true)
    }

    /// Like [`find`](Self::find), but skips controls `accept` rejects.
    fn find_where(&self, patterns: &[&str], accept: impl Fn(ControlRef) -> bool) -> Option<ControlRef> {
        for pattern in patterns {
            let pattern = pattern.trim().to_lowercase();
            if pattern.is_empty() {
                continue;
            }
            for strategy in MatchStrategy::PRECEDENCE {
                if let Some(control) = self.find_with(strategy, &pattern, &accept) {
                    tracing::trace!("Pattern '{}' matched {:?} via {:?}", pattern, control, strategy);
                    return Some(control);
                }
            }
        }
        None
    }

    fn find_with(&self, strategy: MatchStrategy, pattern: &str, accept: &impl Fn(ControlRef) -> bool) -> Option<ControlRef> {
        let by_attr = |kinds: &[ControlKind], attr: &str| {
            self.document
                .find_by_attribute(kinds, &[attr], pattern)
                .into_iter()
                .find(|control| accept(*control))
        };
        match strategy {
            MatchStrategy::Name => by_attr(TEXT_CONTROLS, "name"),
            MatchStrategy::Id => by_attr(TEXT_CONTROLS, "id"),
            MatchStrategy::Placeholder => by_attr(TEXT_CONTROLS, "placeholder"),
            MatchStrategy::AriaLabel => by_attr(TEXT_CONTROLS, "aria-label"),
            MatchStrategy::Label => self.find_by_label(pattern, accept),
            MatchStrategy::AutomationId => by_attr(&[ControlKind::Input], "data-automation-id"),
        }
    }

    fn find_by_label(&self, pattern: &str, accept: &impl Fn(ControlRef) -> bool) -> Option<ControlRef> {
        for label in self.document.labels() {
            if !label.text.to_lowercase().contains(pattern) {
                continue;
            }
            let referenced = label
                .for_id
                .as_deref()
                .and_then(|id| self.document.control_by_id(id))
                .filter(|control| TEXT_CONTROLS.contains(&self.document.kind(*control)));
            if let Some(control) = referenced.or(label.nested_control).filter(|control| accept(*control)) {
                return Some(control);
            }
        }
        None
    }

    /// Full-name control. The bare "name" pattern also hits `first_name` and
    /// `last_name`, so controls describing a name part are skipped.
    fn find_full_name(&self) -> Option<ControlRef> {
        self.find_where(ProfileField::FullName.patterns(), |control| !self.describes_name_part(control))
    }

    fn describes_name_part(&self, control: ControlRef) -> bool {
        let descriptors: Vec<String> = NAME_DESCRIPTORS
            .iter()
            .filter_map(|attr| self.document.attribute(control, attr))
            .chain(self.document.label_text(control))
            .map(|text| text.to_lowercase())
            .collect();
        [ProfileField::FirstName, ProfileField::LastName]
            .iter()
            .flat_map(|field| field.patterns().iter())
            .any(|pattern| descriptors.iter().any(|text| text.contains(pattern)))
    }

    /// Writes `value` into `control` the way a user would. Returns false,
    /// touching nothing, when either is absent.
    pub fn fill(&mut self, control: Option<ControlRef>, value: Option<&str>) -> bool {
        let (Some(control), Some(value)) = (control, value.filter(|v| !v.is_empty())) else {
            return false;
        };

        self.document.focus(control);
        self.document.set_value(control, "");
        self.document.set_value(control, value);
        for kind in FILL_EVENTS {
            self.document.dispatch(control, FormEvent::bubbling(kind));
        }
        true
    }

    /// Picks an option in the first `<select>` whose name or id contains a
    /// pattern: an exact value match beats a visible-text substring match.
    pub fn select_option(&mut self, patterns: &[&str], value: &str) -> bool {
        let target = value.trim().to_lowercase();
        if target.is_empty() {
            return false;
        }

        for pattern in patterns {
            let pattern = pattern.to_lowercase();
            let Some(select) = self
                .document
                .find_by_attribute(&[ControlKind::Select], &["name", "id"], &pattern)
                .into_iter()
                .next()
            else {
                continue;
            };

            let options = self.document.options(select);
            let chosen = options
                .iter()
                .find(|option| option.value.to_lowercase() == target)
                .or_else(|| options.iter().find(|option| option.text.to_lowercase().contains(&target)));

            if let Some(option) = chosen {
                tracing::debug!("Selecting option '{}' for pattern '{}'", option.value, pattern);
                self.document.set_value(select, &option.value);
                self.document.dispatch(select, FormEvent::bubbling(EventKind::Change));
                return true;
            }
        }
        false
    }

    /// Checks the first radio, among those whose name contains a pattern,
    /// whose value or label text carries a yes-token (or no-token).
    pub fn select_radio(&mut self, patterns: &[&str], value: &str) -> bool {
        let targets = if is_affirmative(value) { YES_TOKENS } else { NO_TOKENS };

        for pattern in patterns {
            let pattern = pattern.to_lowercase();
            let radios = self
                .document
                .find_by_attribute(&[ControlKind::Input], &["name"], &pattern)
                .into_iter()
                .filter(|radio| {
                    self.document
                        .attribute(*radio, "type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("radio"))
                })
                .collect::<Vec<_>>();

            for radio in radios {
                let radio_value = self.document.attribute(radio, "value").unwrap_or_default().to_lowercase();
                let label_text = self.document.label_text(radio).unwrap_or_default().to_lowercase();

                if targets.iter().any(|t| radio_value.contains(t) || label_text.contains(t)) {
                    self.document.set_checked(radio, true);
                    // Frameworks differ in which of these they listen for
                    self.document.dispatch(radio, FormEvent::bubbling(EventKind::Change));
                    self.document.dispatch(radio, FormEvent::bubbling(EventKind::Click));
                    return true;
                }
            }
        }
        false
    }

    fn fill_field(&mut self, profile: &Profile, field: ProfileField) -> bool {
        let value = profile.value(field);
        let control = self.find(field.patterns());
        let filled = self.fill(control, value.as_deref());
        if filled {
            tracing::debug!("Filled {:?}", field);
        }
        filled
    }

    fn answer_question(&mut self, profile: &Profile, field: ProfileField) -> bool {
        let Some(value) = profile.value(field) else {
            return false;
        };
        let answered = self.select_option(field.patterns(), &value) || self.select_radio(field.patterns(), &value);
        if answered {
            tracing::debug!("Answered {:?} with '{}'", field, value);
        }
        answered
    }

    /// Runs every field matcher once and returns how many fields were filled.
    /// Each attempt is independent; a miss never stops the pass.
    pub fn fill_all(&mut self, profile: &Profile, mode: FillMode) -> usize {
        let mut filled = 0;

        let full_name = self.find_full_name();
        match full_name {
            Some(control) => {
                if self.fill(Some(control), profile.value(ProfileField::FullName).as_deref()) {
                    filled += 1;
                }
            }
            None => {
                for field in [ProfileField::FirstName, ProfileField::LastName] {
                    if self.fill_field(profile, field) {
                        filled += 1;
                    }
                }
            }
        }

        for field in [
            ProfileField::Email,
            ProfileField::Phone,
            ProfileField::Location,
            ProfileField::Linkedin,
            ProfileField::Website,
        ] {
            if self.fill_field(profile, field) {
                filled += 1;
            }
        }

        if mode == FillMode::Full {
            for field in [ProfileField::WorkAuth, ProfileField::Sponsorship] {
                if self.answer_question(profile, field) {
                    filled += 1;
                }
            }
        }

        tracing::info!("Autofill pass ({:?}) filled {} fields", mode, filled);
        filled
    }
}

fn is_affirmative(value: &str) -> bool {
    YES_TOKENS.contains(&value.trim().to_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autofill::document::DocumentQuery;
    use crate::autofill::headless::HeadlessDocument;

    fn events(doc: &HeadlessDocument, control: ControlRef) -> Vec<EventKind> {
        doc.events_for(control).map(|e| e.kind).collect()
    }

    fn id_of(doc: &HeadlessDocument, control: Option<ControlRef>) -> Option<String> {
        control.and_then(|c| doc.attribute(c, "id"))
    }

    #[test]
    fn strategies_follow_precedence_within_a_pattern() {
        let mut doc = HeadlessDocument::parse(
            r#"<label for="by-label">Email</label><input id="by-label">
               <input id="by-placeholder" placeholder="Your email">
               <input id="user_email_field">
               <input id="by-name" name="email">"#,
        );
        let matcher = FieldMatcher::new(&mut doc);
        let found = matcher.find(&["email"]);
        assert_eq!(id_of(&doc, found).as_deref(), Some("by-name"));
    }

    #[test]
    fn earlier_pattern_wins_over_higher_precedence_strategy() {
        // "given name" only matches via a label; "first" would match by name attribute.
        let mut doc = HeadlessDocument::parse(
            r#"<input id="a" name="first_field">
               <label>Given Name <input id="b"></label>"#,
        );
        let matcher = FieldMatcher::new(&mut doc);
        let found = matcher.find(&["given name", "first"]);
        assert_eq!(id_of(&doc, found).as_deref(), Some("b"));

        let matcher = FieldMatcher::new(&mut doc);
        let found = matcher.find(&["first", "given name"]);
        assert_eq!(id_of(&doc, found).as_deref(), Some("a"));
    }

    #[test]
    fn label_resolves_for_attribute_then_nested_control() {
        let mut doc = HeadlessDocument::parse(
            r#"<label for="phone-input">Mobile number</label>
               <input id="phone-input">
               <label>Current City <textarea id="city"></textarea></label>"#,
        );
        let matcher = FieldMatcher::new(&mut doc);
        let (phone, city) = (matcher.find(&["mobile"]), matcher.find(&["city"]));
        assert_eq!(id_of(&doc, phone).as_deref(), Some("phone-input"));
        assert_eq!(id_of(&doc, city).as_deref(), Some("city"));
    }

    #[test]
    fn automation_id_is_the_last_resort() {
        let mut doc = HeadlessDocument::parse(r#"<input id="wd-1" data-automation-id="legalNameSection_firstName">"#);
        let found = FieldMatcher::new(&mut doc).find(&["firstname"]);
        assert_eq!(id_of(&doc, found).as_deref(), Some("wd-1"));
    }

    #[test]
    fn matching_is_case_insensitive_and_misses_are_none() {
        let mut doc = HeadlessDocument::parse(r#"<input id="x" name="LinkedIn_URL">"#);
        let matcher = FieldMatcher::new(&mut doc);
        assert!(matcher.find(&["LINKEDIN"]).is_some());
        assert!(matcher.find(&["twitter"]).is_none());
        assert!(matcher.find(&[]).is_none());
    }

    #[test]
    fn fill_fires_four_events_in_order() {
        let mut doc = HeadlessDocument::parse(r#"<input name="email" value="old@example.com">"#);
        let control = doc.control_by_name("email");
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(matcher.fill(control, Some("ada@example.com")));

        let control = control.expect("control");
        assert_eq!(doc.value(control), "ada@example.com");
        assert_eq!(events(&doc, control), vec![EventKind::Input, EventKind::Change, EventKind::KeyUp, EventKind::Blur]);
        assert!(doc.events_for(control).all(|e| e.bubbles));
        assert_eq!(doc.focused(), Some(control));
    }

    #[test]
    fn fill_without_value_or_control_is_a_no_op() {
        let mut doc = HeadlessDocument::parse(r#"<input name="email" value="keep">"#);
        let control = doc.control_by_name("email");
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(!matcher.fill(control, Some("")));
        assert!(!matcher.fill(control, None));
        assert!(!matcher.fill(None, Some("value")));

        let control = control.expect("control");
        assert_eq!(doc.value(control), "keep");
        assert!(doc.events().is_empty());
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn select_prefers_exact_value_over_text_match() {
        let mut doc = HeadlessDocument::parse(
            r#"<select name="work_authorized">
                 <option value="">Choose</option>
                 <option value="y">Yes, with yes-restrictions</option>
                 <option value="Yes">Authorized</option>
               </select>"#,
        );
        let select = doc.control_by_name("work_authorized").expect("select");
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(matcher.select_option(&["work auth", "authorized"], "yes"));
        assert_eq!(doc.value(select), "Yes");
        assert_eq!(events(&doc, select), vec![EventKind::Change]);
    }

    #[test]
    fn select_falls_back_to_visible_text() {
        let mut doc = HeadlessDocument::parse(
            r#"<select id="visa_status"><option value="1">No sponsorship needed</option>
               <option value="2">Will require sponsorship</option></select>"#,
        );
        let select = doc.control_by_id("visa_status").expect("select");
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(!matcher.select_option(&["visa"], "maybe"));
        assert!(matcher.select_option(&["visa"], "require"));
        assert_eq!(doc.value(select), "2");
    }

    #[test]
    fn radio_group_checks_label_match_and_fires_change_and_click() {
        let mut doc = HeadlessDocument::parse(
            r#"<label><input type="radio" name="authorized_to_work" value="a"> Yes, I am authorized</label>
               <label><input type="radio" name="authorized_to_work" value="b"> No</label>"#,
        );
        let yes = doc.control_by_value("authorized_to_work", "a").expect("yes radio");
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(matcher.select_radio(&["authorized"], "yes"));
        assert!(doc.is_checked(yes));
        assert_eq!(events(&doc, yes), vec![EventKind::Change, EventKind::Click]);
    }

    #[test]
    fn radio_group_matches_no_by_value() {
        let mut doc = HeadlessDocument::parse(
            r#"<input type="radio" id="s1" name="requires_sponsorship" value="true">
               <label for="s1">I need it</label>
               <input type="radio" id="s2" name="requires_sponsorship" value="false">
               <label for="s2">I do not</label>"#,
        );
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(matcher.select_radio(&["sponsor"], "no"));
        let s2 = doc.control_by_id("s2").expect("s2");
        assert!(doc.is_checked(s2));
        assert!(!doc.is_checked(doc.control_by_id("s1").expect("s1")));
    }

    #[test]
    fn text_inputs_named_like_the_pattern_are_not_radios() {
        let mut doc = HeadlessDocument::parse(r#"<input type="text" name="visa" value="yes">"#);
        let mut matcher = FieldMatcher::new(&mut doc);
        assert!(!matcher.select_radio(&["visa"], "yes"));
    }

    const APPLICATION_FORM: &str = r#"
        <form>
          <label for="fn">First Name</label><input id="fn" name="first_name">
          <label for="ln">Last Name</label><input id="ln" name="last_name">
          <input name="email" type="email">
          <input name="phone" type="tel">
          <input name="city" placeholder="City">
          <input name="urls[LinkedIn]">
          <input name="urls[Portfolio]">
          <select name="authorized_to_work"><option value="">--</option><option value="yes">Yes</option></select>
          <label><input type="radio" name="needs_sponsorship" value="Y"> Yes</label>
          <label><input type="radio" name="needs_sponsorship" value="N"> No</label>
        </form>"#;

    fn profile() -> Profile {
        Profile {
            full_name: Some("Maria De La Cruz".to_string()),
            email: Some("maria@example.com".to_string()),
            phone: Some("+1 555 0100".to_string()),
            location: Some("Austin, TX".to_string()),
            linkedin: Some("https://linkedin.com/in/maria".to_string()),
            website: Some("https://maria.dev".to_string()),
            work_auth: Some("yes".to_string()),
            sponsorship: Some("no".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn fill_all_splits_name_and_answers_questions_in_full_mode() {
        let mut doc = HeadlessDocument::parse(APPLICATION_FORM);
        let filled = FieldMatcher::new(&mut doc).fill_all(&profile(), FillMode::Full);
        assert_eq!(filled, 9);

        let value_of = |name: &str| doc.control_by_name(name).map(|c| doc.value(c).to_string());
        assert_eq!(value_of("first_name").as_deref(), Some("Maria"));
        assert_eq!(value_of("last_name").as_deref(), Some("De La Cruz"));
        assert_eq!(value_of("city").as_deref(), Some("Austin, TX"));
        assert_eq!(value_of("urls[LinkedIn]").as_deref(), Some("https://linkedin.com/in/maria"));
        assert_eq!(value_of("urls[Portfolio]").as_deref(), Some("https://maria.dev"));
        assert_eq!(value_of("authorized_to_work").as_deref(), Some("yes"));
        let no = doc.control_by_value("needs_sponsorship", "N").expect("no radio");
        assert!(doc.is_checked(no));
    }

    #[test]
    fn basic_mode_skips_authorization_questions() {
        let mut doc = HeadlessDocument::parse(APPLICATION_FORM);
        let filled = FieldMatcher::new(&mut doc).fill_all(&profile(), FillMode::Basic);
        assert_eq!(filled, 7);
        let select = doc.control_by_name("authorized_to_work").expect("select");
        assert_eq!(doc.value(select), "");
    }

    #[test]
    fn full_name_field_suppresses_the_split() {
        let mut doc = HeadlessDocument::parse(
            r#"<input name="full_name"><input name="first_name"><input name="last_name">"#,
        );
        let filled = FieldMatcher::new(&mut doc).fill_all(&profile(), FillMode::Basic);
        assert_eq!(filled, 1);
        let full = doc.control_by_name("full_name").expect("full");
        assert_eq!(doc.value(full), "Maria De La Cruz");
        assert_eq!(doc.value(doc.control_by_name("first_name").expect("first")), "");
    }

    #[test]
    fn bare_name_field_takes_the_full_name() {
        let mut doc = HeadlessDocument::parse(r#"<input name="name"><input name="email">"#);
        let filled = FieldMatcher::new(&mut doc).fill_all(&profile(), FillMode::Basic);
        assert_eq!(filled, 2);
        assert_eq!(doc.value(doc.control_by_name("name").expect("name")), "Maria De La Cruz");
    }

    #[test]
    fn name_label_takes_the_full_name() {
        let mut doc = HeadlessDocument::parse(r#"<label for="n">Name</label><input id="n">"#);
        let filled = FieldMatcher::new(&mut doc).fill_all(&profile(), FillMode::Basic);
        assert_eq!(filled, 1);
        assert_eq!(doc.value(doc.control_by_id("n").expect("n")), "Maria De La Cruz");
    }

    #[test]
    fn name_part_controls_are_not_full_name_candidates() {
        let mut doc = HeadlessDocument::parse(
            r#"<input name="first_name"><input name="last_name"><input id="x" name="name">"#,
        );
        let matcher = FieldMatcher::new(&mut doc);
        let found = matcher.find_full_name();
        assert_eq!(id_of(&doc, found).as_deref(), Some("x"));
    }

    #[test]
    fn empty_profile_fills_nothing() {
        let mut doc = HeadlessDocument::parse(APPLICATION_FORM);
        assert_eq!(FieldMatcher::new(&mut doc).fill_all(&Profile::default(), FillMode::Full), 0);
        assert!(doc.events().is_empty());
    }
}
