// src/autofill/document.rs
//! Capability interface the field matcher drives: querying controls and
//! labels, and mutating control state with bubbling notifications.

use serde::Serialize;

/// Opaque handle to one form control of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ControlRef(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Input,
    Textarea,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Input,
    Change,
    KeyUp,
    Blur,
    Click,
}

impl EventKind {
    /// DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::KeyUp => "keyup",
            EventKind::Blur => "blur",
            EventKind::Click => "click",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormEvent {
    pub kind: EventKind,
    pub bubbles: bool,
}

impl FormEvent {
    pub fn bubbling(kind: EventKind) -> Self {
        Self { kind, bubbles: true }
    }
}

/// A `<label>` element as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub for_id: Option<String>,
    /// First input or textarea nested inside the label.
    pub nested_control: Option<ControlRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

pub trait DocumentQuery {
    /// Controls of any of `kinds` where any of `attrs` contains `pattern`
    /// (case-insensitive substring), in document order.
    fn find_by_attribute(&self, kinds: &[ControlKind], attrs: &[&str], pattern: &str) -> Vec<ControlRef>;

    /// All label elements, in document order.
    fn labels(&self) -> Vec<Label>;

    /// The control whose `id` attribute equals `id`.
    fn control_by_id(&self, id: &str) -> Option<ControlRef>;

    fn kind(&self, control: ControlRef) -> ControlKind;

    fn attribute(&self, control: ControlRef, attr: &str) -> Option<String>;

    /// Options of a select control; empty for other kinds.
    fn options(&self, select: ControlRef) -> Vec<SelectOption>;

    /// Text of the label wrapping the control, else of `label[for=<id>]`.
    fn label_text(&self, control: ControlRef) -> Option<String>;
}

pub trait DocumentMutation {
    fn focus(&mut self, control: ControlRef);
    fn set_value(&mut self, control: ControlRef, value: &str);
    fn set_checked(&mut self, control: ControlRef, checked: bool);
    fn dispatch(&mut self, control: ControlRef, event: FormEvent);
}

/// A document the matcher can both query and mutate.
pub trait FormDocument: DocumentQuery + DocumentMutation {}

impl<T: DocumentQuery + DocumentMutation> FormDocument for T {}
